//! Adapter implementations of the task repository port.

mod document;
mod json_file;
pub mod memory;

pub use document::TaskDocument;
pub use json_file::JsonFileTaskRepository;
