//! Front-end facing API for creating tasks and merging finished modules.
//!
//! A chat bot, CLI or any other front end drives the system through
//! [`TaskInitiator`]. It validates book coordinates against the catalog,
//! renders the prompt handed to the external generator and exposes the
//! merge and cleanup operations.

mod error;
mod prompt;
mod service;

pub use error::{InitiatorError, InitiatorResult};
pub use prompt::{PromptRenderer, prompt_book_token};
pub use service::{ClearReport, CreatedPair, CreatedTask, MergeReport, StatusReport, TaskInitiator};

#[cfg(test)]
mod tests;
