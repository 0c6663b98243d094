//! In-memory adapters for deterministic tests and local dry runs.

mod remote;
mod workspace;

pub use remote::InMemoryRemoteRepository;
pub use workspace::InMemoryMergeWorkspace;
