//! Domain model for the task registry.
//!
//! A task is one glossary or tests job for a book module. Tasks start
//! unlinked, acquire a remote branch once, become ready to merge when the
//! branch announces completion and end in the completed collection.

mod error;
mod ids;
mod module;
mod status;
mod task;
mod timestamp;

pub use error::{ParseTaskKindError, ParseTaskStatusError, TaskDomainError};
pub use ids::{ModuleGroupId, TaskId};
pub use module::{ModuleKey, module_ready};
pub use status::{TaskKind, TaskStatus};
pub use task::{Checkpoint, LinkOutcome, Task};
