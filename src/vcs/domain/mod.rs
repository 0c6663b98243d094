//! Domain model for branches, commits and merges.
//!
//! Branch names are the only join key between a task and the remote
//! repository, so the naming conventions and commit classification rules
//! live here, free of any transport concerns.

mod branch;
mod commit;
mod error;
mod matcher;
mod merge;

pub use branch::{BranchName, is_content_branch};
pub use commit::{CommitEvent, CommitInfo, classify_commit, is_completion_message};
pub use error::VcsDomainError;
pub use matcher::{book_token, match_branch};
pub use merge::{MergeAttempt, MergeOutcome, MergeRequest, MergeStep, MergeStrategy};
