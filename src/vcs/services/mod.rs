//! Application services for branch queries and module merges.

mod conflict;
mod merge;
mod oracle;

pub use conflict::{ConflictKind, ConflictResolutionError, classify_conflict, merge_json_objects};
pub use merge::MergeCoordinator;
pub use oracle::{BranchEvent, BranchOracle, CheckpointMark, LastCommit};
pub(crate) use oracle::checkpoints_in;
