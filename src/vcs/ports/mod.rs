//! Port contracts for remote repository access.
//!
//! Ports define infrastructure-agnostic interfaces used by VCS services.

pub mod remote;
pub mod workspace;

pub use remote::{RemoteRepository, RemoteRepositoryError, RemoteRepositoryResult};
pub use workspace::{ConflictSides, MergeWorkspace, MergeWorkspaceError, MergeWorkspaceResult};
