//! Local working-copy port used by the merge coordinator.

use crate::vcs::domain::{MergeAttempt, MergeStrategy};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for working-copy operations.
pub type MergeWorkspaceResult<T> = Result<T, MergeWorkspaceError>;

/// Both sides of a conflicted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSides {
    /// Content on the integration branch.
    pub ours: String,
    /// Content on the branch being merged.
    pub theirs: String,
}

/// Operations on the local clone that integrates module branches.
///
/// References passed to [`MergeWorkspace::merge`] are bare branch names; the
/// adapter resolves them against its remote.
#[async_trait]
pub trait MergeWorkspace: Send + Sync {
    /// Fetches the remote.
    async fn fetch(&self) -> MergeWorkspaceResult<()>;

    /// Checks out a local branch.
    async fn checkout(&self, branch: &str) -> MergeWorkspaceResult<()>;

    /// Pulls the current branch from the remote.
    async fn pull(&self) -> MergeWorkspaceResult<()>;

    /// Merges a remote branch into the current branch.
    ///
    /// Conflicts are reported as [`MergeAttempt::Conflicted`] and leave the
    /// merge in progress; any other failure is an error.
    async fn merge(
        &self,
        branch: &str,
        strategy: MergeStrategy,
        message: &str,
    ) -> MergeWorkspaceResult<MergeAttempt>;

    /// Aborts an in-progress merge.
    async fn abort_merge(&self) -> MergeWorkspaceResult<()>;

    /// Reads both sides of a conflicted path.
    async fn conflict_sides(&self, path: &str) -> MergeWorkspaceResult<ConflictSides>;

    /// Writes resolved content for a path and stages it.
    async fn stage_resolution(&self, path: &str, contents: &str) -> MergeWorkspaceResult<()>;

    /// Commits the staged merge.
    async fn commit(&self, message: &str) -> MergeWorkspaceResult<()>;

    /// Pushes a branch to the remote.
    async fn push(&self, branch: &str) -> MergeWorkspaceResult<()>;

    /// Deletes a branch on the remote.
    async fn delete_remote_branch(&self, branch: &str) -> MergeWorkspaceResult<()>;

    /// Prunes stale remote-tracking refs.
    async fn prune(&self) -> MergeWorkspaceResult<()>;
}

/// Errors returned by working-copy adapters.
#[derive(Debug, Clone, Error)]
pub enum MergeWorkspaceError {
    /// A `git` command exited unsuccessfully.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// Command arguments.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The command could not be spawned or a file could not be accessed.
    #[error("working copy I/O error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl MergeWorkspaceError {
    /// Wraps an I/O error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
