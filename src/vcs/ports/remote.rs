//! Remote repository provider port.

use crate::vcs::domain::{BranchName, CommitInfo};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote repository operations.
pub type RemoteRepositoryResult<T> = Result<T, RemoteRepositoryError>;

/// Queries and branch management against the hosted repository.
///
/// Calls are blocking from the caller's point of view; timeouts belong to the
/// adapter's transport.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Lists remote branches whose name starts with `prefix`.
    async fn list_branches(&self, prefix: &str) -> RemoteRepositoryResult<Vec<BranchName>>;

    /// Lists commits reachable from the branch, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteRepositoryError::BranchNotFound`] when the branch does
    /// not exist on the remote.
    async fn list_commits(&self, branch: &BranchName) -> RemoteRepositoryResult<Vec<CommitInfo>>;

    /// Returns the current head commit of the branch.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteRepositoryError::BranchNotFound`] when the branch does
    /// not exist on the remote.
    async fn head_commit(&self, branch: &BranchName) -> RemoteRepositoryResult<CommitInfo>;

    /// Deletes the branch pointer on the remote.
    async fn delete_branch(&self, branch: &BranchName) -> RemoteRepositoryResult<()>;
}

/// Errors returned by remote repository adapters.
#[derive(Debug, Clone, Error)]
pub enum RemoteRepositoryError {
    /// The branch does not exist on the remote.
    #[error("branch not found: {0}")]
    BranchNotFound(BranchName),

    /// The provider returned data the adapter could not interpret.
    #[error("unexpected response from remote: {0}")]
    InvalidResponse(String),

    /// The remote could not be reached or refused the request.
    #[error("remote transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteRepositoryError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
