//! In-memory remote repository adapter.

use crate::vcs::{
    domain::{BranchName, CommitInfo},
    ports::{RemoteRepository, RemoteRepositoryError, RemoteRepositoryResult},
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// In-memory remote repository.
///
/// Branches keep their insertion order, which is the order
/// [`RemoteRepository::list_branches`] reports them in. Commits are stored
/// newest first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemoteRepository {
    state: Arc<RwLock<InMemoryRemoteState>>,
}

#[derive(Debug, Default)]
struct InMemoryRemoteState {
    branches: Vec<(BranchName, Vec<CommitInfo>)>,
    unreachable: bool,
    head_reads: usize,
}

impl InMemoryRemoteState {
    fn branch(&self, name: &BranchName) -> Option<&Vec<CommitInfo>> {
        self.branches
            .iter()
            .find(|(branch, _)| branch == name)
            .map(|(_, commits)| commits)
    }

    fn ensure_reachable(&self) -> RemoteRepositoryResult<()> {
        if self.unreachable {
            return Err(RemoteRepositoryError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "remote unreachable",
            )));
        }
        Ok(())
    }
}

fn lock_error(err: impl ToString) -> RemoteRepositoryError {
    RemoteRepositoryError::transport(std::io::Error::other(err.to_string()))
}

impl InMemoryRemoteRepository {
    /// Creates an empty remote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a branch without commits. Existing branches are left as-is.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn add_branch(&self, branch: BranchName) -> RemoteRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.branch(&branch).is_none() {
            state.branches.push((branch, Vec::new()));
        }
        Ok(())
    }

    /// Pushes a commit on top of a branch, creating the branch if needed.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn push_commit(&self, branch: &BranchName, commit: CommitInfo) -> RemoteRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        match state.branches.iter_mut().find(|(name, _)| name == branch) {
            Some((_, commits)) => commits.insert(0, commit),
            None => state.branches.push((branch.clone(), vec![commit])),
        }
        Ok(())
    }

    /// Removes a branch, as if it were deleted upstream.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn remove_branch(&self, branch: &BranchName) -> RemoteRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.branches.retain(|(name, _)| name != branch);
        Ok(())
    }

    /// Makes every subsequent query fail with a transport error.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_unreachable(&self, unreachable: bool) -> RemoteRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.unreachable = unreachable;
        Ok(())
    }

    /// Returns how many head commit lookups have been served.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn head_reads(&self) -> RemoteRepositoryResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.head_reads)
    }

    /// Returns the names of all branches, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn branch_names(&self) -> RemoteRepositoryResult<Vec<BranchName>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.branches.iter().map(|(name, _)| name.clone()).collect())
    }
}

#[async_trait]
impl RemoteRepository for InMemoryRemoteRepository {
    async fn list_branches(&self, prefix: &str) -> RemoteRepositoryResult<Vec<BranchName>> {
        let state = self.state.read().map_err(lock_error)?;
        state.ensure_reachable()?;
        Ok(state
            .branches
            .iter()
            .filter(|(name, _)| name.as_str().starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn list_commits(&self, branch: &BranchName) -> RemoteRepositoryResult<Vec<CommitInfo>> {
        let state = self.state.read().map_err(lock_error)?;
        state.ensure_reachable()?;
        state
            .branch(branch)
            .cloned()
            .ok_or_else(|| RemoteRepositoryError::BranchNotFound(branch.clone()))
    }

    async fn head_commit(&self, branch: &BranchName) -> RemoteRepositoryResult<CommitInfo> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.ensure_reachable()?;
        state.head_reads += 1;
        let commits = state
            .branch(branch)
            .ok_or_else(|| RemoteRepositoryError::BranchNotFound(branch.clone()))?;
        commits.first().cloned().ok_or_else(|| {
            RemoteRepositoryError::InvalidResponse(format!("branch {branch} has no commits"))
        })
    }

    async fn delete_branch(&self, branch: &BranchName) -> RemoteRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.ensure_reachable()?;
        let before = state.branches.len();
        state.branches.retain(|(name, _)| name != branch);
        if state.branches.len() == before {
            return Err(RemoteRepositoryError::BranchNotFound(branch.clone()));
        }
        Ok(())
    }
}
