//! Scripted in-memory working copy for merge procedure tests.

use crate::vcs::{
    domain::{MergeAttempt, MergeStrategy},
    ports::{ConflictSides, MergeWorkspace, MergeWorkspaceError, MergeWorkspaceResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory working copy.
///
/// Merges succeed unless a conflict has been scripted for the branch and
/// strategy. Any operation can be made to fail by name (`"fetch"`,
/// `"checkout"`, `"pull"`, `"merge"`, `"commit"`, `"push"`,
/// `"delete_remote_branch"`, `"prune"`). Every call is recorded so tests can
/// assert on the executed sequence.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMergeWorkspace {
    state: Arc<RwLock<InMemoryWorkspaceState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkspaceState {
    operations: Vec<String>,
    conflicts: HashMap<(String, MergeStrategy), Vec<String>>,
    sides: HashMap<String, ConflictSides>,
    staged: HashMap<String, String>,
    failures: HashMap<String, String>,
    deleted_remote_branches: Vec<String>,
    commits: Vec<String>,
}

impl InMemoryWorkspaceState {
    fn record(&mut self, operation: &str, detail: &str) -> MergeWorkspaceResult<()> {
        self.operations.push(if detail.is_empty() {
            operation.to_owned()
        } else {
            format!("{operation} {detail}")
        });
        match self.failures.get(operation) {
            Some(stderr) => Err(MergeWorkspaceError::Command {
                command: operation.to_owned(),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn lock_error(err: impl ToString) -> MergeWorkspaceError {
    MergeWorkspaceError::io(std::io::Error::other(err.to_string()))
}

impl InMemoryMergeWorkspace {
    /// Creates a working copy where every operation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a conflict when `branch` is merged with `strategy`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn script_conflict(
        &self,
        branch: &str,
        strategy: MergeStrategy,
        paths: impl IntoIterator<Item = String>,
    ) -> MergeWorkspaceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .conflicts
            .insert((branch.to_owned(), strategy), paths.into_iter().collect());
        Ok(())
    }

    /// Sets both sides of a conflicted path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn set_conflict_sides(
        &self,
        path: &str,
        ours: impl Into<String>,
        theirs: impl Into<String>,
    ) -> MergeWorkspaceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.sides.insert(
            path.to_owned(),
            ConflictSides {
                ours: ours.into(),
                theirs: theirs.into(),
            },
        );
        Ok(())
    }

    /// Makes the named operation fail with the given message.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn fail_on(&self, operation: &str, stderr: impl Into<String>) -> MergeWorkspaceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failures.insert(operation.to_owned(), stderr.into());
        Ok(())
    }

    /// Returns the staged resolution for a path, if any.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn staged(&self, path: &str) -> MergeWorkspaceResult<Option<String>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.staged.get(path).cloned())
    }

    /// Returns branches deleted on the remote, in call order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn deleted_remote_branches(&self) -> MergeWorkspaceResult<Vec<String>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.deleted_remote_branches.clone())
    }

    /// Returns commit messages created by explicit commits.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn commits(&self) -> MergeWorkspaceResult<Vec<String>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.commits.clone())
    }

    /// Returns every recorded operation, in call order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn operations(&self) -> MergeWorkspaceResult<Vec<String>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.operations.clone())
    }
}

#[async_trait]
impl MergeWorkspace for InMemoryMergeWorkspace {
    async fn fetch(&self) -> MergeWorkspaceResult<()> {
        self.state.write().map_err(lock_error)?.record("fetch", "")
    }

    async fn checkout(&self, branch: &str) -> MergeWorkspaceResult<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .record("checkout", branch)
    }

    async fn pull(&self) -> MergeWorkspaceResult<()> {
        self.state.write().map_err(lock_error)?.record("pull", "")
    }

    async fn merge(
        &self,
        branch: &str,
        strategy: MergeStrategy,
        _message: &str,
    ) -> MergeWorkspaceResult<MergeAttempt> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.record("merge", branch)?;
        match state.conflicts.get(&(branch.to_owned(), strategy)) {
            Some(paths) => Ok(MergeAttempt::Conflicted(paths.clone())),
            None => Ok(MergeAttempt::Clean),
        }
    }

    async fn abort_merge(&self) -> MergeWorkspaceResult<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .record("abort_merge", "")
    }

    async fn conflict_sides(&self, path: &str) -> MergeWorkspaceResult<ConflictSides> {
        let state = self.state.read().map_err(lock_error)?;
        state.sides.get(path).cloned().ok_or_else(|| MergeWorkspaceError::Command {
            command: format!("show :2:{path}"),
            stderr: format!("path '{path}' is not in conflict"),
        })
    }

    async fn stage_resolution(&self, path: &str, contents: &str) -> MergeWorkspaceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.record("stage", path)?;
        state.staged.insert(path.to_owned(), contents.to_owned());
        Ok(())
    }

    async fn commit(&self, message: &str) -> MergeWorkspaceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.record("commit", "")?;
        state.commits.push(message.to_owned());
        Ok(())
    }

    async fn push(&self, branch: &str) -> MergeWorkspaceResult<()> {
        self.state.write().map_err(lock_error)?.record("push", branch)
    }

    async fn delete_remote_branch(&self, branch: &str) -> MergeWorkspaceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.record("delete_remote_branch", branch)?;
        state.deleted_remote_branches.push(branch.to_owned());
        Ok(())
    }

    async fn prune(&self) -> MergeWorkspaceResult<()> {
        self.state.write().map_err(lock_error)?.record("prune", "")
    }
}
