//! Read-only branch queries with failure isolation.
//!
//! The oracle is the boundary where remote failures stop: every transport
//! error is logged and degraded to an empty or negative answer, so callers
//! such as the reconciliation loop never see an `Err` from here.

use crate::vcs::{
    domain::{BranchName, CommitEvent, CommitInfo, classify_commit, is_completion_message},
    ports::RemoteRepository,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

/// The newest classifiable commit on a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEvent {
    /// Parsed event.
    pub event: CommitEvent,
    /// Commit that carried the event.
    pub commit: CommitInfo,
}

/// A checkpoint found in branch history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointMark {
    /// Checkpoint number.
    pub number: u32,
    /// Label stored in task history, e.g. `checkpoint 2`.
    pub name: String,
    /// Timestamp of the commit that announced it.
    pub timestamp: DateTime<Utc>,
}

/// Head commit of a branch with its age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastCommit {
    /// The head commit.
    pub commit: CommitInfo,
    /// Whole minutes between the commit timestamp and now.
    pub minutes_ago: i64,
}

/// Branch oracle over a remote repository port.
#[derive(Clone)]
pub struct BranchOracle<R, C>
where
    R: RemoteRepository,
    C: Clock + Send + Sync,
{
    remote: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> BranchOracle<R, C>
where
    R: RemoteRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new oracle.
    #[must_use]
    pub const fn new(remote: Arc<R>, clock: Arc<C>) -> Self {
        Self { remote, clock }
    }

    /// Lists branches under `prefix`; empty on failure.
    pub async fn list_branches(&self, prefix: &str) -> Vec<BranchName> {
        self.snapshot_branches(prefix).await.unwrap_or_default()
    }

    /// Lists branches under `prefix`, distinguishing failure from an empty
    /// listing.
    ///
    /// Returns `None` when the remote could not be queried. Callers that act
    /// on branch absence must use this instead of [`Self::list_branches`].
    pub async fn snapshot_branches(&self, prefix: &str) -> Option<Vec<BranchName>> {
        match self.remote.list_branches(prefix).await {
            Ok(branches) => {
                debug!(prefix, count = branches.len(), "listed remote branches");
                Some(branches)
            }
            Err(err) => {
                warn!(prefix, %err, "failed to list remote branches");
                None
            }
        }
    }

    /// Lists commits on a branch, newest first; empty on failure.
    pub async fn list_commits(&self, branch: &BranchName) -> Vec<CommitInfo> {
        match self.remote.list_commits(branch).await {
            Ok(commits) => commits,
            Err(err) => {
                warn!(%branch, %err, "failed to list commits");
                Vec::new()
            }
        }
    }

    /// Classifies a commit message.
    #[must_use]
    pub fn classify_commit(message: &str) -> Option<CommitEvent> {
        classify_commit(message)
    }

    /// Reports whether the branch's newest commit marks it as finished.
    ///
    /// Only the head commit is inspected. Returns `false` on failure.
    pub async fn is_branch_complete(&self, branch: &BranchName) -> bool {
        match self.remote.head_commit(branch).await {
            Ok(commit) => {
                let complete = is_completion_message(&commit.message);
                if complete {
                    debug!(%branch, sha = %commit.sha, "branch head marks completion");
                }
                complete
            }
            Err(err) => {
                warn!(%branch, %err, "failed to read branch head");
                false
            }
        }
    }

    /// Returns the newest commit that carries a lifecycle event.
    pub async fn latest_event(&self, branch: &BranchName) -> Option<BranchEvent> {
        self.list_commits(branch)
            .await
            .into_iter()
            .find_map(|commit| {
                commit
                    .event()
                    .map(|event| BranchEvent { event, commit })
            })
    }

    /// Returns every checkpoint announced on the branch, ordered by number.
    pub async fn branch_checkpoints(&self, branch: &BranchName) -> Vec<CheckpointMark> {
        let commits = self.list_commits(branch).await;
        checkpoints_in(&commits)
    }

    /// Returns the branch head and its age relative to the clock.
    pub async fn last_commit(&self, branch: &BranchName) -> Option<LastCommit> {
        match self.remote.head_commit(branch).await {
            Ok(commit) => {
                let minutes_ago = (self.clock.utc() - commit.timestamp).num_minutes();
                Some(LastCommit {
                    commit,
                    minutes_ago,
                })
            }
            Err(err) => {
                warn!(%branch, %err, "failed to read last commit");
                None
            }
        }
    }
}

/// Extracts checkpoint marks from commits, sorted by checkpoint number.
///
/// The sort is stable, so repeated numbers keep newest-first order.
pub(crate) fn checkpoints_in(commits: &[CommitInfo]) -> Vec<CheckpointMark> {
    let mut marks: Vec<CheckpointMark> = commits
        .iter()
        .filter_map(|commit| {
            let event = commit.event()?;
            let CommitEvent::Checkpoint(number) = event else {
                return None;
            };
            Some(CheckpointMark {
                number,
                name: event.checkpoint_name()?,
                timestamp: commit.timestamp,
            })
        })
        .collect();
    marks.sort_by_key(|mark| mark.number);
    marks
}
