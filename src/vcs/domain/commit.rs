//! Commit records and commit-message classification.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Substrings that mark a commit as finishing the work on its branch.
///
/// Matched case-insensitively. The last entry is the Russian stem for
/// "ready", which generation jobs use in their final commit messages.
const COMPLETION_MARKERS: [&str; 4] = ["complete", "done", "finished", "готов"];

/// Marker that produces an explicit [`CommitEvent::Complete`] event.
const COMPLETE_EVENT_MARKER: &str = "complete";

/// Checkpoint number from which a branch counts as finished.
const COMPLETING_CHECKPOINT: u32 = 2;

static CHECKPOINT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)checkpoint\s+(\d+)").ok());

/// One commit on a remote branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Author timestamp.
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// Creates a commit record.
    #[must_use]
    pub fn new(sha: impl Into<String>, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            timestamp,
        }
    }

    /// Returns the lifecycle event this commit announces, if any.
    #[must_use]
    pub fn event(&self) -> Option<CommitEvent> {
        classify_commit(&self.message)
    }

    /// Returns `true` when this commit marks its branch as finished.
    #[must_use]
    pub fn marks_completion(&self) -> bool {
        is_completion_message(&self.message)
    }
}

/// Lifecycle event parsed from a commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "number", rename_all = "snake_case")]
pub enum CommitEvent {
    /// The job reports its work as complete.
    Complete,
    /// The job reached a numbered checkpoint.
    Checkpoint(u32),
}

impl CommitEvent {
    /// Returns the checkpoint label used in task history, if this is a
    /// checkpoint event.
    #[must_use]
    pub fn checkpoint_name(self) -> Option<String> {
        match self {
            Self::Complete => None,
            Self::Checkpoint(number) => Some(format!("checkpoint {number}")),
        }
    }
}

/// Classifies a commit message into a lifecycle event.
///
/// An explicit "complete" wins over a checkpoint number. Other completion
/// words ("done", "finished") do not produce an event on their own; they only
/// feed [`is_completion_message`].
///
/// # Examples
///
///     use branchwarden::vcs::domain::{CommitEvent, classify_commit};
///
///     assert_eq!(classify_commit("Checkpoint 1 done"), Some(CommitEvent::Checkpoint(1)));
///     assert_eq!(classify_commit("Glossary COMPLETE"), Some(CommitEvent::Complete));
///     assert_eq!(classify_commit("wip"), None);
#[must_use]
pub fn classify_commit(message: &str) -> Option<CommitEvent> {
    let lowered = message.to_lowercase();
    if lowered.contains(COMPLETE_EVENT_MARKER) {
        return Some(CommitEvent::Complete);
    }
    checkpoint_number(&lowered).map(CommitEvent::Checkpoint)
}

/// Branch-completion predicate applied to the newest commit of a branch.
///
/// True when the message carries any completion marker, or names
/// `checkpoint N` with `N >= 2`.
#[must_use]
pub fn is_completion_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    if COMPLETION_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return true;
    }
    checkpoint_number(&lowered).is_some_and(|number| number >= COMPLETING_CHECKPOINT)
}

fn checkpoint_number(message: &str) -> Option<u32> {
    let pattern = CHECKPOINT_PATTERN.as_ref()?;
    let captures = pattern.captures(message)?;
    captures.get(1)?.as_str().parse().ok()
}
