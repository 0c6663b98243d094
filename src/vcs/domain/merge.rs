//! Merge procedure value types.

use super::BranchName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conflict strategy for a single merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Regular three-way merge; conflicts are reported back.
    ThreeWay,
    /// Three-way merge that takes the incoming side of every conflicting hunk.
    TakeIncoming,
}

/// Result of one merge attempt in the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAttempt {
    /// The merge committed without conflicts.
    Clean,
    /// The merge stopped with the listed paths in conflict.
    Conflicted(Vec<String>),
}

/// Steps of the module merge procedure, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStep {
    /// Fetch the remote.
    Fetch,
    /// Check out the integration branch.
    CheckoutIntegration,
    /// Pull the integration branch.
    Pull,
    /// Merge the glossary branch.
    MergeGlossary,
    /// Merge the tests branch.
    MergeTests,
    /// Resolve known conflicts left by the tests merge.
    ResolveConflicts,
    /// Commit the resolved merge.
    CommitResolution,
    /// Push the integration branch.
    Push,
    /// Delete both module branches on the remote.
    DeleteBranches,
    /// Prune stale remote-tracking refs.
    Prune,
}

impl MergeStep {
    /// Returns a short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fetch => "fetch remote",
            Self::CheckoutIntegration => "checkout integration branch",
            Self::Pull => "pull integration branch",
            Self::MergeGlossary => "merge glossary branch",
            Self::MergeTests => "merge tests branch",
            Self::ResolveConflicts => "resolve conflicts",
            Self::CommitResolution => "commit conflict resolution",
            Self::Push => "push integration branch",
            Self::DeleteBranches => "delete module branches",
            Self::Prune => "prune remote-tracking refs",
        }
    }
}

impl fmt::Display for MergeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Input for merging one ready module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Branch carrying the glossary deliverable.
    pub glossary: BranchName,
    /// Branch carrying the tests deliverable.
    pub tests: BranchName,
    /// Repository folder of the module's book; conflicts inside it may be
    /// auto-resolved.
    pub book_folder: String,
}

impl MergeRequest {
    /// Creates a merge request.
    #[must_use]
    pub fn new(glossary: BranchName, tests: BranchName, book_folder: impl Into<String>) -> Self {
        Self {
            glossary,
            tests,
            book_folder: book_folder.into(),
        }
    }
}

/// Terminal result of the merge procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Every step succeeded.
    Merged {
        /// Human-readable log of completed steps.
        steps: Vec<String>,
    },
    /// A step failed; later steps were not attempted and nothing was rolled
    /// back.
    Failed {
        /// The step that failed.
        step: MergeStep,
        /// Underlying failure message.
        message: String,
        /// Steps completed before the failure.
        steps: Vec<String>,
    },
}

impl MergeOutcome {
    /// Returns `true` for [`MergeOutcome::Merged`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }

    /// Returns the log of completed steps.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        match self {
            Self::Merged { steps } | Self::Failed { steps, .. } => steps,
        }
    }

    /// Renders an operator-facing summary.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Merged { steps } => steps.join("\n"),
            Self::Failed { step, message, .. } => format!("{step} failed: {message}"),
        }
    }
}
