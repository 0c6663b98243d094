//! Task kind and lifecycle status.

use super::{ParseTaskKindError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deliverable a task produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Glossary for one module.
    Glossary,
    /// Question bank for one module.
    Tests,
}

impl TaskKind {
    /// Both kinds, in module pair order.
    pub const ALL: [Self; 2] = [Self::Glossary, Self::Tests];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Glossary => "glossary",
            Self::Tests => "tests",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskKind {
    type Error = ParseTaskKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "glossary" => Ok(Self::Glossary),
            "tests" | "qbank" => Ok(Self::Tests),
            _ => Err(ParseTaskKindError(value.to_owned())),
        }
    }
}

/// Task lifecycle status.
///
/// `Unlinked` also accepts the legacy `in_progress` spelling when reading
/// persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created; no branch has been linked yet.
    #[serde(alias = "in_progress")]
    Unlinked,
    /// A branch is linked and work is under way.
    Linked,
    /// The branch head marks the work finished; waiting for merge.
    ReadyToMerge,
    /// Merged or closed by the operator. Terminal.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unlinked => "unlinked",
            Self::Linked => "linked",
            Self::ReadyToMerge => "ready_to_merge",
            Self::Completed => "completed",
        }
    }

    /// Returns whether the task still lives in the active collection.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Completed)
    }

    /// Returns whether the status needs a linked branch.
    #[must_use]
    pub const fn requires_branch(self) -> bool {
        matches!(self, Self::Linked | Self::ReadyToMerge)
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Unlinked, Self::Linked)
                | (Self::Linked, Self::ReadyToMerge)
                | (
                    Self::Unlinked | Self::Linked | Self::ReadyToMerge,
                    Self::Completed
                )
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unlinked" | "in_progress" => Ok(Self::Unlinked),
            "linked" => Ok(Self::Linked),
            "ready_to_merge" => Ok(Self::ReadyToMerge),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}
