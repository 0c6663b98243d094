//! Branch-name value object and naming conventions.

use super::VcsDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a validated branch name.
const MAX_BRANCH_NAME_LENGTH: usize = 255;

/// Name fragments that mark a branch as carrying generated content.
const CONTENT_MARKERS: [&str; 3] = ["-glossary-", "-tests-", "-qbank-"];

/// Validated remote branch name.
///
/// Branch names must be non-empty after trimming, must not contain
/// whitespace or colon characters, and must not exceed
/// `MAX_BRANCH_NAME_LENGTH` characters. A leading `origin/`-style remote
/// prefix is not stripped; callers pass bare branch names.
///
/// # Examples
///
///     use branchwarden::vcs::domain::BranchName;
///
///     let name = BranchName::new("claude/add-economics-module-3-tests-x1Y2z").expect("valid");
///     assert!(name.is_content_branch());
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`VcsDomainError::InvalidBranchName`] when the value is empty,
    /// contains whitespace or a colon, or exceeds the length limit.
    pub fn new(value: impl Into<String>) -> Result<Self, VcsDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if Self::is_invalid_branch_name(normalized) {
            return Err(VcsDomainError::InvalidBranchName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    fn is_invalid_branch_name(name: &str) -> bool {
        let is_empty = name.is_empty();
        let contains_forbidden_char = name.chars().any(|ch| ch.is_whitespace() || ch == ':');
        let exceeds_length_limit = name.len() > MAX_BRANCH_NAME_LENGTH;

        is_empty || contains_forbidden_char || exceeds_length_limit
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the name marks a glossary, tests or qbank branch.
    #[must_use]
    pub fn is_content_branch(&self) -> bool {
        is_content_branch(&self.0)
    }
}

/// Reports whether a branch name carries generated content.
///
/// Maintenance branches (fixes, refactors, merges) do not match and are
/// ignored by new-branch notifications.
#[must_use]
pub fn is_content_branch(name: &str) -> bool {
    let lowered = name.to_lowercase();
    CONTENT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = VcsDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for BranchName {
    type Error = VcsDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}
