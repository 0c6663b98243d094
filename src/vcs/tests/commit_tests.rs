//! Commit classification and branch naming tests.

use crate::vcs::domain::{
    BranchName, CommitEvent, VcsDomainError, classify_commit, is_completion_message,
    is_content_branch,
};
use rstest::rstest;

#[rstest]
#[case("Checkpoint 1 done", Some(CommitEvent::Checkpoint(1)))]
#[case("checkpoint 2: half the terms", Some(CommitEvent::Checkpoint(2)))]
#[case("CHECKPOINT   12 reached", Some(CommitEvent::Checkpoint(12)))]
#[case("Glossary complete", Some(CommitEvent::Complete))]
#[case("Checkpoint 3 - complete", Some(CommitEvent::Complete))]
#[case("finished all questions", None)]
#[case("wip", None)]
#[case("checkpoint reached", None)]
fn classifies_commit_messages(#[case] message: &str, #[case] expected: Option<CommitEvent>) {
    assert_eq!(classify_commit(message), expected);
}

#[rstest]
#[case("Checkpoint 1 done", true)]
#[case("checkpoint 2: half the terms", true)]
#[case("checkpoint 1: first batch", false)]
#[case("All questions FINISHED", true)]
#[case("Глоссарий готов", true)]
#[case("Task complete", true)]
#[case("wip", false)]
fn completion_predicate(#[case] message: &str, #[case] expected: bool) {
    assert_eq!(is_completion_message(message), expected);
}

#[rstest]
fn checkpoint_names_are_stable() {
    assert_eq!(
        CommitEvent::Checkpoint(3).checkpoint_name().as_deref(),
        Some("checkpoint 3")
    );
    assert_eq!(CommitEvent::Complete.checkpoint_name(), None);
}

#[rstest]
#[case("claude/add-economics-module-5-glossary-x1y2z", true)]
#[case("claude/add-economics-module-5-tests-x1y2z", true)]
#[case("claude/add-economics-module-5-QBANK-x1y2z", true)]
#[case("claude/fix-readme-typo", false)]
#[case("claude/merge-glossary", false)]
fn content_branches_are_recognised(#[case] name: &str, #[case] expected: bool) {
    assert_eq!(is_content_branch(name), expected);
    let branch = BranchName::new(name).expect("valid branch name");
    assert_eq!(branch.is_content_branch(), expected);
}

#[rstest]
#[case("")]
#[case("claude/has space")]
#[case("claude/bad:name")]
fn invalid_branch_names_are_rejected(#[case] raw: &str) {
    assert_eq!(
        BranchName::new(raw),
        Err(VcsDomainError::InvalidBranchName(raw.to_owned()))
    );
}
