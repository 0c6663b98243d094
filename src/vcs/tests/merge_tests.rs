//! Merge coordinator tests against the scripted working copy.

use std::sync::Arc;

use crate::vcs::{
    adapters::memory::InMemoryMergeWorkspace,
    domain::{BranchName, MergeOutcome, MergeRequest, MergeStep, MergeStrategy},
    services::MergeCoordinator,
};
use rstest::{fixture, rstest};

const GLOSSARY: &str = "claude/add-economics-module-5-glossary-g1g2g";
const TESTS: &str = "claude/add-economics-module-5-tests-t1t2t";
const METADATA: &str = "book2_economics/module_5.json";

struct Harness {
    workspace: InMemoryMergeWorkspace,
    coordinator: MergeCoordinator<InMemoryMergeWorkspace>,
    request: MergeRequest,
}

#[fixture]
fn harness() -> Harness {
    let workspace = InMemoryMergeWorkspace::new();
    let coordinator = MergeCoordinator::new(Arc::new(workspace.clone()), "main");
    let request = MergeRequest::new(
        BranchName::new(GLOSSARY).expect("valid branch"),
        BranchName::new(TESTS).expect("valid branch"),
        "book2_economics",
    );
    Harness {
        workspace,
        coordinator,
        request,
    }
}

fn failed_step(outcome: &MergeOutcome) -> Option<MergeStep> {
    match outcome {
        MergeOutcome::Failed { step, .. } => Some(*step),
        MergeOutcome::Merged { .. } => None,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn clean_merge_runs_every_step(harness: Harness) {
    let outcome = harness.coordinator.merge_module(&harness.request).await;

    assert!(outcome.is_success(), "{}", outcome.summary());
    let operations = harness.workspace.operations().expect("operations");
    assert_eq!(
        operations,
        [
            "fetch".to_owned(),
            "checkout main".to_owned(),
            "pull".to_owned(),
            format!("merge {GLOSSARY}"),
            format!("merge {TESTS}"),
            "push main".to_owned(),
            format!("delete_remote_branch {GLOSSARY}"),
            format!("delete_remote_branch {TESTS}"),
            "prune".to_owned(),
        ]
    );
    assert!(outcome.steps().iter().any(|line| line == "Pushed main"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn metadata_conflict_is_resolved_by_union(harness: Harness) {
    harness
        .workspace
        .script_conflict(TESTS, MergeStrategy::ThreeWay, [METADATA.to_owned()])
        .expect("script conflict");
    harness
        .workspace
        .set_conflict_sides(METADATA, r#"{"glossary_terms": 42}"#, r#"{"questions": 120}"#)
        .expect("set sides");

    let outcome = harness.coordinator.merge_module(&harness.request).await;

    assert!(outcome.is_success(), "{}", outcome.summary());
    let staged = harness
        .workspace
        .staged(METADATA)
        .expect("staged lookup")
        .expect("resolution staged");
    let merged: serde_json::Value = serde_json::from_str(&staged).expect("merged JSON");
    assert_eq!(
        merged,
        serde_json::json!({"glossary_terms": 42, "questions": 120})
    );
    assert_eq!(
        harness.workspace.deleted_remote_branches().expect("deleted"),
        [GLOSSARY.to_owned(), TESTS.to_owned()]
    );
    assert_eq!(
        harness.workspace.commits().expect("commits"),
        [format!("Merge {TESTS}")]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn glossary_conflict_retries_with_incoming_side(harness: Harness) {
    harness
        .workspace
        .script_conflict(GLOSSARY, MergeStrategy::ThreeWay, ["index.html".to_owned()])
        .expect("script conflict");

    let outcome = harness.coordinator.merge_module(&harness.request).await;

    assert!(outcome.is_success(), "{}", outcome.summary());
    let operations = harness.workspace.operations().expect("operations");
    let glossary_merges = operations
        .iter()
        .filter(|op| **op == format!("merge {GLOSSARY}"))
        .count();
    assert_eq!(glossary_merges, 2);
    assert!(operations.iter().any(|op| op == "abort_merge"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn persistent_glossary_conflict_fails_the_glossary_step(harness: Harness) {
    for strategy in [MergeStrategy::ThreeWay, MergeStrategy::TakeIncoming] {
        harness
            .workspace
            .script_conflict(GLOSSARY, strategy, ["index.html".to_owned()])
            .expect("script conflict");
    }

    let outcome = harness.coordinator.merge_module(&harness.request).await;

    assert_eq!(failed_step(&outcome), Some(MergeStep::MergeGlossary));
    assert!(harness.workspace.deleted_remote_branches().expect("deleted").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_tests_conflict_aborts(harness: Harness) {
    harness
        .workspace
        .script_conflict(
            TESTS,
            MergeStrategy::ThreeWay,
            [METADATA.to_owned(), "README.md".to_owned()],
        )
        .expect("script conflict");

    let outcome = harness.coordinator.merge_module(&harness.request).await;

    assert_eq!(failed_step(&outcome), Some(MergeStep::MergeTests));
    assert!(outcome.summary().contains("README.md"));
    let operations = harness.workspace.operations().expect("operations");
    assert_eq!(operations.last().map(String::as_str), Some("abort_merge"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_metadata_fails_resolution(harness: Harness) {
    harness
        .workspace
        .script_conflict(TESTS, MergeStrategy::ThreeWay, [METADATA.to_owned()])
        .expect("script conflict");
    harness
        .workspace
        .set_conflict_sides(METADATA, "[]", "{}")
        .expect("set sides");

    let outcome = harness.coordinator.merge_module(&harness.request).await;

    assert_eq!(failed_step(&outcome), Some(MergeStep::ResolveConflicts));
}

#[rstest]
#[case("fetch", MergeStep::Fetch)]
#[case("checkout", MergeStep::CheckoutIntegration)]
#[case("pull", MergeStep::Pull)]
#[case("push", MergeStep::Push)]
#[case("delete_remote_branch", MergeStep::DeleteBranches)]
#[case("prune", MergeStep::Prune)]
#[tokio::test(flavor = "multi_thread")]
async fn failing_operation_short_circuits(
    harness: Harness,
    #[case] operation: &str,
    #[case] expected: MergeStep,
) {
    harness
        .workspace
        .fail_on(operation, "fatal: boom")
        .expect("script failure");

    let outcome = harness.coordinator.merge_module(&harness.request).await;

    let MergeOutcome::Failed { step, message, .. } = &outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(*step, expected);
    assert!(message.contains("fatal: boom"), "{message}");
}
