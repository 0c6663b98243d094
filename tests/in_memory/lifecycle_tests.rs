//! Module lifecycle from creation to merge.

use super::helpers::{RecordedStack, names, recorded};
use branchwarden::monitor::domain::MonitorEvent;
use branchwarden::initiator::InitiatorError;
use branchwarden::task::domain::{ModuleKey, TaskKind, TaskStatus};
use branchwarden::vcs::domain::{BranchName, MergeStep};
use rstest::rstest;

const GLOSSARY_BRANCH: &str = "claude/add-economics-module-5-glossary-aB3nQ";
const TESTS_BRANCH: &str = "claude/add-economics-module-5-tests-Zx81p";

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn module_goes_from_creation_to_merge(recorded: RecordedStack) {
    let mut world = recorded;
    let created = world
        .stack
        .initiator
        .create_module_pair("econ", 5)
        .await
        .expect("pair creation succeeds");
    assert!(created
        .glossary_prompt
        .contains("claude/add-economics-module-5-glossary-XXXXX"));

    world.stack.commit(GLOSSARY_BRANCH, "g1", "Create branch", 2);
    world.stack.commit(TESTS_BRANCH, "t1", "Create branch", 2);
    let linked = world.stack.cycle().await;
    assert_eq!(linked.linked, 2);

    world.stack.commit(GLOSSARY_BRANCH, "g2", "Checkpoint 1 saved", 1);
    world.stack.commit(TESTS_BRANCH, "t2", "checkpoint 1", 1);
    world.stack.cycle().await;
    world.stack.commit(GLOSSARY_BRANCH, "g3", "Glossary finished", 0);
    world.stack.commit(TESTS_BRANCH, "t3", "checkpoint 2: 120 questions", 0);
    world.stack.cycle().await;

    let events = world.drain();
    assert_eq!(
        names(&events),
        vec![
            "branch_linked",
            "branch_linked",
            "checkpoint",
            "checkpoint",
            "task_completed",
            "checkpoint",
            "task_completed",
            "module_ready",
        ]
    );

    let module = ModuleKey::new("Economics", 5).expect("valid module");
    let report = world
        .stack
        .initiator
        .request_merge(&module)
        .await
        .expect("merge succeeds");
    assert!(report.steps.iter().any(|line| line == "Deleted module branches"));
    assert_eq!(
        world
            .stack
            .workspace
            .deleted_remote_branches()
            .expect("deleted branches readable"),
        vec![GLOSSARY_BRANCH.to_owned(), TESTS_BRANCH.to_owned()]
    );

    for id in [created.pair.glossary_id, created.pair.tests_id] {
        let task = world
            .stack
            .registry
            .get(id)
            .await
            .expect("lookup succeeds")
            .expect("task exists");
        assert_eq!(task.status(), TaskStatus::Completed);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merged_branches_vanishing_does_not_touch_completed_tasks(recorded: RecordedStack) {
    let mut world = recorded;
    let created = world
        .stack
        .initiator
        .create_module_pair("econ", 5)
        .await
        .expect("pair creation succeeds");
    world.stack.commit(GLOSSARY_BRANCH, "g1", "Create branch", 2);
    world.stack.commit(TESTS_BRANCH, "t1", "Create branch", 2);
    world.stack.cycle().await;
    world.stack.commit(GLOSSARY_BRANCH, "g2", "done", 0);
    world.stack.commit(TESTS_BRANCH, "t2", "done", 0);
    world.stack.cycle().await;
    world
        .stack
        .initiator
        .request_merge(&ModuleKey::new("Economics", 5).expect("valid module"))
        .await
        .expect("merge succeeds");

    for name in [GLOSSARY_BRANCH, TESTS_BRANCH] {
        world
            .stack
            .remote
            .remove_branch(&BranchName::new(name).expect("valid branch"))
            .expect("remove succeeds");
    }
    let report = world.stack.cycle().await;

    assert_eq!(report.removed, 0);
    let completed = world
        .stack
        .registry
        .list_by_group(created.pair.group_id)
        .await
        .expect("list succeeds");
    assert_eq!(completed.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_prune_keeps_ready_tasks_after_branches_are_deleted(recorded: RecordedStack) {
    let mut world = recorded;
    let created = world
        .stack
        .initiator
        .create_module_pair("econ", 5)
        .await
        .expect("pair creation succeeds");
    world.stack.commit(GLOSSARY_BRANCH, "g1", "Create branch", 2);
    world.stack.commit(TESTS_BRANCH, "t1", "Create branch", 2);
    world.stack.cycle().await;
    world.stack.commit(GLOSSARY_BRANCH, "g2", "done", 0);
    world.stack.commit(TESTS_BRANCH, "t2", "done", 0);
    world.stack.cycle().await;
    world
        .stack
        .workspace
        .fail_on("prune", "fatal: unable to access remote")
        .expect("script failure");

    let result = world
        .stack
        .initiator
        .request_merge(&ModuleKey::new("Economics", 5).expect("valid module"))
        .await;
    let Err(InitiatorError::Merge { step, .. }) = result else {
        panic!("expected prune failure, got {result:?}");
    };
    assert_eq!(step, MergeStep::Prune);

    for name in [GLOSSARY_BRANCH, TESTS_BRANCH] {
        world
            .stack
            .remote
            .remove_branch(&BranchName::new(name).expect("valid branch"))
            .expect("remove succeeds");
    }
    let report = world.stack.cycle().await;

    assert_eq!(report.removed, 0);
    for id in [created.pair.glossary_id, created.pair.tests_id] {
        let task = world
            .stack
            .registry
            .get(id)
            .await
            .expect("lookup succeeds")
            .expect("task survives the cycle");
        assert_eq!(task.status(), TaskStatus::ReadyToMerge);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manual_link_is_kept_when_another_branch_matches(recorded: RecordedStack) {
    let mut world = recorded;
    let created = world
        .stack
        .initiator
        .create_task(TaskKind::Glossary, "econ", 5)
        .await
        .expect("task creation succeeds");
    let manual = BranchName::new("claude/economics-5-glossary-manual").expect("valid branch");
    world
        .stack
        .registry
        .link_branch(created.task.id(), manual.clone())
        .await
        .expect("link succeeds");
    world.stack.commit(manual.as_str(), "m1", "Start", 1);
    world.stack.commit(GLOSSARY_BRANCH, "g1", "Start", 1);

    world.stack.cycle().await;

    let stored = world
        .stack
        .registry
        .get(created.task.id())
        .await
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(stored.branch(), Some(&manual));
    assert!(!world
        .drain()
        .iter()
        .any(|event| matches!(event, MonitorEvent::BranchLinked(_))));
}
