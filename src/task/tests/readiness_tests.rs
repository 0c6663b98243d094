//! Module readiness across task counts and kinds.

use crate::task::domain::{ModuleKey, Task, TaskKind, TaskStatus, module_ready};
use crate::test_support::FixedClock;
use crate::vcs::domain::BranchName;
use rstest::rstest;

fn task(kind: TaskKind, ready: bool, clock: &FixedClock) -> Task {
    let key = ModuleKey::new("Economics", 5).expect("valid module key");
    let mut task = Task::new(kind, &key, None, clock);
    if ready {
        let name = format!("claude/add-economics-module-5-{kind}-{}", task.id().into_inner().simple());
        task.link_branch(BranchName::new(name).expect("valid branch"), clock)
            .expect("link succeeds");
        task.transition_to(TaskStatus::ReadyToMerge, clock)
            .expect("ready transition succeeds");
    }
    task
}

#[rstest]
#[case::no_tasks(&[], false)]
#[case::single_ready_glossary(&[(TaskKind::Glossary, true)], false)]
#[case::pair_both_ready(&[(TaskKind::Glossary, true), (TaskKind::Tests, true)], true)]
#[case::pair_one_pending(&[(TaskKind::Glossary, true), (TaskKind::Tests, false)], false)]
#[case::two_glossaries(&[(TaskKind::Glossary, true), (TaskKind::Glossary, true)], false)]
#[case::duplicate_tests(
    &[(TaskKind::Glossary, true), (TaskKind::Tests, true), (TaskKind::Tests, true)],
    false
)]
fn module_ready_requires_exactly_one_ready_task_per_kind(
    #[case] specs: &[(TaskKind, bool)],
    #[case] expected: bool,
) {
    let clock = FixedClock::at_epoch();
    let tasks: Vec<Task> = specs
        .iter()
        .map(|(kind, ready)| task(*kind, *ready, &clock))
        .collect();

    assert_eq!(module_ready(&tasks), expected);
}
