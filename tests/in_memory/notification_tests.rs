//! Delivery of monitor events to front ends.

use std::sync::Arc;

use super::helpers::Stack;
use branchwarden::monitor::{
    adapters::{ChannelSink, TracingSink},
    domain::MonitorEvent,
};
use branchwarden::task::domain::TaskKind;

const BRANCH: &str = "claude/add-ethics-module-2-tests-Qw3rT";

#[tokio::test(flavor = "multi_thread")]
async fn channel_receives_new_branches_and_stall_warnings() {
    let (sink, mut receiver) = ChannelSink::new(16);
    let mut stack = Stack::with_sink(Arc::new(sink));
    stack
        .initiator
        .create_task(TaskKind::Tests, "ethics", 2)
        .await
        .expect("task creation succeeds");
    stack.cycle().await;

    stack.commit(BRANCH, "a1", "Start question bank", 0);
    stack.cycle().await;
    stack.clock.advance_minutes(25);
    stack.cycle().await;
    stack.cycle().await;

    let mut received = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        received.push(event);
    }
    let [
        MonitorEvent::NewBranchDetected { branch },
        MonitorEvent::BranchLinked(linked),
        MonitorEvent::InactiveWarning {
            minutes_since_commit,
            ..
        },
    ] = received.as_slice()
    else {
        panic!("unexpected events: {received:?}");
    };
    assert_eq!(branch.as_str(), BRANCH);
    assert_eq!(linked.kind, TaskKind::Tests);
    assert_eq!(*minutes_since_commit, 25);
}

#[tokio::test(flavor = "multi_thread")]
async fn closed_channel_does_not_fail_the_cycle() {
    let (sink, receiver) = ChannelSink::new(1);
    drop(receiver);
    let mut stack = Stack::with_sink(Arc::new(sink));
    stack
        .initiator
        .create_task(TaskKind::Glossary, "ethics", 2)
        .await
        .expect("task creation succeeds");
    stack.commit("claude/add-ethics-module-2-glossary-Zz1aa", "b1", "Start", 0);

    let report = stack.cycle().await;

    assert_eq!(report.linked, 1);
    assert_eq!(report.notifications, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn tracing_sink_accepts_every_event() {
    let mut stack = Stack::with_sink(Arc::new(TracingSink));
    stack
        .initiator
        .create_module_pair("ethics", 1)
        .await
        .expect("pair creation succeeds");
    stack.commit("claude/add-ethics-module-1-glossary-Aa1bb", "g1", "checkpoint 1", 0);
    stack.commit("claude/add-ethics-module-1-tests-Cc2dd", "t1", "checkpoint 1", 0);
    stack.cycle().await;
    stack.commit("claude/add-ethics-module-1-glossary-Aa1bb", "g2", "complete", 0);
    stack.commit("claude/add-ethics-module-1-tests-Cc2dd", "t2", "complete", 0);

    let report = stack.cycle().await;

    assert_eq!(report.completed, 2);
    assert_eq!(report.notifications, report.checkpoints + 3);
}
