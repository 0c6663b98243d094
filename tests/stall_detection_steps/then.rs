//! Then steps for stall detection BDD scenarios.

use super::world::StallWorld;
use branchwarden::monitor::domain::MonitorEvent;
use rstest_bdd_macros::then;

fn warnings(world: &StallWorld) -> Result<usize, eyre::Report> {
    let events = world
        .sink
        .events()
        .map_err(|err| eyre::eyre!("read recorded events: {err}"))?;
    Ok(events
        .iter()
        .filter(|event| matches!(event, MonitorEvent::InactiveWarning { .. }))
        .count())
}

fn expect_warnings(world: &StallWorld, expected: usize) -> Result<(), eyre::Report> {
    let actual = warnings(world)?;
    if actual != expected {
        return Err(eyre::eyre!(
            "expected {expected} inactivity warnings, found {actual}"
        ));
    }
    Ok(())
}

#[then("{count:usize} inactivity warning has been raised")]
fn warning_raised(world: &StallWorld, count: usize) -> Result<(), eyre::Report> {
    expect_warnings(world, count)
}

#[then("{count:usize} inactivity warnings have been raised")]
fn warnings_raised(world: &StallWorld, count: usize) -> Result<(), eyre::Report> {
    expect_warnings(world, count)
}
