//! When steps for stall detection BDD scenarios.

use super::world::{StallWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("{minutes:u32} minutes pass and the loop runs")]
fn minutes_pass(world: &mut StallWorld, minutes: u32) -> Result<(), eyre::Report> {
    world.clock.advance_minutes(i64::from(minutes));
    run_async(world.monitor.run_cycle()).wrap_err("run reconciliation cycle")?;
    Ok(())
}

#[when("a commit is pushed to the branch")]
fn commit_pushed(world: &mut StallWorld) -> Result<(), eyre::Report> {
    let branch = world
        .branch
        .clone()
        .ok_or_else(|| eyre::eyre!("missing linked branch in scenario world"))?;
    world.push_commit(&branch)
}
