//! When steps for module readiness BDD scenarios.

use super::world::{ReadinessWorld, run_async};
use branchwarden::task::domain::TaskKind;
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("every task is marked ready to merge")]
fn mark_every_task_ready(world: &mut ReadinessWorld) -> Result<(), eyre::Report> {
    for (id, _) in &world.tasks {
        run_async(world.registry.mark_ready(*id)).wrap_err("mark task ready")?;
    }
    Ok(())
}

#[when(r#"only the "{kind}" task is marked ready to merge"#)]
fn mark_one_task_ready(world: &mut ReadinessWorld, kind: String) -> Result<(), eyre::Report> {
    let wanted = TaskKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid task kind in scenario: {err}"))?;
    let (id, _) = world
        .tasks
        .iter()
        .find(|(_, task_kind)| *task_kind == wanted)
        .ok_or_else(|| eyre::eyre!("no {kind} task in scenario world"))?;
    run_async(world.registry.mark_ready(*id)).wrap_err("mark task ready")?;
    Ok(())
}
