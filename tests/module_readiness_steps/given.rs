//! Given steps for module readiness BDD scenarios.

use super::world::{ReadinessWorld, run_async};
use branchwarden::task::domain::TaskKind;
use branchwarden::vcs::domain::BranchName;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a "{kind}" task for "{book}" module {module:u32}"#)]
fn linked_task(
    world: &mut ReadinessWorld,
    kind: String,
    book: String,
    module: u32,
) -> Result<(), eyre::Report> {
    let parsed = TaskKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid task kind in scenario: {err}"))?;
    let task = run_async(world.registry.create_task(parsed, &book, module, None))
        .wrap_err("create task for readiness scenario")?;

    let branch = BranchName::new(format!(
        "claude/{}-{module}-{kind}-{}",
        book.to_lowercase(),
        world.tasks.len()
    ))
    .wrap_err("build branch name")?;
    let linked = run_async(world.registry.link_branch(task.id(), branch))
        .wrap_err("link branch for readiness scenario")?;
    if !linked {
        return Err(eyre::eyre!("task {} was not linked", task.id()));
    }

    world.tasks.push((task.id(), parsed));
    Ok(())
}
