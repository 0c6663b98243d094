//! Given steps for stall detection BDD scenarios.

use super::world::{StallWorld, run_async};
use branchwarden::task::domain::TaskKind;
use branchwarden::vcs::domain::BranchName;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a "{kind}" task for "{book}" module {module:u32} linked to its branch"#)]
fn linked_task(
    world: &mut StallWorld,
    kind: String,
    book: String,
    module: u32,
) -> Result<(), eyre::Report> {
    let parsed = TaskKind::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid task kind in scenario: {err}"))?;
    let task = run_async(world.registry.create_task(parsed, &book, module, None))
        .wrap_err("create task for stall scenario")?;

    let branch = BranchName::new(format!(
        "claude/add-{}-module-{module}-{kind}-St4ll",
        book.to_lowercase()
    ))
    .wrap_err("build branch name")?;
    world.push_commit(&branch)?;

    let report = run_async(world.monitor.run_cycle()).wrap_err("run linking cycle")?;
    if report.linked != 1 {
        return Err(eyre::eyre!("task {} was not linked: {report:?}", task.id()));
    }
    world.branch = Some(branch);
    Ok(())
}
