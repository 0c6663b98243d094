//! Then steps for module readiness BDD scenarios.

use super::world::{ReadinessWorld, run_async};
use branchwarden::task::domain::ModuleKey;
use eyre::WrapErr;
use rstest_bdd_macros::then;

fn module_ready(world: &ReadinessWorld, book: &str, module: u32) -> Result<bool, eyre::Report> {
    let key = ModuleKey::new(book, module).wrap_err("build module key")?;
    run_async(world.registry.is_module_ready(&key)).wrap_err("query module readiness")
}

#[then(r#"module "{book}" {module:u32} is ready to merge"#)]
fn module_is_ready(world: &ReadinessWorld, book: String, module: u32) -> Result<(), eyre::Report> {
    if !module_ready(world, &book, module)? {
        return Err(eyre::eyre!("expected {book} module {module} to be ready"));
    }
    Ok(())
}

#[then(r#"module "{book}" {module:u32} is not ready to merge"#)]
fn module_is_not_ready(
    world: &ReadinessWorld,
    book: String,
    module: u32,
) -> Result<(), eyre::Report> {
    if module_ready(world, &book, module)? {
        return Err(eyre::eyre!("expected {book} module {module} not to be ready"));
    }
    Ok(())
}
