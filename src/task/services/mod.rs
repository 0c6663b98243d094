//! Application services for the task registry.

mod registry;

pub use registry::{ModulePair, TaskRegistry, TaskRegistryError, TaskRegistryResult};
