//! Step definitions for module readiness scenarios.

pub mod world;
mod given;
mod when;
mod then;
