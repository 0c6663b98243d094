//! Step definitions for stall detection scenarios.

pub mod world;
mod given;
mod when;
mod then;
