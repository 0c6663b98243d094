//! Branchwarden: task and branch reconciliation for generated course content.
//!
//! Content generation jobs run outside this process. Each job writes a
//! glossary or a tests deliverable for one book module and pushes it to a
//! remote branch. This crate keeps a durable registry of those jobs, polls the
//! remote branch list and commit history, links tasks to branches, detects
//! checkpoints, completion and stalls, and merges finished modules back into
//! the integration branch.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (files, `git`, memory)
//!
//! # Modules
//!
//! - [`task`]: Durable task registry and lifecycle state machine
//! - [`vcs`]: Branch oracle, branch matcher and merge coordinator
//! - [`monitor`]: Reconciliation loop and operator notifications
//! - [`initiator`]: Front-end facing API for creating and merging work
//! - [`catalog`]: Static book lookup table
//! - [`config`]: TOML configuration
//! - [`logging`]: Tracing subscriber setup

pub mod catalog;
pub mod config;
pub mod initiator;
pub mod logging;
pub mod monitor;
pub mod task;
pub mod vcs;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
