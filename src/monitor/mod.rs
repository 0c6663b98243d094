//! Reconciliation loop and operator notifications.
//!
//! The loop compares the task registry with the remote branch set on a fixed
//! interval, advances each active task and pushes lifecycle events to a
//! notification sink. It follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
