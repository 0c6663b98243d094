//! Remote repository access for Branchwarden.
//!
//! This module covers everything that touches branch history: listing and
//! classifying remote branches and commits, matching tasks to branch names,
//! and merging finished module branches into the integration branch. It
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
