//! End-to-end tests over the in-memory adapters.
//!
//! Tests are organized into modules by functionality:
//! - `lifecycle_tests`: Create, link, complete and merge a module
//! - `notification_tests`: Event delivery through the channel sink

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

mod in_memory {
    pub mod helpers;

    mod lifecycle_tests;
    mod notification_tests;
}
