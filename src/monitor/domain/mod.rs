//! Domain model for lifecycle notifications.

mod event;

pub use event::{MonitorEvent, TaskRef};
