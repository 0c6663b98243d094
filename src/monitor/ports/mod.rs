//! Port contracts for delivering notifications.

pub mod sink;

pub use sink::{NotificationSink, NotificationSinkError, NotificationSinkResult};
