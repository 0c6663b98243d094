//! Notification sink port.

use crate::monitor::domain::MonitorEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for sink operations.
pub type NotificationSinkResult<T> = Result<T, NotificationSinkError>;

/// Receives lifecycle events and renders them to an operator.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one event.
    async fn notify(&self, event: &MonitorEvent) -> NotificationSinkResult<()>;
}

/// Errors returned by notification sinks.
#[derive(Debug, Clone, Error)]
pub enum NotificationSinkError {
    /// The receiving side has gone away.
    #[error("notification channel closed")]
    Closed,

    /// Delivery failed.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationSinkError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
