//! Sink that keeps every event in memory.

use crate::monitor::{
    domain::MonitorEvent,
    ports::{NotificationSink, NotificationSinkError, NotificationSinkResult},
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// In-memory sink for tests and dry runs.
///
/// Clones share the same event list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<RwLock<Vec<MonitorEvent>>>,
    failing: Arc<RwLock<bool>>,
}

fn lock_error(err: impl ToString) -> NotificationSinkError {
    NotificationSinkError::delivery(std::io::Error::other(err.to_string()))
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError::Delivery`] when lock acquisition
    /// fails.
    pub fn events(&self) -> NotificationSinkResult<Vec<MonitorEvent>> {
        let events = self.events.read().map_err(lock_error)?;
        Ok(events.clone())
    }

    /// Returns and clears the recorded events.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError::Delivery`] when lock acquisition
    /// fails.
    pub fn drain(&self) -> NotificationSinkResult<Vec<MonitorEvent>> {
        let mut events = self.events.write().map_err(lock_error)?;
        Ok(std::mem::take(&mut *events))
    }

    /// Makes subsequent deliveries fail until reset.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError::Delivery`] when lock acquisition
    /// fails.
    pub fn set_failing(&self, failing: bool) -> NotificationSinkResult<()> {
        let mut flag = self.failing.write().map_err(lock_error)?;
        *flag = failing;
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, event: &MonitorEvent) -> NotificationSinkResult<()> {
        if *self.failing.read().map_err(lock_error)? {
            return Err(NotificationSinkError::delivery(std::io::Error::other(
                "sink unavailable",
            )));
        }
        let mut events = self.events.write().map_err(lock_error)?;
        events.push(event.clone());
        Ok(())
    }
}
