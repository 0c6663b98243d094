//! Sink that writes events to the tracing subscriber.

use crate::monitor::{
    domain::MonitorEvent,
    ports::{NotificationSink, NotificationSinkResult},
};
use async_trait::async_trait;
use tracing::{info, warn};

/// Logs each event at `info`, or `warn` for inactivity warnings.
///
/// Used by the binary when no interactive front end is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn notify(&self, event: &MonitorEvent) -> NotificationSinkResult<()> {
        let summary = event.summary();
        match event {
            MonitorEvent::InactiveWarning { .. } => {
                warn!(target: "branchwarden::notify", event = event.name(), "{summary}");
            }
            _ => info!(target: "branchwarden::notify", event = event.name(), "{summary}"),
        }
        Ok(())
    }
}
