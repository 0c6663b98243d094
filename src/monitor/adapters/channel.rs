//! Sink that forwards events over a tokio channel.

use crate::monitor::{
    domain::MonitorEvent,
    ports::{NotificationSink, NotificationSinkError, NotificationSinkResult},
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Forwards events to a front end listening on the paired receiver.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<MonitorEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that consumes its events.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MonitorEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn notify(&self, event: &MonitorEvent) -> NotificationSinkResult<()> {
        self.sender
            .send(event.clone())
            .await
            .map_err(|_| NotificationSinkError::Closed)
    }
}
