//! Notification sink implementations.

mod channel;
mod recording;
mod tracing_sink;

pub use channel::ChannelSink;
pub use recording::RecordingSink;
pub use tracing_sink::TracingSink;
