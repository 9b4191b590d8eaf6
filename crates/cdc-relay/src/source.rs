use crate::{change_event::ChangeEvent, error::Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Events delivered by one streaming session. The stream ending models the
/// upstream connection closing, expectedly or not.
pub type EventStream = BoxStream<'static, ChangeEvent>;

/// Inbound capability: an already-connected pub/sub client able to open a
/// bounded streaming session against a named channel.
///
/// Connection and authentication are the implementor's concern; the relay
/// receives this as an opaque, pre-authorized handle.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Opens a streaming session delivering at most `max_events` events.
    ///
    /// Failure here is a connection-establishment failure, fatal to the run.
    async fn subscribe(&self, channel: &str, max_events: u32) -> Result<EventStream>;
}
