use crate::{
    change_event::ChangeEvent,
    envelope::OutboundEnvelope,
    error::{RelayError, Result},
    publisher::Publisher,
    source::{EventSource, EventStream},
};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

/// Memory-backed event source for testing and development.
///
/// Each subscription replays the configured events from the start, honoring
/// the requested bound; the stream ends when the events run out, which models
/// the upstream connection closing.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    events: Arc<RwLock<Vec<ChangeEvent>>>,
}

impl MemorySource {
    pub fn new(events: Vec<ChangeEvent>) -> Self {
        Self {
            events: Arc::new(RwLock::new(events)),
        }
    }

    pub fn push(&self, event: ChangeEvent) {
        self.events.write().unwrap().push(event);
    }
}

#[async_trait]
impl EventSource for MemorySource {
    async fn subscribe(&self, _channel: &str, max_events: u32) -> Result<EventStream> {
        let events: Vec<ChangeEvent> = self
            .events
            .read()
            .unwrap()
            .iter()
            .take(max_events as usize)
            .cloned()
            .collect();
        Ok(stream::iter(events).boxed())
    }
}

/// Memory-backed publisher that records every envelope it accepts.
///
/// Calls can be made to fail by 1-based call number, so "reject event 2 of 3"
/// reads literally in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryPublisher {
    published: Arc<RwLock<Vec<OutboundEnvelope>>>,
    fail_on_calls: HashSet<usize>,
    calls: Arc<Mutex<usize>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_on(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.fail_on_calls = calls.into_iter().collect();
        self
    }

    /// Envelopes accepted so far, in publish order.
    pub fn published(&self) -> Vec<OutboundEnvelope> {
        self.published.read().unwrap().clone()
    }

    /// Number of publish calls seen, accepted or rejected.
    pub fn publish_calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, envelopes: Vec<OutboundEnvelope>) -> Result<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };

        if self.fail_on_calls.contains(&call) {
            return Err(RelayError::Publish("simulated network failure".to_string()));
        }

        self.published.write().unwrap().extend(envelopes);
        Ok(())
    }
}
