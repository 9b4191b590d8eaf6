use crate::{
    change_event::ChangeEvent,
    encode::encode_event,
    envelope::{canonical_event_type, EnvelopeData, OutboundEnvelope},
    error::Result,
    event_id::{IdGenerator, UlidGenerator},
    publisher::Publisher,
    subscription::{Signal, SignalHandler, SignalOutcome, SubscriptionState},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Counters collected while relaying. Purely observational; nothing reads
/// them to make control decisions, so a burst of failures can never block
/// further processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayMetrics {
    pub forwarded_events: usize,
    pub failed_events: usize,
    pub event_type_counts: HashMap<String, usize>,
}

/// Transforms received change events into outbound envelopes and publishes
/// them, one per `event` signal.
///
/// Forwarding failures are recovered here: logged with enough context (entity
/// name, replay position) for manual replay from the channel's retained event
/// log, counted, and reported as a [`SignalOutcome::Failed`] value. They never
/// propagate into the subscription's control loop.
#[derive(Debug, Clone)]
pub struct Forwarder<P, G = UlidGenerator> {
    publisher: P,
    ids: G,
    source_name: String,
    metrics: Arc<Mutex<RelayMetrics>>,
}

impl<P> Forwarder<P>
where
    P: Publisher,
{
    pub fn new(publisher: P, source_name: impl Into<String>) -> Self {
        Self::with_id_generator(publisher, source_name, UlidGenerator)
    }
}

impl<P, G> Forwarder<P, G>
where
    P: Publisher,
    G: IdGenerator,
{
    pub fn with_id_generator(publisher: P, source_name: impl Into<String>, ids: G) -> Self {
        Self {
            publisher,
            ids,
            source_name: source_name.into(),
            metrics: Arc::new(Mutex::new(RelayMetrics::default())),
        }
    }

    /// Builds the envelope for one event: fresh id, canonical type, the entity
    /// name as subject, and the precision-safe rendering of the whole event as
    /// the message body.
    pub fn to_envelope(&self, event: &ChangeEvent) -> OutboundEnvelope {
        let entity_name = event.entity_name().unwrap_or_default();
        let change_type = event.change_type().unwrap_or_default();

        OutboundEnvelope {
            id: self.ids.next_id(),
            event_type: canonical_event_type(entity_name, change_type),
            subject: entity_name.to_string(),
            source: self.source_name.clone(),
            time: Utc::now(),
            data: EnvelopeData {
                message: encode_event(event),
            },
        }
    }

    /// Transforms and publishes one event.
    pub async fn forward(&self, event: &ChangeEvent) -> Result<()> {
        let envelope = self.to_envelope(event);
        let event_type = envelope.event_type.clone();
        self.publisher.publish(vec![envelope]).await?;

        let mut metrics = self.metrics.lock().unwrap();
        metrics.forwarded_events += 1;
        *metrics.event_type_counts.entry(event_type).or_insert(0) += 1;
        Ok(())
    }

    /// Snapshot of the counters collected so far.
    pub fn metrics(&self) -> RelayMetrics {
        self.metrics.lock().unwrap().clone()
    }
}

#[async_trait]
impl<P, G> SignalHandler for Forwarder<P, G>
where
    P: Publisher,
    G: IdGenerator,
{
    async fn on_signal(&self, subscription: &SubscriptionState, signal: Signal) -> SignalOutcome {
        match signal {
            Signal::Event(event) => {
                info!(
                    "{} - Handling {} {} event with replay ID {} ({}/{} events received so far)",
                    subscription.channel_name,
                    event.entity_name().unwrap_or("<unknown>"),
                    event.change_type().unwrap_or("<unknown>"),
                    event.replay_id,
                    subscription.received_event_count,
                    subscription.requested_event_count
                );

                match self.forward(&event).await {
                    Ok(()) => SignalOutcome::Handled,
                    Err(err) => {
                        error!(
                            "{} - Failed to forward {} event with replay ID {}: {err}",
                            subscription.channel_name,
                            event.entity_name().unwrap_or("<unknown>"),
                            event.replay_id
                        );
                        self.metrics.lock().unwrap().failed_events += 1;
                        SignalOutcome::Failed(err.to_string())
                    }
                }
            }
            Signal::LastEvent => {
                info!(
                    "{} - Reached last of {} requested events on channel, closing connection",
                    subscription.channel_name, subscription.requested_event_count
                );
                SignalOutcome::Handled
            }
            Signal::End => {
                info!("{} - Upstream stream ended", subscription.channel_name);
                SignalOutcome::Handled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RelayError,
        event_id::EventId,
        mem::{MemoryPublisher, MemorySource},
        subscription::Subscription,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};
    use ulid::Ulid;

    fn account_event(replay_id: i64, change_type: &str) -> ChangeEvent {
        ChangeEvent::new(
            replay_id,
            json!({
                "ChangeEventHeader": {
                    "entityName": "Account",
                    "changeType": change_type
                }
            }),
        )
    }

    /// Deterministic id generator so tests can pin envelope ids.
    struct SequentialIds(AtomicU64);

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> EventId {
            let n = self.0.fetch_add(1, Ordering::Relaxed);
            EventId::from_ulid(Ulid::from_parts(0, n as u128))
        }
    }

    #[test]
    fn test_to_envelope_shape() {
        let publisher = MemoryPublisher::new();
        let forwarder = Forwarder::new(publisher, "crm-cdc");
        let event = account_event(7, "update");

        let envelope = forwarder.to_envelope(&event);

        assert_eq!(envelope.event_type, "AccountUpdate");
        assert_eq!(envelope.subject, "Account");
        assert_eq!(envelope.source, "crm-cdc");

        let message: serde_json::Value = serde_json::from_str(&envelope.data.message).unwrap();
        assert_eq!(message["replayId"], json!(7));
        assert_eq!(message["payload"]["ChangeEventHeader"]["entityName"], json!("Account"));
    }

    #[test]
    fn test_to_envelope_without_header() {
        let publisher = MemoryPublisher::new();
        let forwarder = Forwarder::new(publisher, "crm-cdc");
        let event = ChangeEvent::new(9, json!({"Name": "headerless"}));

        let envelope = forwarder.to_envelope(&event);

        assert_eq!(envelope.event_type, "Change");
        assert_eq!(envelope.subject, "");
    }

    #[test]
    fn test_injected_id_generator() {
        let publisher = MemoryPublisher::new();
        let forwarder = Forwarder::with_id_generator(publisher, "crm-cdc", SequentialIds(AtomicU64::new(1)));

        let first = forwarder.to_envelope(&account_event(1, "create"));
        let second = forwarder.to_envelope(&account_event(2, "create"));

        assert_ne!(first.id, second.id);
        assert_eq!(first.id, EventId::from_ulid(Ulid::from_parts(0, 1)));
        assert_eq!(second.id, EventId::from_ulid(Ulid::from_parts(0, 2)));
    }

    #[tokio::test]
    async fn test_forward_publishes_and_counts() {
        let publisher = MemoryPublisher::new();
        let forwarder = Forwarder::new(publisher.clone(), "crm-cdc");

        forwarder.forward(&account_event(1, "create")).await.unwrap();
        forwarder.forward(&account_event(2, "delete")).await.unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].event_type, "AccountCreate");
        assert_eq!(published[1].event_type, "AccountDelete");

        let metrics = forwarder.metrics();
        assert_eq!(metrics.forwarded_events, 2);
        assert_eq!(metrics.failed_events, 0);
        assert_eq!(metrics.event_type_counts.get("AccountCreate"), Some(&1));
        assert_eq!(metrics.event_type_counts.get("AccountDelete"), Some(&1));
    }

    #[tokio::test]
    async fn test_publish_failure_is_recovered_as_outcome() {
        let publisher = MemoryPublisher::new().failing_on([1]);
        let forwarder = Forwarder::new(publisher.clone(), "crm-cdc");
        let state = SubscriptionState::new("/data/TestChannel", 1);

        let outcome = forwarder
            .on_signal(&state, Signal::Event(account_event(1, "update")))
            .await;

        assert!(matches!(outcome, SignalOutcome::Failed(_)));
        assert!(publisher.published().is_empty());

        let metrics = forwarder.metrics();
        assert_eq!(metrics.forwarded_events, 0);
        assert_eq!(metrics.failed_events, 1);
    }

    #[tokio::test]
    async fn test_lifecycle_signals_are_handled() {
        let publisher = MemoryPublisher::new();
        let forwarder = Forwarder::new(publisher, "crm-cdc");
        let state = SubscriptionState::new("/data/TestChannel", 3);

        assert_eq!(forwarder.on_signal(&state, Signal::LastEvent).await, SignalOutcome::Handled);
        assert_eq!(forwarder.on_signal(&state, Signal::End).await, SignalOutcome::Handled);
    }

    #[tokio::test]
    async fn test_forward_failure_does_not_block_next_event() {
        let source = MemorySource::new(vec![
            account_event(1, "create"),
            account_event(2, "update"),
            account_event(3, "delete"),
        ]);
        let publisher = MemoryPublisher::new().failing_on([2]);
        let forwarder = Forwarder::new(publisher.clone(), "crm-cdc");

        let state = Subscription::new(source)
            .run("/data/TestChannel", 3, &forwarder)
            .await
            .unwrap();

        assert_eq!(state.received_event_count, 3);
        let published = publisher.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].event_type, "AccountCreate");
        assert_eq!(published[1].event_type, "AccountDelete");

        let metrics = forwarder.metrics();
        assert_eq!(metrics.forwarded_events, 2);
        assert_eq!(metrics.failed_events, 1);
    }

    #[test]
    fn test_publish_error_message() {
        let err = RelayError::Publish("simulated network failure".to_string());
        assert_eq!(err.to_string(), "publish failed: simulated network failure");
    }
}
