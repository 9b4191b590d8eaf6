use crate::{
    change_event::ChangeEvent,
    error::{RelayError, Result},
    source::EventSource,
};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{info, warn};

/// Bookkeeping for one bounded listening session.
///
/// `received_event_count` only ever increases and never exceeds
/// `requested_event_count`; once the two are equal the session closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionState {
    pub channel_name: String,
    pub requested_event_count: u32,
    pub received_event_count: u32,
}

impl SubscriptionState {
    pub fn new(channel_name: impl Into<String>, requested_event_count: u32) -> Self {
        Self {
            channel_name: channel_name.into(),
            requested_event_count,
            received_event_count: 0,
        }
    }

    pub fn quota_reached(&self) -> bool {
        self.received_event_count == self.requested_event_count
    }
}

/// Lifecycle signal dispatched to the handler.
///
/// The final event that reaches the quota is still delivered as `Event`;
/// `LastEvent` follows as a separate, payload-less signal. `End` fires exactly
/// once, always last, whether the quota was reached or the upstream dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Event(ChangeEvent),
    LastEvent,
    End,
}

/// Outcome of handling one signal. The control loop only logs failures; it
/// never changes course on them, so one bad event cannot stall the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    Handled,
    Failed(String),
}

#[async_trait]
pub trait SignalHandler: Send + Sync {
    async fn on_signal(&self, subscription: &SubscriptionState, signal: Signal) -> SignalOutcome;
}

/// Drives bounded subscriptions against an [`EventSource`].
///
/// Each session processes events strictly sequentially: the handler's future
/// is awaited before the next event is taken from the stream, which keeps the
/// counters and the log ordering meaningful. Independent sessions on other
/// channels may run in parallel; nothing here is shared between them.
#[derive(Debug, Clone)]
pub struct Subscription<S> {
    source: S,
}

impl<S> Subscription<S>
where
    S: EventSource,
{
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Subscribes to `channel` and dispatches signals until `requested` events
    /// have been delivered or the upstream closes the stream.
    ///
    /// A subscribe failure is fatal and propagated; everything after that is
    /// recovered locally by the handler. Returns the final session state.
    pub async fn run<H>(&self, channel: &str, requested: u32, handler: &H) -> Result<SubscriptionState>
    where
        H: SignalHandler,
    {
        if requested == 0 {
            return Err(RelayError::InvalidData(
                "requested event count must be positive".to_string(),
            ));
        }

        let mut stream = self.source.subscribe(channel, requested).await?;
        let mut state = SubscriptionState::new(channel, requested);
        info!(
            "{} - Subscribed for {} events",
            state.channel_name, state.requested_event_count
        );

        while state.received_event_count < state.requested_event_count {
            let Some(event) = stream.next().await else {
                // Upstream dropped before the quota; reconnection is the
                // caller's policy, not ours.
                warn!(
                    "{} - Upstream closed the stream after {}/{} events",
                    state.channel_name, state.received_event_count, state.requested_event_count
                );
                break;
            };

            state.received_event_count += 1;
            let outcome = handler.on_signal(&state, Signal::Event(event)).await;
            log_failure(&state, "event", &outcome);
        }

        if state.quota_reached() {
            let outcome = handler.on_signal(&state, Signal::LastEvent).await;
            log_failure(&state, "lastEvent", &outcome);
        }

        drop(stream);
        let outcome = handler.on_signal(&state, Signal::End).await;
        log_failure(&state, "end", &outcome);
        info!("{} - Subscription closed", state.channel_name);

        Ok(state)
    }
}

fn log_failure(state: &SubscriptionState, signal: &str, outcome: &SignalOutcome) {
    if let SignalOutcome::Failed(reason) = outcome {
        warn!(
            "{} - Handler reported a failure on '{signal}' after {} events: {reason}",
            state.channel_name, state.received_event_count
        );
    }
}
