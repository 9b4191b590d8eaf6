//! Relays change-data-capture events from a pub/sub channel to an event
//! ingestion service.
//!
//! A [`Subscription`] drives a bounded session against an [`EventSource`] and
//! dispatches lifecycle [`Signal`]s to a handler; the [`Forwarder`] handles
//! each event by rendering it precision-safely, wrapping it in an
//! [`OutboundEnvelope`], and invoking a [`Publisher`]. Forwarding is
//! at-least-once and best-effort: a rejected publish is logged and counted,
//! never retried, and never tears down the subscription.
//!
//! Both capabilities arrive as already-connected handles; connection and
//! authentication are the caller's concern.

pub mod change_event;
pub mod config;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod event_id;
pub mod forwarder;
pub mod mem;
pub mod publisher;
pub mod source;
pub mod subscription;

pub use change_event::{ChangeEvent, ChangeType};
pub use config::{ConfigError, RelayConfig};
pub use encode::encode_event;
pub use envelope::{canonical_event_type, EnvelopeData, OutboundEnvelope};
pub use error::{RelayError, Result};
pub use event_id::{EventId, IdGenerator, UlidGenerator};
pub use forwarder::{Forwarder, RelayMetrics};
pub use mem::{MemoryPublisher, MemorySource};
pub use publisher::Publisher;
pub use source::{EventSource, EventStream};
pub use subscription::{Signal, SignalHandler, SignalOutcome, Subscription, SubscriptionState};
