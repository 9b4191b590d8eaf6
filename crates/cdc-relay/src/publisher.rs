use crate::{envelope::OutboundEnvelope, error::Result};
use async_trait::async_trait;

/// Outbound capability: an already-authenticated client for the event
/// ingestion service.
///
/// The publish call is array-shaped because the downstream API accepts
/// batches; the relay currently sends one envelope per call. Delivery is
/// at-least-once from the relay's perspective: a rejected call is logged by
/// the caller and the envelope is not retried.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, envelopes: Vec<OutboundEnvelope>) -> Result<()>;
}
