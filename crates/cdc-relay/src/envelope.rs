use crate::{change_event::ChangeType, event_id::EventId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback token used when the wire carried an unrecognized or empty
/// change-type tag. The derived type string stays syntactically valid either way.
pub const FALLBACK_CHANGE_LABEL: &str = "Change";

/// Derives the canonical envelope type string: the entity name followed by the
/// capitalized change-type token, e.g. `AccountUpdate`.
///
/// Pure and total: any casing of a known tag normalizes to the same token, and
/// unknown or empty tags fall back to [`FALLBACK_CHANGE_LABEL`].
pub fn canonical_event_type(entity_name: &str, change_type: &str) -> String {
    let label = ChangeType::parse(change_type)
        .map(ChangeType::label)
        .unwrap_or(FALLBACK_CHANGE_LABEL);
    format!("{entity_name}{label}")
}

/// The transformed representation sent to the ingestion service.
///
/// `type` and `source` are free-form strings interpreted downstream for
/// routing; `data.message` carries the precision-safe JSON rendering of the
/// full change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub subject: String,
    pub source: String,
    pub time: DateTime<Utc>,
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    pub message: String,
}
