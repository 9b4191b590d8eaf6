use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One change-data-capture event as delivered by the upstream channel.
///
/// The replay position is a monotonic marker within a single channel's stream,
/// usable to resume consumption from the channel's retained event log. The
/// payload shape is controlled by the upstream service and may nest further
/// 64-bit integer fields (commit sequence numbers and the like).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "replayId")]
    pub replay_id: i64,
    pub payload: Value,
}

impl ChangeEvent {
    pub fn new(replay_id: i64, payload: Value) -> Self {
        Self { replay_id, payload }
    }

    /// Logical record type that changed, from `payload.ChangeEventHeader.entityName`.
    pub fn entity_name(&self) -> Option<&str> {
        self.header_field("entityName")
    }

    /// Raw change-type tag, from `payload.ChangeEventHeader.changeType`.
    /// Casing is whatever the wire carried; see [`ChangeType::parse`].
    pub fn change_type(&self) -> Option<&str> {
        self.header_field("changeType")
    }

    fn header_field(&self, key: &str) -> Option<&str> {
        self.payload.get("ChangeEventHeader")?.get(key)?.as_str()
    }
}

/// Kind of record change a CDC event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Create,
    Update,
    Delete,
    Undelete,
}

impl ChangeType {
    /// Parses a wire tag, case-insensitively. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "UNDELETE" => Some(Self::Undelete),
            _ => None,
        }
    }

    /// Canonical capitalized token, the form used in envelope type strings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Undelete => "Undelete",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
