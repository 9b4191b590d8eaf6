use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use ulid::Ulid;

#[derive(Debug, Error, Clone)]
pub enum EventIdError {
    #[error("event id is empty")]
    Empty,
    #[error("event id is invalid")]
    Invalid,
}

/// Unique identifier for one outbound envelope.
///
/// Generated fresh per event. Replay positions are only unique within a single
/// channel's stream and can recur across retried subscriptions, so they are
/// never used as the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(Ulid);

impl EventId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn into_inner(&self) -> Ulid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = EventIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(EventIdError::Empty);
        }
        let ulid = Ulid::from_string(s).map_err(|_| EventIdError::Invalid)?;
        Ok(Self(ulid))
    }
}

impl Serialize for EventId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Source of fresh envelope identifiers, injectable so tests can pin ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> EventId;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UlidGenerator;

impl IdGenerator for UlidGenerator {
    fn next_id(&self) -> EventId {
        EventId::new()
    }
}
