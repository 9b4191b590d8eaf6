use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVariable(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Relay settings supplied by the surrounding process.
///
/// Connection and credential handling for the two capabilities stays outside
/// the core; this only covers what the relay itself needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Channel path to subscribe to, e.g. `/data/OmniSync_Channel__chn`.
    pub channel_name: String,
    /// How many events the session delivers before auto-closing.
    pub requested_events: u32,
    /// Static origin identifier stamped on every outbound envelope.
    pub source_name: String,
}

impl RelayConfig {
    pub fn new(channel_name: impl Into<String>, requested_events: u32, source_name: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            requested_events,
            source_name: source_name.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        use std::env;

        let channel_name =
            env::var("RELAY_CHANNEL").map_err(|_| ConfigError::MissingVariable("RELAY_CHANNEL".to_string()))?;
        let requested_events = env::var("RELAY_REQUESTED_EVENTS")
            .map_err(|_| ConfigError::MissingVariable("RELAY_REQUESTED_EVENTS".to_string()))?
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidConfiguration(format!("RELAY_REQUESTED_EVENTS: {e}")))?;
        let source_name = env::var("RELAY_SOURCE").unwrap_or_else(|_| "cdc-relay".to_string());

        let config = Self {
            channel_name,
            requested_events,
            source_name,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_name.is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "channel name cannot be empty".to_string(),
            ));
        }
        if self.requested_events == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "requested event count must be positive".to_string(),
            ));
        }
        if self.source_name.is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "source name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
