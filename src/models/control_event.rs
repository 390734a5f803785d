use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;
use std::fmt;

/// Which temperature reading drove a fan transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureSource {
    #[display(fmt = "enclosure")]
    Enclosure,
    #[display(fmt = "cpu")]
    Cpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FanState {
    #[display(fmt = "on")]
    On,
    #[display(fmt = "off")]
    Off,
}

/// Emitted by the controller on every actual fan transition.
/// Observation only, nothing consumes it as a control input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateChangeEvent {
    pub source: TemperatureSource,
    pub new_state: FanState,
    pub timestamp: DateTime<Utc>,
}

impl StateChangeEvent {
    pub fn now(source: TemperatureSource, new_state: FanState) -> Self {
        Self {
            source,
            new_state,
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for StateChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<State Change | source:{}, fan:{}, at:{}>",
            self.source,
            self.new_state,
            self.timestamp.to_rfc3339()
        )
    }
}
