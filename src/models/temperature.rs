use std::fmt::Display;

use thiserror::Error;

/// Lowest reading any of the node's probes can report.
pub const MIN_CELSIUS: f32 = -40f32;
/// Highest reading any of the node's probes can report.
pub const MAX_CELSIUS: f32 = 125f32;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature {
    pub value: f32,
}

#[derive(Error, Debug, PartialEq)]
pub enum TemperatureError {
    #[error("Temperature too high")]
    TooHigh,
    #[error("Temperature too low")]
    TooLow,
    #[error("Temperature is not a number")]
    NotFinite,
}

impl TryFrom<f32> for Temperature {
    type Error = TemperatureError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(TemperatureError::NotFinite);
        }
        if value > MAX_CELSIUS {
            return Err(TemperatureError::TooHigh);
        }
        if value < MIN_CELSIUS {
            return Err(TemperatureError::TooLow);
        }
        Ok(Temperature { value })
    }
}

impl Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} degC)", self.value)
    }
}
