use thiserror::Error;

/// A pair of thresholds: switch on at or above `on`, off at or below `off`.
/// Readings strictly between the two never cause a change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisBand {
    on: f32,
    off: f32,
}

#[derive(Error, Debug, PartialEq)]
pub enum HysteresisBandError {
    #[error("On threshold {on} must be above off threshold {off}.")]
    Degenerate { on: f32, off: f32 },
    #[error("Thresholds must be finite numbers.")]
    NotFinite,
}

/// What a band wants done given the current output state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandDecision {
    SwitchOn,
    SwitchOff,
    Hold,
}

impl HysteresisBand {
    pub fn new(on: f32, off: f32) -> Result<Self, HysteresisBandError> {
        if !on.is_finite() || !off.is_finite() {
            return Err(HysteresisBandError::NotFinite);
        }
        if on <= off {
            return Err(HysteresisBandError::Degenerate { on, off });
        }
        Ok(Self { on, off })
    }

    pub fn on(&self) -> f32 {
        self.on
    }

    pub fn off(&self) -> f32 {
        self.off
    }

    pub fn decide(&self, reading: f32, currently_on: bool) -> BandDecision {
        if reading >= self.on && !currently_on {
            BandDecision::SwitchOn
        } else if reading <= self.off && currently_on {
            BandDecision::SwitchOff
        } else {
            BandDecision::Hold
        }
    }
}
