use derive_more::Display;
use std::io;
use thiserror::Error;

/// The two logical control lines owned by the thermal controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum OutputLine {
    #[display(fmt = "fan")]
    Fan,
    /// Energizes the linear actuator that pulls the vent door closed.
    #[display(fmt = "vent actuator")]
    VentActuator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Level {
    #[display(fmt = "high")]
    High,
    #[display(fmt = "low")]
    Low,
}

#[derive(Error, Debug)]
pub enum OutputPortError {
    /// The backend could not be brought up at all.
    #[error("Output backend unavailable: {0}")]
    Unavailable(String),

    /// A single write to a line failed.
    #[error("Failed to drive {line} {level}.")]
    WriteFailed {
        line: OutputLine,
        level: Level,
        #[source]
        source: io::Error,
    },
}

/// Something that can drive a logical binary output line.
/// Physical and simulated backends must behave identically apart from the
/// side effect, so the controller never needs to know which one it holds.
pub trait OutputPort: Send {
    fn set_level(&mut self, line: OutputLine, level: Level) -> Result<(), OutputPortError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

impl<T: OutputPort + ?Sized> OutputPort for Box<T> {
    fn set_level(&mut self, line: OutputLine, level: Level) -> Result<(), OutputPortError> {
        (**self).set_level(line, level)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
