use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::ports::{Level, OutputLine, OutputPort, OutputPortError};

/// Drives the lines through the Linux sysfs GPIO interface
/// (`<root>/export`, `<root>/gpioN/direction`, `<root>/gpioN/value`).
#[derive(Debug)]
pub struct SysfsGpioPort {
    root: PathBuf,
    fan_pin: u32,
    actuator_pin: u32,
}

impl SysfsGpioPort {
    /// Export both pins and configure them as outputs starting low.
    pub fn open(
        root: impl Into<PathBuf>,
        fan_pin: u32,
        actuator_pin: u32,
    ) -> Result<Self, OutputPortError> {
        let root = root.into();
        if !root.join("export").exists() {
            return Err(OutputPortError::Unavailable(format!(
                "no gpio export file under {}",
                root.display()
            )));
        }

        for pin in [fan_pin, actuator_pin] {
            configure_output(&root, pin).map_err(|e| {
                OutputPortError::Unavailable(format!("failed to configure gpio{}: {}", pin, e))
            })?;
            debug!("Configured gpio{} as output.", pin);
        }

        Ok(Self {
            root,
            fan_pin,
            actuator_pin,
        })
    }

    fn pin(&self, line: OutputLine) -> u32 {
        match line {
            OutputLine::Fan => self.fan_pin,
            OutputLine::VentActuator => self.actuator_pin,
        }
    }
}

fn pin_dir(root: &Path, pin: u32) -> PathBuf {
    root.join(format!("gpio{}", pin))
}

fn configure_output(root: &Path, pin: u32) -> io::Result<()> {
    if !pin_dir(root, pin).exists() {
        fs::write(root.join("export"), pin.to_string())?;
    }
    // "low" sets the direction to output with an initial low level in one write.
    fs::write(pin_dir(root, pin).join("direction"), "low")
}

impl OutputPort for SysfsGpioPort {
    fn set_level(&mut self, line: OutputLine, level: Level) -> Result<(), OutputPortError> {
        let value = match level {
            Level::High => "1",
            Level::Low => "0",
        };
        let pin = self.pin(line);
        fs::write(pin_dir(&self.root, pin).join("value"), value)
            .map_err(|source| OutputPortError::WriteFailed {
                line,
                level,
                source,
            })?;
        trace!("gpio{} <- {}", pin, value);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sysfs gpio"
    }
}

/// Stand-in used when no GPIO hardware is reachable. Remembers the last
/// level of each line so the rest of the node behaves the same.
#[derive(Debug, Default)]
pub struct SimulatedOutputPort {
    levels: HashMap<OutputLine, Level>,
}

impl SimulatedOutputPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, line: OutputLine) -> Option<Level> {
        self.levels.get(&line).copied()
    }
}

impl OutputPort for SimulatedOutputPort {
    fn set_level(&mut self, line: OutputLine, level: Level) -> Result<(), OutputPortError> {
        debug!("[SIMULATED] {} -> {}", line, level);
        self.levels.insert(line, level);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_sysfs(pins: &[u32]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("export"), "").unwrap();
        for pin in pins {
            fs::create_dir(dir.path().join(format!("gpio{}", pin))).unwrap();
        }
        dir
    }

    fn read(dir: &tempfile::TempDir, pin: u32, file: &str) -> String {
        fs::read_to_string(dir.path().join(format!("gpio{}", pin)).join(file)).unwrap()
    }

    #[test]
    fn test_open_configures_pins_low() {
        let dir = fake_sysfs(&[18, 22]);
        let port = SysfsGpioPort::open(dir.path(), 18, 22).expect("Failed to open port");

        assert_eq!(read(&dir, 18, "direction"), "low");
        assert_eq!(read(&dir, 22, "direction"), "low");
        assert_eq!(port.backend(), "sysfs gpio");
    }

    #[test]
    fn test_set_level_writes_value_file() {
        let dir = fake_sysfs(&[18, 22]);
        let mut port = SysfsGpioPort::open(dir.path(), 18, 22).unwrap();

        port.set_level(OutputLine::Fan, Level::High).unwrap();
        port.set_level(OutputLine::VentActuator, Level::Low).unwrap();

        assert_eq!(read(&dir, 18, "value"), "1");
        assert_eq!(read(&dir, 22, "value"), "0");
    }

    #[test]
    fn test_missing_sysfs_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = SysfsGpioPort::open(dir.path().join("nope"), 18, 22);
        assert!(matches!(result, Err(OutputPortError::Unavailable(_))));
    }

    #[test]
    fn test_unexported_pin_is_requested() {
        let dir = fake_sysfs(&[22]);
        // Nothing creates gpio18 in a plain directory, so configuring it fails
        // after the export request has been written.
        let result = SysfsGpioPort::open(dir.path(), 18, 22);

        assert!(matches!(result, Err(OutputPortError::Unavailable(_))));
        assert_eq!(fs::read_to_string(dir.path().join("export")).unwrap(), "18");
    }

    #[test]
    fn test_simulated_port_remembers_levels() {
        let mut port = SimulatedOutputPort::new();
        assert_eq!(port.level(OutputLine::Fan), None);

        port.set_level(OutputLine::Fan, Level::High).unwrap();
        port.set_level(OutputLine::Fan, Level::Low).unwrap();
        port.set_level(OutputLine::VentActuator, Level::High).unwrap();

        assert_eq!(port.level(OutputLine::Fan), Some(Level::Low));
        assert_eq!(port.level(OutputLine::VentActuator), Some(Level::High));
    }
}
