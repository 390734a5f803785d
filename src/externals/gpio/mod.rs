use tracing::{info, warn};

use crate::{config::GpioConfig, ports::OutputPort};

use self::services::{SimulatedOutputPort, SysfsGpioPort};

pub mod services;

/// Open the fan/actuator outputs. Never fails: when the GPIO hardware
/// cannot be reached the node keeps running on simulated outputs.
pub fn open_output_port(config: &GpioConfig) -> Box<dyn OutputPort> {
    if config.simulate {
        info!("GPIO simulation requested.");
        return Box::new(SimulatedOutputPort::new());
    }

    match SysfsGpioPort::open(&config.sysfs_root, config.fan_pin, config.actuator_pin) {
        Ok(port) => {
            info!(
                "GPIO ready. fan=gpio{} actuator=gpio{}",
                config.fan_pin, config.actuator_pin
            );
            Box::new(port)
        }
        Err(e) => {
            warn!("GPIO not available, outputs are simulated. Error: {}", e);
            Box::new(SimulatedOutputPort::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_falls_back_to_simulation() {
        let config = GpioConfig {
            sysfs_root: PathBuf::from("/definitely/not/sysfs"),
            ..Default::default()
        };
        assert_eq!(open_output_port(&config).backend(), "simulated");
    }

    #[test]
    fn test_simulation_on_request() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("export"), "").unwrap();
        let config = GpioConfig {
            sysfs_root: dir.path().to_path_buf(),
            simulate: true,
            ..Default::default()
        };
        assert_eq!(open_output_port(&config).backend(), "simulated");
    }

    #[test]
    fn test_uses_sysfs_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("export"), "").unwrap();
        std::fs::create_dir(dir.path().join("gpio18")).unwrap();
        std::fs::create_dir(dir.path().join("gpio22")).unwrap();
        let config = GpioConfig {
            sysfs_root: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(open_output_port(&config).backend(), "sysfs gpio");
    }
}
