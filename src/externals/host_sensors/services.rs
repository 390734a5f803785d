use std::io;

use crate::models::temperature::{Temperature, TemperatureError};
use systemstat::{Platform, System};
use thiserror::Error;

/// Processor temperature of the board the node runs on. Kept behind a
/// trait so the acquisition cycle can be tested without a thermal zone.
pub trait HostCpuTemperatureService {
    fn get_cpu_temp(&self) -> Result<Temperature, CpuTemperatureServiceError>;
}

pub struct HostCpuTemperatureServiceActual;

#[derive(Error, Debug)]
pub enum CpuTemperatureServiceError {
    /// The thermal zone could not be read.
    #[error("Failed to read cpu temperature.")]
    FailedToRead(#[source] io::Error),

    /// The zone answered with a value outside the plausible range.
    #[error("Failed to parse cpu temperature.")]
    FailedToParse(#[source] TemperatureError),
}

impl HostCpuTemperatureService for HostCpuTemperatureServiceActual {
    /// Use systemstat to read the SoC thermal zone. On the node's Linux
    /// board this is `/sys/class/thermal/thermal_zone0/temp`.
    fn get_cpu_temp(&self) -> Result<Temperature, CpuTemperatureServiceError> {
        let raw = System::new()
            .cpu_temp()
            .map_err(CpuTemperatureServiceError::FailedToRead)?;

        Temperature::try_from(raw).map_err(CpuTemperatureServiceError::FailedToParse)
    }
}

/// Read the cpu temperature for one acquisition cycle. A failed read is a
/// missing sample, not an error for the caller.
pub fn read_cpu_temperature(service: &impl HostCpuTemperatureService) -> Option<Temperature> {
    match service.get_cpu_temp() {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!("Cpu temperature unavailable. Error: {}", e);
            None
        }
    }
}
