use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{
    controls::ThermalController,
    externals::{
        csv_export::services::CsvExporter,
        field_sensors::services::FieldSensorService,
        host_sensors::services::{read_cpu_temperature, HostCpuTemperatureService},
        telemetry::services::TelemetryPublisher,
    },
    models::{indices::compute_indices, sensor_data::SampleRecord, temperature::Temperature},
};

/// Where each finished sample goes. Either sink may be switched off.
#[derive(Default)]
pub struct SampleSinks {
    pub csv: Option<CsvExporter>,
    pub telemetry: Option<TelemetryPublisher>,
}

/// Task: Sample every sensor once per `interval`, drive the thermal
/// controller, then export and publish the merged record.
/// Can be cancelled; the field sensors are cleaned up on the way out.
#[tracing::instrument(skip_all)]
pub async fn task_acquisition(
    token: CancellationToken,
    interval: Duration,
    mut field_sensors: impl FieldSensorService,
    host_sensors: impl HostCpuTemperatureService,
    controller: ThermalController,
    sinks: SampleSinks,
) {
    info!("Started. Sampling every {:?}.", interval);
    loop {
        business_logic(&mut field_sensors, &host_sensors, &controller, &sinks).await;

        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            _ = tokio::time::sleep(interval) => {}
        };
    }
    field_sensors.cleanup();
}

/// Perform one acquisition cycle. The enclosure reading is evaluated before
/// the cpu reading; see `ThermalController::evaluate_cycle`.
#[tracing::instrument(skip_all)]
async fn business_logic(
    field_sensors: &mut impl FieldSensorService,
    host_sensors: &impl HostCpuTemperatureService,
    controller: &ThermalController,
    sinks: &SampleSinks,
) -> SampleRecord {
    trace!("Executing business logic.");
    let field = field_sensors.read_all();
    let cpu_temperature = read_cpu_temperature(host_sensors).map(|t| t.value);
    let indices = compute_indices(
        field.weather.as_ref(),
        field.soil.as_ref(),
        field.spectral.as_ref(),
    );

    // An implausible enclosure value is as good as no value.
    let enclosure_temperature = field
        .enclosure_temperature()
        .and_then(|t| Temperature::try_from(t).ok())
        .map(|t| t.value);
    let (enclosure, cpu) = controller.evaluate_cycle(enclosure_temperature, cpu_temperature);
    debug!(
        "Evaluated enclosure={:?} -> {:?}, cpu={:?} -> {:?}",
        enclosure_temperature, enclosure, cpu_temperature, cpu
    );

    let record = SampleRecord {
        timestamp: Utc::now(),
        field,
        cpu_temperature,
        indices,
    };

    if let Some(csv) = &sinks.csv {
        if let Err(e) = csv.export(&record) {
            error!("Failed to export sample. Error: {}", e);
        }
    }
    if let Some(telemetry) = &sinks.telemetry {
        if let Err(e) = telemetry.publish(&record).await {
            error!("Failed to publish sample. Error: {}", e);
        }
    }

    record
}
