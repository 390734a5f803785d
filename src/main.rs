use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use enclosure_vent_control::{
    config::Config,
    controls::ThermalController,
    externals::{
        csv_export::services::CsvExporter,
        event_logging::task::task_control_event_logging,
        field_sensors::services::SimulatedFieldSensors,
        gpio::open_output_port,
        host_sensors::services::HostCpuTemperatureServiceActual,
        telemetry::services::TelemetryPublisher,
    },
    tasks::acquisition::{task_acquisition, SampleSinks},
};
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{info, warn};

/// Enclosure monitoring node: samples the field sensors and keeps the
/// enclosure cool with a fan and a motorised vent.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Never touch GPIO, even if it is available.
    #[arg(long)]
    simulate_gpio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    config.gpio.simulate |= args.simulate_gpio;

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_max_level(config.log_filter()?)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("Starting node v{}.", env!("CARGO_PKG_VERSION"));

    let outputs = open_output_port(&config.gpio);
    let controller = ThermalController::new(config.controller_settings()?, outputs)?;

    let telemetry = if config.telemetry.enabled {
        match TelemetryPublisher::new(&config.telemetry) {
            Ok(publisher) => Some(publisher),
            Err(e) => {
                warn!("Telemetry disabled. Error: {}", e);
                None
            }
        }
    } else {
        None
    };
    let sinks = SampleSinks {
        csv: Some(CsvExporter::new(&config.export.csv_path)),
        telemetry,
    };

    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    let token_clone = token.clone();
    let rx_state_changes = controller.subscribe();
    tracker.spawn(async move { task_control_event_logging(token_clone, rx_state_changes).await });

    let token_clone = token.clone();
    let controller_clone = controller.clone();
    let interval = config.sample_interval();
    tracker.spawn(async move {
        task_acquisition(
            token_clone,
            interval,
            SimulatedFieldSensors::new(),
            HostCpuTemperatureServiceActual,
            controller_clone,
            sinks,
        )
        .await
    });

    let token_clone = token.clone();

    tokio::select! {
        _ = token_clone.cancelled() => {}
        res = signal::ctrl_c() => {
            match res {
                Ok(_) => {
                    info!("Stopped by user.");
                    token.cancel();
                },
                Err(e) => {
                    tracing::error!("Failed to listen for ctrl_c. Error: {}", e);
                    token.cancel();
                }
            };
        },
    }

    tracker.close();
    tracker.wait().await;

    controller.shutdown();
    let state = controller.snapshot();
    info!(
        "Outputs released. fan_on={} actuator_engaged={}",
        state.fan_on, state.actuator_engaged
    );

    Ok(())
}
