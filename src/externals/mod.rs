pub mod csv_export;
pub mod event_logging;
pub mod field_sensors;
pub mod gpio;
pub mod host_sensors;
pub mod telemetry;
