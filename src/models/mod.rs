pub mod control_event;
pub mod indices;
pub mod sensor_data;
pub mod temperature;
