pub mod config;
pub mod controls;
pub mod externals;
pub mod models;
pub mod ports;
pub mod tasks;
