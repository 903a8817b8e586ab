pub mod config;
pub mod error;
pub mod rental;
pub mod telemetry;
