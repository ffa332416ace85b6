pub mod auth;
pub mod config;
pub mod error;
pub mod patients;
pub mod screening;
pub mod telemetry;
