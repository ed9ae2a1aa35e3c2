pub mod assessments;
pub mod assistant;
pub mod config;
pub mod error;
pub mod telemetry;
