// Domain layer - Telemetry model and pure aggregation logic
pub mod aggregate;
pub mod car;
pub mod comparison;
pub mod dashboard;
pub mod insights;
pub mod report;
pub mod scoring;
pub mod telemetry;
