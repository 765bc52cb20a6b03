// Application layer - Use cases over the telemetry store
pub mod car_service;
pub mod error;
pub mod report_service;
pub mod streaming_service;
pub mod telemetry_repository;
pub mod telemetry_service;
