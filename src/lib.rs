// Race telemetry service - layered library behind the HTTP binary
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
