// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod http_response;
pub mod influx_repository;
pub mod logging;
pub mod memory_repository;
