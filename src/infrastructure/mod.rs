//! Infrastructure layer - External service implementations

pub mod batch;
pub mod cache;
pub mod http_client;
pub mod logging;
pub mod orchestrator;
pub mod vision;
