//! Application startup utilities

pub mod http;
pub mod logging;

pub use http::console_server;
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
