//! Default values for optional configuration sections

use crate::{LoggingConfig, ServerConfig};

pub fn default_enabled() -> bool {
    true
}

pub fn default_server() -> ServerConfig {
    ServerConfig {
        host: "0.0.0.0".to_string(),
        port: 9010,
    }
}

pub fn default_logging() -> LoggingConfig {
    LoggingConfig {
        format: "pretty".to_string(),
    }
}
