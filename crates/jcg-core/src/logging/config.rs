use std::path::PathBuf;

use crate::logging::formatter::LogFormat;
use crate::logging::{LOG_FILE_ENV, LOG_FORMAT_ENV};

/// Configuration for the logging subscriber
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Path to log file (None = no file logging)
    pub file: Option<PathBuf>,
    /// Log to console (true) or only to file (false)
    pub console: bool,
    /// Log format (text or json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            file: std::env::var(LOG_FILE_ENV).ok().map(PathBuf::from),
            console: true,
            format: std::env::var(LOG_FORMAT_ENV)
                .map(|name| LogFormat::from_env_name(&name))
                .unwrap_or_default(),
        }
    }
}

impl LoggingConfig {
    pub fn new(level: String, file: Option<PathBuf>, console: bool, format: LogFormat) -> Self {
        Self {
            level,
            file,
            console,
            format,
        }
    }
}
