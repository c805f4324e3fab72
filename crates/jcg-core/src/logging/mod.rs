pub mod config;
pub mod file_writer;
pub mod formatter;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use config::LoggingConfig;
use file_writer::FileWriter;
use formatter::LogFormat;

/// Environment variable naming a log file destination.
pub const LOG_FILE_ENV: &str = "JCG_LOG_FILE";
/// Environment variable selecting text or json log output.
pub const LOG_FORMAT_ENV: &str = "JCG_LOG_FORMAT";

/// Initialize the logging subscriber with the given configuration
pub fn init(config: LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match (config.console, &config.file) {
        (true, Some(log_file)) => {
            Registry::default()
                .with(env_filter)
                .with(console_layer(config.format))
                .with(file_layer(log_file, config.format))
                .init();
        }
        (true, None) => {
            Registry::default()
                .with(env_filter)
                .with(console_layer(config.format))
                .init();
        }
        (false, Some(log_file)) => {
            Registry::default()
                .with(env_filter)
                .with(file_layer(log_file, config.format))
                .init();
        }
        (false, None) => {
            // No output requested; keep the filter installed anyway.
            Registry::default().with(env_filter).init();
        }
    }

    Ok(())
}

/// Initialize logging with default configuration
pub fn init_default() -> Result<()> {
    init(LoggingConfig::default())
}

/// Initialize logging from environment variables and CLI arguments
pub fn init_from_args(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let level = if verbose {
        "debug".to_string()
    } else {
        log_level
            .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
    };

    let file = log_file.or_else(|| std::env::var(LOG_FILE_ENV).ok().map(PathBuf::from));
    let format = std::env::var(LOG_FORMAT_ENV)
        .map(|name| LogFormat::from_env_name(&name))
        .unwrap_or_default();

    init(LoggingConfig {
        level,
        file,
        console: true,
        format,
    })
}

fn console_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false);
    match format {
        LogFormat::Text => layer.with_ansi(true).boxed(),
        LogFormat::Json => layer.with_ansi(false).json().boxed(),
    }
}

fn file_layer<S>(path: &Path, format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let layer = fmt::layer()
        .with_writer(FileWriter::new(path.to_path_buf()))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false)
        .with_timer(fmt::time::ChronoUtc::rfc_3339());
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}
