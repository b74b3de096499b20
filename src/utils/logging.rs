use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::MonitoringConfig;
use crate::error::{ClientError, Result};

static INIT: Once = Once::new();

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include source code locations
    pub source_location: bool,
    /// Output file path (None for stderr)
    pub file_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            timestamps: true,
            source_location: false,
            file_path: None,
        }
    }
}

impl From<&MonitoringConfig> for LogConfig {
    fn from(monitoring: &MonitoringConfig) -> Self {
        Self {
            level: monitoring.log_level.into(),
            ..Default::default()
        }
    }
}

/// Initialize the global subscriber. Only the first call has any effect;
/// `RUST_LOG` directives are layered over the configured level.
pub fn setup_logging(config: LogConfig) -> Result<()> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = setup_logging_internal(config);
    });

    result
}

fn setup_logging_internal(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_writer(std::io::stderr);

    let installed = match config.file_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| {
                    ClientError::configuration("log_file", format!("Failed to open {}: {}", path.display(), e))
                })?;
            let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
            if config.timestamps {
                builder.try_init()
            } else {
                builder.without_time().try_init()
            }
        }
        None if config.timestamps => builder.try_init(),
        None => builder.without_time().try_init(),
    };

    installed.map_err(|e| ClientError::configuration("logging", format!("Failed to set global subscriber: {}", e)))
}
