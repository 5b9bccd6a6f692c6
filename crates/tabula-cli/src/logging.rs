//! Logging setup for the `tabula` command
//!
//! Console output goes to stderr so table output on stdout stays clean.
//! An optional JSON log file is written through a non-blocking appender.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter, overridden by `RUST_LOG`
    pub default_filter: String,

    /// Emit console logs as JSON instead of the human format
    pub json_console: bool,

    /// Also write JSON logs into this directory
    pub log_dir: Option<PathBuf>,

    /// Whether to include file/line information in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn".to_string(),
            json_console: false,
            log_dir: None,
            include_location: cfg!(debug_assertions),
        }
    }
}

impl LoggingConfig {
    /// Filter directive for a bare level name, scoped to the tabula crates
    pub fn for_level(level: &str) -> Self {
        Self {
            default_filter: format!(
                "warn,tabula={level},tabula_core={level},tabula_engine={level},tabula_store={level}"
            ),
            ..Self::default()
        }
    }
}

/// Default directory for log files
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tabula")
        .join("logs")
}

/// Install the global subscriber
///
/// The returned guards flush buffered log lines when dropped, so keep them
/// alive until the process exits.
pub fn init(config: LoggingConfig) -> anyhow::Result<Vec<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let mut guards = Vec::new();
    let mut layers = Vec::new();

    let (stderr, guard) = tracing_appender::non_blocking(std::io::stderr());
    guards.push(guard);
    let console_layer = if config.json_console {
        fmt::layer()
            .with_writer(stderr)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(env_filter.clone())
            .boxed()
    } else {
        fmt::layer()
            .with_writer(stderr)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .compact()
            .with_filter(env_filter.clone())
            .boxed()
    };
    layers.push(console_layer);

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;
        let file_appender = tracing_appender::rolling::daily(log_dir, "tabula.log");
        let (file, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);
        layers.push(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(env_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        filter = %config.default_filter,
        json_console = config.json_console,
        log_dir = ?config.log_dir,
        "Logging initialized"
    );
    Ok(guards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_scopes_tabula_crates() {
        let config = LoggingConfig::for_level("debug");
        assert!(config.default_filter.starts_with("warn,"));
        assert!(config.default_filter.contains("tabula_store=debug"));
        assert!(EnvFilter::try_new(&config.default_filter).is_ok());
    }

    #[test]
    fn test_log_directory_is_namespaced() {
        assert!(log_directory().ends_with("tabula/logs"));
    }
}
