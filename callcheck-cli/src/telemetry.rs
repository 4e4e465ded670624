//! Tracing subscriber setup for the binary.
//!
//! Library crates only emit `tracing` events; installing a subscriber is the
//! binary's job.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor `CALLCHECK_LOG` is set.
pub const DEFAULT_FILTER: &str = "callcheck=info";

/// Output encoding of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl LogFormat {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "text" | "pretty" => Some(LogFormat::Plain),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: std::env::var("RUST_LOG")
                .or_else(|_| std::env::var("CALLCHECK_LOG"))
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            format: std::env::var("CALLCHECK_LOG_FORMAT")
                .ok()
                .and_then(|s| LogFormat::from_str_opt(&s))
                .unwrap_or_default(),
        }
    }
}

impl TelemetryConfig {
    /// Replace the filter with `debug` for callcheck crates.
    pub fn verbose(mut self) -> Self {
        self.filter = "callcheck=debug".to_string();
        self
    }
}

/// Install the global tracing subscriber. Logs go to stderr so that stdout
/// stays clean for results.
///
/// Call once at startup; a second call fails.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| anyhow!("invalid log filter {:?}: {}", config.filter, e))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Plain => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.map_err(|e| anyhow!("failed to init subscriber: {}", e))?;

    tracing::debug!(filter = %config.filter, format = ?config.format, "telemetry initialized");
    Ok(())
}
