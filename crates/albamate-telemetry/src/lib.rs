#![forbid(unsafe_code)]

//! Logging initialisation for Albamate binaries.
//!
//! Centralises tracing-subscriber setup (fmt or JSON output, `EnvFilter`
//! from `RUST_LOG` with a configured default) behind a single entry point so
//! every binary logs the same way.

use anyhow::{Result, anyhow};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Default filter directive used when `RUST_LOG` is absent.
    pub default_level: &'a str,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LOG_LEVEL,
            json: false,
        }
    }
}

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the subscriber cannot be installed, for example
/// because another subscriber has already been set globally.
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let filter = env_filter(config.default_level);

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;
    }

    debug!(
        default_level = config.default_level,
        json = config.json,
        "logging initialised"
    );
    Ok(())
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.default_level, "info");
        assert!(!config.json);
    }

    #[test]
    fn filter_accepts_directive_strings() {
        let filter = env_filter("albamate_sync=debug,info");
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn init_installs_once_then_rejects_reinstall() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        let err = init_logging(&config).expect_err("subscriber already installed");
        assert!(err.to_string().contains("tracing subscriber"));
    }
}
