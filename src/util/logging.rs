//! Structured logging setup built on the `tracing` ecosystem.
//!
//! Console output by default, JSON for production, `RUST_LOG` overrides,
//! and a `Once` guard so repeated initialization is harmless.

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Configuration for logging initialization.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display.
    pub level: Level,
    /// Use JSON output format for structured logging in production.
    pub use_json: bool,
    /// Include the module target (e.g. `quayside::deploy`) in logs.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
        }
    }
}

/// Initialize logging with the given configuration.
///
/// Only the first call takes effect; later calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter = filter
                .add_directive(format!("quayside={}", config.level).parse().unwrap())
                .add_directive("bollard=warn".parse().unwrap())
                .add_directive("hyper=warn".parse().unwrap());
        }

        let registry = tracing_subscriber::registry().with(filter);
        if config.use_json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

/// Initialize with defaults (INFO, console format).
pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initialize from `QUAYSIDE_LOG_LEVEL` / `QUAYSIDE_LOG_FORMAT` environment
/// variables, falling back to defaults.
pub fn init_from_env() {
    let level = env::var("QUAYSIDE_LOG_LEVEL")
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(Level::INFO);
    let use_json = env::var("QUAYSIDE_LOG_FORMAT")
        .map(|s| s.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    init_logging(LoggingConfig {
        level,
        use_json,
        include_target: true,
    });
}

pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}
