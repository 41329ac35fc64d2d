//! Configuration for the orchestrator, loaded from environment variables
//! with sensible defaults.
//!
//! # Environment Variables
//!
//! - `QUAYSIDE_DEPLOY_ROOT`: Directory holding built artifacts and project
//!   records - default: "./deployed"
//! - `QUAYSIDE_NETWORK`: Docker bridge network all containers join -
//!   default: "deploy-network"
//! - `QUAYSIDE_PORT_BASE`: First host port tried for app containers -
//!   default: "8000"
//! - `QUAYSIDE_LOG_LEVEL`: Logging level - default: "info"
//! - `QUAYSIDE_LOG_FORMAT`: "json" or "plain" log output - default: "plain"

use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_DEPLOY_ROOT: &str = "./deployed";
const DEFAULT_NETWORK: &str = "deploy-network";
const DEFAULT_PORT_BASE: u16 = 8000;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Orchestrator configuration. `Default::default()` loads from
/// QUAYSIDE_* environment variables, falling back per field.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Directory where deployed artifacts and project records live.
    pub deploy_root: PathBuf,

    /// Bridge network joining every deployed container.
    pub network: String,

    /// Start of the host port scan for app containers.
    pub port_base: u16,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let deploy_root = env::var("QUAYSIDE_DEPLOY_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DEPLOY_ROOT));

        let network =
            env::var("QUAYSIDE_NETWORK").unwrap_or_else(|_| DEFAULT_NETWORK.to_string());

        let port_base = env::var("QUAYSIDE_PORT_BASE")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT_BASE);

        let log_level = env::var("QUAYSIDE_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            deploy_root,
            network,
            port_base,
            log_level,
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Network name must not be empty".to_string(),
            ));
        }
        if self.port_base < 1024 {
            return Err(ConfigError::ValidationFailed(
                "Port base must be at least 1024".to_string(),
            ));
        }
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }
        Ok(())
    }

    /// Directory holding one project's artifact and record.
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.deploy_root.join(project_id)
    }
}
