//! quayside - deployment orchestrator for web projects
//!
//! This library turns an unpacked project source tree into a running set of
//! Docker containers. It detects the project's framework from its files,
//! runs the matching build strategy, generates a server configuration for
//! the artifact, and reconciles the containers (app plus optional database
//! and redis sidecars) against the local Docker daemon.
//!
//! # Core Concepts
//!
//! - **Classification**: Scoring passes over the file tree and
//!   `package.json` accumulate per-framework signal; the top scorer decides
//!   the project type
//! - **Build strategies**: One per project type, from `npm run build` plus
//!   output copying for SPAs up to production installs for server-rendered
//!   frameworks
//! - **Reconcile**: The desired container set is declared up front and the
//!   daemon is driven to match it, replacing stale containers by name
//!
//! # Example Usage
//!
//! ```ignore
//! use quayside::{Deployer, DockerEngine, OrchestratorConfig, ServiceRequest};
//! use std::path::Path;
//!
//! async fn deploy_app() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OrchestratorConfig::default();
//!     let deployer = Deployer::new(DockerEngine::connect()?, config);
//!
//!     let deployed = deployer
//!         .deploy(Path::new("./my-app"), "my-app", &ServiceRequest::default())
//!         .await?;
//!     println!("live at {}", deployed.url);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`classify`]: project type detection
//! - [`build`]: per-type build strategies
//! - [`serve`]: server configuration for built artifacts
//! - [`container`]: container specs, engine access, reconcile
//! - [`deploy`]: the end-to-end pipeline and project records

// Public modules
pub mod build;
pub mod classify;
pub mod cli;
pub mod config;
pub mod container;
pub mod deploy;
pub mod serve;
pub mod util;

// Re-export key types for convenient access
pub use build::{BuildError, BuildPlan};
pub use classify::{analyze, classify, determine_project_type, ProjectAnalysis, ProjectType};
pub use config::{ConfigError, OrchestratorConfig};
pub use container::{ContainerEngine, ContainerState, DockerEngine, EngineError};
pub use deploy::{DeployError, DeployedProject, Deployer, ProjectStatus, ServiceRequest};
pub use serve::{ServeMode, ServerConfig};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
