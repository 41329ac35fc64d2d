//! Build plan assembly: package manager, runtime hint, and the environment
//! the build subprocesses run with.

use crate::classify::{PackageManager, ProjectAnalysis, ProjectType};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Inputs a build strategy needs beyond the source tree itself.
/// Constructed once per deploy and consumed by a single strategy.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub project_type: ProjectType,
    pub package_manager: PackageManager,
    pub runtime_version: Option<String>,
    pub environment: BTreeMap<String, String>,
}

impl BuildPlan {
    pub fn from_analysis(
        project_type: ProjectType,
        analysis: &ProjectAnalysis,
        project_dir: &Path,
    ) -> Self {
        let plan = Self {
            project_type,
            package_manager: analysis.package_manager,
            runtime_version: analysis.runtime_version_hint.clone(),
            environment: prepare_environment(project_dir, project_type),
        };
        debug!(
            project_type = %plan.project_type,
            package_manager = %plan.package_manager,
            runtime_version = ?plan.runtime_version,
            "build plan prepared"
        );
        plan
    }
}

/// Assemble the build environment: production defaults, `.env` entries from
/// the project, then type-specific variables.
pub fn prepare_environment(
    project_dir: &Path,
    project_type: ProjectType,
) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("NODE_ENV".to_string(), "production".to_string());
    env.insert("CI".to_string(), "true".to_string());

    let env_path = project_dir.join(".env");
    if env_path.exists() {
        match std::fs::read_to_string(&env_path) {
            Ok(content) => {
                for (key, value) in parse_env_file(&content) {
                    env.insert(key, value);
                }
            }
            Err(err) => {
                warn!(path = %env_path.display(), error = %err, "failed to read .env file");
            }
        }
    }

    match project_type {
        ProjectType::React => {
            env.insert("GENERATE_SOURCEMAP".to_string(), "false".to_string());
            env.insert("REACT_APP_ENV".to_string(), "production".to_string());
        }
        ProjectType::Nextjs => {
            env.insert("NEXT_TELEMETRY_DISABLED".to_string(), "1".to_string());
        }
        ProjectType::Vue => {
            env.insert("VUE_APP_ENV".to_string(), "production".to_string());
        }
        _ => {}
    }

    env
}

/// Parse a dotenv-style file: `KEY=VALUE` lines, `#` comments, surrounding
/// single or double quotes stripped from values.
fn parse_env_file(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        if value.is_empty() {
            continue;
        }
        entries.push((key.to_string(), value.to_string()));
    }
    entries
}
