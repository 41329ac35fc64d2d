//! The deploy pipeline: classify, build, configure serving, reconcile
//! containers, record the result.

pub mod record;

pub use record::{DbRequest, DeployedProject, RedisRequest, ServiceRequest, RECORD_FILENAME};

use crate::build::{self, BuildError};
use crate::classify::{self, ProjectAnalysis, ProjectType};
use crate::config::OrchestratorConfig;
use crate::container::{
    app_spec, db_container_name, db_spec, find_free_port, redis_container_name, redis_spec,
    reconcile, ContainerEngine, ContainerPlan, ContainerState, DbCredentials, EngineError,
    PortExhausted,
};
use crate::serve;
use chrono::Utc;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("build failed: {0}")]
    Build(#[from] BuildError),
    #[error("failed to resolve deploy directory: {0}")]
    DeployDir(#[source] std::io::Error),
    #[error("failed to write server configuration: {0}")]
    ServeConfig(#[source] std::io::Error),
    #[error("port allocation failed: {0}")]
    Port(#[from] PortExhausted),
    #[error("container reconcile failed: {0}")]
    Container(#[from] EngineError),
    #[error("failed to write project record: {0}")]
    Record(#[source] std::io::Error),
    #[error("project {0} not found")]
    NotFound(String),
    #[error("failed to read project record: {0}")]
    ReadRecord(#[source] std::io::Error),
}

/// Observed container states for one deployed project.
#[derive(Debug, Clone)]
pub struct ProjectStatus {
    pub record: DeployedProject,
    pub app: ContainerState,
    pub db: Option<ContainerState>,
    pub redis: Option<ContainerState>,
}

fn new_project_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("proj_{}", &uuid[..8])
}

/// Orchestrates the full deploy pipeline against a container engine.
pub struct Deployer<E> {
    engine: E,
    config: OrchestratorConfig,
}

impl<E: ContainerEngine> Deployer<E> {
    pub fn new(engine: E, config: OrchestratorConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Deploy a project source tree end to end.
    ///
    /// The record lands on disk only after every container started, so a
    /// directory with a `project.json` always refers to a deploy that once
    /// fully converged.
    pub async fn deploy(
        &self,
        source: &Path,
        name: &str,
        services: &ServiceRequest,
    ) -> Result<DeployedProject, DeployError> {
        let id = new_project_id();
        info!(id = %id, name, source = %source.display(), "starting deploy");

        let (project_type, analysis) = classify_source(source);
        info!(id = %id, project_type = %project_type, "project classified");

        let deploy_dir = self.config.project_dir(&id);
        build::build(source, &deploy_dir, project_type, &analysis).await?;
        // Bind-mount sources must be absolute or Docker reads them as
        // volume names; the configured deploy root may be relative.
        let deploy_dir = std::fs::canonicalize(&deploy_dir).map_err(DeployError::DeployDir)?;

        let mut server = serve::configure(project_type);
        server.save(&deploy_dir).map_err(DeployError::ServeConfig)?;

        let port = find_free_port(self.config.port_base)?;
        server.exposed_port = Some(port);

        inject_service_env(&mut server.env, &id, services);

        let mut plan = ContainerPlan::new(self.config.network.clone());
        if let Some(db) = &services.db {
            let creds = DbCredentials {
                user: db.user.clone(),
                password: db.password.clone(),
                database: db.database.clone(),
            };
            let db_port = find_free_port(db.kind.port())?;
            plan.push(db_spec(&id, db.kind, &creds, db_port, &self.config.network));
        }
        if let Some(redis) = &services.redis {
            let redis_port = find_free_port(6379)?;
            plan.push(redis_spec(
                &id,
                redis.password.as_deref(),
                redis_port,
                &self.config.network,
            ));
        }
        plan.push(app_spec(&id, &server, &deploy_dir, &self.config.network));

        reconcile(&self.engine, &plan).await?;

        let deployed = DeployedProject {
            id: id.clone(),
            name: name.to_string(),
            project_type,
            port,
            url: format!("http://localhost:{port}"),
            services: services.service_names(),
            deployed_at: Utc::now(),
        };
        deployed.save(&deploy_dir).map_err(DeployError::Record)?;

        info!(id = %id, url = %deployed.url, "deploy complete");
        Ok(deployed)
    }

    /// Look up the record and live container states for a project.
    pub async fn status(&self, project_id: &str) -> Result<ProjectStatus, DeployError> {
        let dir = self.config.project_dir(project_id);
        if !dir.join(RECORD_FILENAME).is_file() {
            return Err(DeployError::NotFound(project_id.to_string()));
        }
        let record = DeployedProject::load(&dir).map_err(DeployError::ReadRecord)?;

        let app = self
            .engine
            .container_state(&crate::container::app_container_name(project_id))
            .await?;
        let db = if record.services.iter().any(|s| s != "redis") {
            Some(
                self.engine
                    .container_state(&db_container_name(project_id))
                    .await?,
            )
        } else {
            None
        };
        let redis = if record.services.iter().any(|s| s == "redis") {
            Some(
                self.engine
                    .container_state(&redis_container_name(project_id))
                    .await?,
            )
        } else {
            None
        };
        Ok(ProjectStatus {
            record,
            app,
            db,
            redis,
        })
    }

    /// All projects with a record under the deploy root, sorted by id.
    pub fn list(&self) -> Vec<DeployedProject> {
        let mut records = Vec::new();
        let entries = match std::fs::read_dir(&self.config.deploy_root) {
            Ok(entries) => entries,
            Err(_) => return records,
        };
        for entry in entries.filter_map(Result::ok) {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            match DeployedProject::load(&dir) {
                Ok(record) => records.push(record),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "skipping unreadable project record")
                }
            }
        }
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

/// Classification never fails a deploy; scan errors degrade to `Unknown`
/// with an empty analysis, matching [`classify::classify`].
fn classify_source(source: &Path) -> (ProjectType, ProjectAnalysis) {
    match classify::analyze(source) {
        Ok(analysis) => {
            let project_type = classify::determine_project_type(&analysis);
            classify::persist_analysis(source, &analysis, project_type);
            (project_type, analysis)
        }
        Err(err) => {
            warn!(source = %source.display(), error = %err, "classification degraded to unknown");
            (ProjectType::Unknown, ProjectAnalysis::default())
        }
    }
}

/// Connection env vars for the app container, pointing at sidecars by
/// container name on the shared network.
fn inject_service_env(
    env: &mut std::collections::BTreeMap<String, String>,
    project_id: &str,
    services: &ServiceRequest,
) {
    if let Some(db) = &services.db {
        env.insert("DB_HOST".to_string(), db_container_name(project_id));
        env.insert("DB_PORT".to_string(), db.kind.port().to_string());
        env.insert("DB_USER".to_string(), db.user.clone());
        env.insert("DB_PASSWORD".to_string(), db.password.clone());
        env.insert("DB_NAME".to_string(), db.database.clone());
    }
    if let Some(redis) = &services.redis {
        env.insert("REDIS_HOST".to_string(), redis_container_name(project_id));
        env.insert("REDIS_PORT".to_string(), "6379".to_string());
        if let Some(password) = &redis.password {
            env.insert("REDIS_PASSWORD".to_string(), password.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_ids_are_prefixed_and_unique() {
        let a = new_project_id();
        let b = new_project_id();
        assert!(a.starts_with("proj_"));
        assert_eq!(a.len(), "proj_".len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_service_env_points_at_sidecar_names() {
        let mut env = std::collections::BTreeMap::new();
        let services = ServiceRequest {
            db: Some(DbRequest {
                kind: crate::container::DbKind::Postgres,
                user: "app".to_string(),
                password: "pw".to_string(),
                database: "appdb".to_string(),
            }),
            redis: Some(RedisRequest {
                password: Some("rpw".to_string()),
            }),
        };
        inject_service_env(&mut env, "proj_x", &services);
        assert_eq!(env.get("DB_HOST").unwrap(), "db_proj_x");
        assert_eq!(env.get("DB_PORT").unwrap(), "5432");
        assert_eq!(env.get("REDIS_HOST").unwrap(), "redis_proj_x");
        assert_eq!(env.get("REDIS_PASSWORD").unwrap(), "rpw");
    }
}
