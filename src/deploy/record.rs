//! Persistent record of a deployed project.

use crate::classify::ProjectType;
use crate::container::DbKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// File name of the record inside the project's deploy directory.
pub const RECORD_FILENAME: &str = "project.json";

/// Sidecar services requested alongside an app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceRequest {
    pub db: Option<DbRequest>,
    pub redis: Option<RedisRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbRequest {
    #[serde(rename = "type")]
    pub kind: DbKind,
    pub user: String,
    pub password: String,
    pub database: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedisRequest {
    pub password: Option<String>,
}

impl ServiceRequest {
    /// Service names for the project record, in provision order.
    pub fn service_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(db) = &self.db {
            names.push(db.kind.as_str().to_string());
        }
        if self.redis.is_some() {
            names.push("redis".to_string());
        }
        names
    }
}

/// The record written after a deploy succeeds, one per project directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedProject {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub port: u16,
    pub url: String,
    pub services: Vec<String>,
    pub deployed_at: DateTime<Utc>,
}

impl DeployedProject {
    pub fn save(&self, project_dir: &Path) -> io::Result<()> {
        let path = project_dir.join(RECORD_FILENAME);
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes)
    }

    pub fn load(project_dir: &Path) -> io::Result<Self> {
        let path = project_dir.join(RECORD_FILENAME);
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
