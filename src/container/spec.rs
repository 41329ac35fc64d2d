//! Declarative container specifications for one deployed project.
//!
//! A project reconciles to at most three containers: the app itself plus
//! optional database and redis sidecars, all joined to one bridge network
//! so the app reaches its services by container name.

use crate::serve::ServerConfig;
use std::collections::BTreeMap;
use std::path::Path;

/// Database engines the orchestrator knows how to provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbKind {
    Postgres,
    Mysql,
    Mongodb,
}

impl DbKind {
    pub fn image(&self) -> &'static str {
        match self {
            DbKind::Postgres => "postgres:14-alpine",
            DbKind::Mysql => "mysql:8",
            DbKind::Mongodb => "mongo:5",
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            DbKind::Postgres => 5432,
            DbKind::Mysql => 3306,
            DbKind::Mongodb => 27017,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DbKind::Postgres => "postgres",
            DbKind::Mysql => "mysql",
            DbKind::Mongodb => "mongodb",
        }
    }
}

/// A bind mount from the host into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub source: String,
    pub target: String,
    pub read_only: bool,
}

/// A named volume mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub volume: String,
    pub target: String,
}

/// Everything needed to create and start one container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Empty means the image's default command.
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Container port to publish; `None` keeps the container internal-only.
    pub container_port: Option<u16>,
    /// Host port the published port binds to.
    pub host_port: Option<u16>,
    pub binds: Vec<BindMount>,
    pub volumes: Vec<VolumeMount>,
    pub network: String,
    pub working_dir: Option<String>,
}

pub fn app_container_name(project_id: &str) -> String {
    format!("app_{project_id}")
}

pub fn db_container_name(project_id: &str) -> String {
    format!("db_{project_id}")
}

pub fn redis_container_name(project_id: &str) -> String {
    format!("redis_{project_id}")
}

pub fn db_volume_name(project_id: &str) -> String {
    format!("db_data_{project_id}")
}

/// Spec for the app container: artifact bind-mounted in, nginx config (when
/// present) overriding the image default, the serve config's exposed port
/// published.
pub fn app_spec(
    project_id: &str,
    server: &ServerConfig,
    deploy_dir: &Path,
    network: &str,
) -> ContainerSpec {
    let deploy = deploy_dir.display().to_string();
    let mut binds = vec![BindMount {
        source: deploy.clone(),
        target: server.mount_target.clone(),
        read_only: false,
    }];
    if server.nginx_config.is_some() {
        binds.push(BindMount {
            source: format!("{deploy}/nginx.conf"),
            target: "/etc/nginx/conf.d/default.conf".to_string(),
            read_only: true,
        });
    }
    ContainerSpec {
        name: app_container_name(project_id),
        image: server.image.clone(),
        command: server.command.clone(),
        env: server.env.clone(),
        container_port: Some(server.container_port),
        host_port: server.exposed_port,
        binds,
        volumes: Vec::new(),
        network: network.to_string(),
        working_dir: server.working_dir.clone(),
    }
}

/// Credentials for a provisioned database.
#[derive(Debug, Clone)]
pub struct DbCredentials {
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Spec for the database sidecar: data on a named volume, the engine's
/// well-known port published on its own scanned host port, reachable from
/// the app by container name.
pub fn db_spec(
    project_id: &str,
    kind: DbKind,
    creds: &DbCredentials,
    host_port: u16,
    network: &str,
) -> ContainerSpec {
    let mut env = BTreeMap::new();
    match kind {
        DbKind::Postgres => {
            env.insert("POSTGRES_USER".to_string(), creds.user.clone());
            env.insert("POSTGRES_PASSWORD".to_string(), creds.password.clone());
            env.insert("POSTGRES_DB".to_string(), creds.database.clone());
        }
        DbKind::Mysql => {
            env.insert("MYSQL_USER".to_string(), creds.user.clone());
            env.insert("MYSQL_PASSWORD".to_string(), creds.password.clone());
            env.insert("MYSQL_ROOT_PASSWORD".to_string(), creds.password.clone());
            env.insert("MYSQL_DATABASE".to_string(), creds.database.clone());
        }
        DbKind::Mongodb => {
            env.insert("MONGO_INITDB_ROOT_USERNAME".to_string(), creds.user.clone());
            env.insert(
                "MONGO_INITDB_ROOT_PASSWORD".to_string(),
                creds.password.clone(),
            );
            env.insert("MONGO_INITDB_DATABASE".to_string(), creds.database.clone());
        }
    }
    let data_target = match kind {
        DbKind::Postgres => "/var/lib/postgresql/data",
        DbKind::Mysql => "/var/lib/mysql",
        DbKind::Mongodb => "/data/db",
    };
    ContainerSpec {
        name: db_container_name(project_id),
        image: kind.image().to_string(),
        command: Vec::new(),
        env,
        container_port: Some(kind.port()),
        host_port: Some(host_port),
        binds: Vec::new(),
        volumes: vec![VolumeMount {
            volume: db_volume_name(project_id),
            target: data_target.to_string(),
        }],
        network: network.to_string(),
        working_dir: None,
    }
}

/// Spec for the redis sidecar.
pub fn redis_spec(
    project_id: &str,
    password: Option<&str>,
    host_port: u16,
    network: &str,
) -> ContainerSpec {
    let command = match password {
        Some(password) => vec![
            "redis-server".to_string(),
            "--requirepass".to_string(),
            password.to_string(),
        ],
        None => Vec::new(),
    };
    ContainerSpec {
        name: redis_container_name(project_id),
        image: "redis:alpine".to_string(),
        command,
        env: BTreeMap::new(),
        container_port: Some(6379),
        host_port: Some(host_port),
        binds: Vec::new(),
        volumes: Vec::new(),
        network: network.to_string(),
        working_dir: None,
    }
}
