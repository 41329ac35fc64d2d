//! Deploy pipeline tests against a mock container engine.
//!
//! Static projects keep the build step shell-free, so the whole pipeline
//! runs without npm or a Docker daemon.

mod support;

use quayside::config::OrchestratorConfig;
use quayside::container::ContainerState;
use quayside::deploy::{DbRequest, Deployer, RedisRequest, ServiceRequest};
use quayside::ProjectType;
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use support::MockEngine;
use tempfile::TempDir;

fn static_source() -> TempDir {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("index.html"), "<h1>hello</h1>").unwrap();
    fs::write(src.path().join("style.css"), "body {}").unwrap();
    src
}

fn test_config(deploy_root: &Path) -> OrchestratorConfig {
    OrchestratorConfig {
        deploy_root: deploy_root.to_path_buf(),
        network: "deploy-network".to_string(),
        port_base: 18000,
        log_level: "info".to_string(),
    }
}

#[tokio::test]
async fn test_static_deploy_end_to_end() {
    let src = static_source();
    let root = TempDir::new().unwrap();
    let deployer = Deployer::new(MockEngine::default(), test_config(root.path()));

    let deployed = deployer
        .deploy(src.path(), "hello", &ServiceRequest::default())
        .await
        .unwrap();

    assert_eq!(deployed.name, "hello");
    assert_eq!(deployed.project_type, ProjectType::Static);
    assert!(deployed.port >= 18000);
    assert_eq!(deployed.url, format!("http://localhost:{}", deployed.port));
    assert!(deployed.services.is_empty());

    // Artifact, nginx config, and record all land in the project directory.
    let project_dir = root.path().join(&deployed.id);
    assert!(project_dir.join("index.html").is_file());
    assert!(project_dir.join("nginx.conf").is_file());
    assert!(project_dir.join("project.json").is_file());

    // The allocated port is published on the app container.
    let app = deployer
        .engine()
        .ran_spec(&format!("app_{}", deployed.id))
        .unwrap();
    assert_eq!(app.host_port, Some(deployed.port));
    assert_eq!(app.container_port, Some(80));
}

#[tokio::test]
async fn test_deploy_with_sidecars_starts_them_before_app() {
    let src = static_source();
    let root = TempDir::new().unwrap();
    let engine = MockEngine::default();
    let deployer = Deployer::new(engine, test_config(root.path()));

    let services = ServiceRequest {
        db: Some(DbRequest {
            kind: quayside::container::DbKind::Postgres,
            user: "app".to_string(),
            password: "pw".to_string(),
            database: "appdb".to_string(),
        }),
        redis: Some(RedisRequest { password: None }),
    };
    let deployed = deployer.deploy(src.path(), "shop", &services).await.unwrap();
    assert_eq!(deployed.services, vec!["postgres", "redis"]);

    let status = deployer.status(&deployed.id).await.unwrap();
    assert_eq!(status.app, ContainerState::Absent);
    assert!(status.db.is_some());
    assert!(status.redis.is_some());

    let record: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(root.path().join(&deployed.id).join("project.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(record["services"][0], "postgres");
    assert_eq!(record["services"][1], "redis");
}

#[tokio::test]
async fn test_mysql_sidecar_gets_its_own_host_port() {
    let src = static_source();
    let root = TempDir::new().unwrap();
    let deployer = Deployer::new(MockEngine::default(), test_config(root.path()));

    let services = ServiceRequest {
        db: Some(DbRequest {
            kind: quayside::container::DbKind::Mysql,
            user: "app".to_string(),
            password: "pw".to_string(),
            database: "appdb".to_string(),
        }),
        redis: None,
    };
    let deployed = deployer.deploy(src.path(), "shop", &services).await.unwrap();

    let db = deployer
        .engine()
        .ran_spec(&format!("db_{}", deployed.id))
        .unwrap();
    assert_eq!(db.image, "mysql:8");
    assert_eq!(db.container_port, Some(3306));
    let db_port = db.host_port.unwrap();
    assert_ne!(db_port, deployed.port);
}

#[tokio::test]
#[serial]
async fn test_relative_deploy_root_still_binds_absolute_paths() {
    let src = static_source();
    let workdir = TempDir::new().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(workdir.path()).unwrap();

    let config = OrchestratorConfig {
        deploy_root: PathBuf::from("./deployed"),
        network: "deploy-network".to_string(),
        port_base: 18000,
        log_level: "info".to_string(),
    };
    let deployer = Deployer::new(MockEngine::default(), config);
    let result = deployer
        .deploy(src.path(), "relative", &ServiceRequest::default())
        .await;
    std::env::set_current_dir(previous).unwrap();

    // A relative bind source is read by Docker as a volume name and the
    // create call rejects it, so the spec must carry absolute paths.
    let deployed = result.unwrap();
    let app = deployer
        .engine()
        .ran_spec(&format!("app_{}", deployed.id))
        .unwrap();
    for bind in &app.binds {
        assert!(Path::new(&bind.source).is_absolute(), "bind {}", bind.source);
    }
}

#[tokio::test]
async fn test_failed_build_leaves_no_record() {
    let root = TempDir::new().unwrap();
    let deployer = Deployer::new(MockEngine::default(), test_config(root.path()));

    // Classification degrades to unknown, then the copy into the deploy
    // dir fails because there is nothing to copy.
    let missing = root.path().join("no-such-source");
    let err = deployer
        .deploy(&missing, "ghost", &ServiceRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, quayside::deploy::DeployError::Build(_)));
    assert!(deployer.list().is_empty());
    assert!(deployer.engine().calls().is_empty());
}

#[tokio::test]
async fn test_failed_reconcile_leaves_no_record() {
    let src = static_source();
    let root = TempDir::new().unwrap();
    let deployer = Deployer::new(FailingEngine, test_config(root.path()));

    let err = deployer
        .deploy(src.path(), "doomed", &ServiceRequest::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("reconcile"));

    // The artifact directory exists but carries no project.json, so the
    // project never shows up in listings.
    assert!(deployer.list().is_empty());
}

/// Engine that refuses to run any container.
struct FailingEngine;

#[async_trait::async_trait]
impl quayside::container::ContainerEngine for FailingEngine {
    async fn ensure_network(&self, _name: &str) -> Result<(), quayside::EngineError> {
        Ok(())
    }
    async fn ensure_volume(&self, _name: &str) -> Result<(), quayside::EngineError> {
        Ok(())
    }
    async fn pull_image(&self, _image: &str) -> Result<(), quayside::EngineError> {
        Ok(())
    }
    async fn container_state(
        &self,
        _name: &str,
    ) -> Result<quayside::ContainerState, quayside::EngineError> {
        Ok(quayside::ContainerState::Absent)
    }
    async fn remove_container(&self, _name: &str) -> Result<(), quayside::EngineError> {
        Ok(())
    }
    async fn run_container(
        &self,
        spec: &quayside::container::ContainerSpec,
    ) -> Result<String, quayside::EngineError> {
        Err(quayside::EngineError::Pull {
            image: spec.image.clone(),
            source: bollard::errors::Error::IOError {
                err: std::io::Error::new(std::io::ErrorKind::Other, "refused"),
            },
        })
    }
}

#[tokio::test]
async fn test_list_returns_deploys_sorted_by_id() {
    let src = static_source();
    let root = TempDir::new().unwrap();
    let deployer = Deployer::new(MockEngine::default(), test_config(root.path()));

    let a = deployer
        .deploy(src.path(), "one", &ServiceRequest::default())
        .await
        .unwrap();
    let b = deployer
        .deploy(src.path(), "two", &ServiceRequest::default())
        .await
        .unwrap();

    let listed = deployer.list();
    assert_eq!(listed.len(), 2);
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(
        listed.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
        expected
    );
}

#[tokio::test]
async fn test_status_of_unknown_project_errors() {
    let root = TempDir::new().unwrap();
    let deployer = Deployer::new(MockEngine::default(), test_config(root.path()));

    let err = deployer.status("proj_missing").await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}
