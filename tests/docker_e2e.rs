//! End-to-end deploy against a real Docker daemon.
//!
//! Ignored by default; run with `cargo test -- --ignored` on a machine with
//! Docker available.

use anyhow::{Context, Result};
use quayside::config::OrchestratorConfig;
use quayside::container::{ContainerState, DockerEngine};
use quayside::deploy::{Deployer, ServiceRequest};
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
#[ignore]
#[serial]
async fn test_static_site_serves_over_http() -> Result<()> {
    let src = TempDir::new().unwrap();
    fs::write(
        src.path().join("index.html"),
        "<html><body>quayside e2e</body></html>",
    )
    .unwrap();

    let root = TempDir::new().unwrap();
    let config = OrchestratorConfig {
        deploy_root: root.path().to_path_buf(),
        network: "quayside-test-network".to_string(),
        port_base: 18100,
        log_level: "info".to_string(),
    };
    let engine = DockerEngine::connect().context("docker daemon required")?;
    let deployer = Deployer::new(engine, config);

    let deployed = deployer
        .deploy(src.path(), "e2e-static", &ServiceRequest::default())
        .await
        .context("deploy failed")?;

    // nginx needs a moment to come up before the first request.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let mut body = None;
    for _ in 0..50 {
        match client.get(&deployed.url).send().await {
            Ok(response) if response.status().is_success() => {
                body = response.text().await.ok();
                break;
            }
            _ => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
    let body = body.context("site never became reachable")?;
    assert!(body.contains("quayside e2e"));

    let status = deployer.status(&deployed.id).await?;
    assert_eq!(status.app, ContainerState::Running);

    // Cleanup so reruns start fresh.
    let engine = DockerEngine::connect()?;
    let name = quayside::container::app_container_name(&deployed.id);
    let _ = quayside::container::ContainerEngine::remove_container(&engine, &name).await;
    Ok(())
}
