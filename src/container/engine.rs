//! Container engine abstraction over the Docker API.
//!
//! The reconciler talks to [`ContainerEngine`] rather than bollard directly
//! so the whole deploy path can run against a mock in tests.

use super::spec::ContainerSpec;
use async_trait::async_trait;
use bollard::container::{Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions};
use bollard::errors::Error as BollardError;
use bollard::image::CreateImageOptions;
use bollard::network::CreateNetworkOptions;
use bollard::service::{HostConfig, PortBinding, RestartPolicy, RestartPolicyNameEnum};
use bollard::volume::CreateVolumeOptions;
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to connect to docker daemon: {0}")]
    Connect(#[source] BollardError),
    #[error("failed to pull image {image}: {source}")]
    Pull {
        image: String,
        #[source]
        source: BollardError,
    },
    #[error("docker api error: {0}")]
    Api(#[from] BollardError),
}

/// Observed state of a container by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Stopped,
    Absent,
}

/// The subset of container operations the deploy pipeline needs.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn ensure_network(&self, name: &str) -> Result<(), EngineError>;
    async fn ensure_volume(&self, name: &str) -> Result<(), EngineError>;
    async fn pull_image(&self, image: &str) -> Result<(), EngineError>;
    async fn container_state(&self, name: &str) -> Result<ContainerState, EngineError>;
    /// Force-remove a container; absent is not an error.
    async fn remove_container(&self, name: &str) -> Result<(), EngineError>;
    /// Create and start a container; returns the container id.
    async fn run_container(&self, spec: &ContainerSpec) -> Result<String, EngineError>;
}

/// [`ContainerEngine`] backed by the local Docker daemon.
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    pub fn connect() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults().map_err(EngineError::Connect)?;
        Ok(Self { docker })
    }
}

/// Conflict means somebody already created it, which is exactly the state
/// an ensure operation wants.
fn ok_if_conflict(err: BollardError) -> Result<(), EngineError> {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 409, ..
        } => Ok(()),
        other => Err(EngineError::Api(other)),
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn ensure_network(&self, name: &str) -> Result<(), EngineError> {
        let options = CreateNetworkOptions {
            name: name.to_string(),
            driver: "bridge".to_string(),
            ..Default::default()
        };
        match self.docker.create_network(options).await {
            Ok(_) => {
                info!(network = name, "created network");
                Ok(())
            }
            Err(err) => ok_if_conflict(err),
        }
    }

    async fn ensure_volume(&self, name: &str) -> Result<(), EngineError> {
        let options = CreateVolumeOptions {
            name: name.to_string(),
            ..Default::default()
        };
        match self.docker.create_volume(options).await {
            Ok(_) => {
                info!(volume = name, "created volume");
                Ok(())
            }
            Err(err) => ok_if_conflict(err),
        }
    }

    async fn pull_image(&self, image: &str) -> Result<(), EngineError> {
        debug!(image, "pulling image");
        let options = CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        };
        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(progress) = stream.next().await {
            progress.map_err(|source| EngineError::Pull {
                image: image.to_string(),
                source,
            })?;
        }
        Ok(())
    }

    async fn container_state(&self, name: &str) -> Result<ContainerState, EngineError> {
        match self.docker.inspect_container(name, None).await {
            Ok(inspect) => {
                let running = inspect.state.and_then(|s| s.running) == Some(true);
                Ok(if running {
                    ContainerState::Running
                } else {
                    ContainerState::Stopped
                })
            }
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(ContainerState::Absent),
            Err(err) => Err(EngineError::Api(err)),
        }
    }

    async fn remove_container(&self, name: &str) -> Result<(), EngineError> {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        match self.docker.remove_container(name, Some(options)).await {
            Ok(()) => Ok(()),
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(()),
            Err(err) => Err(EngineError::Api(err)),
        }
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        let env: Vec<String> = spec
            .env
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();

        let mut binds: Vec<String> = spec
            .binds
            .iter()
            .map(|b| {
                if b.read_only {
                    format!("{}:{}:ro", b.source, b.target)
                } else {
                    format!("{}:{}", b.source, b.target)
                }
            })
            .collect();
        binds.extend(
            spec.volumes
                .iter()
                .map(|v| format!("{}:{}", v.volume, v.target)),
        );

        let mut exposed_ports = HashMap::new();
        let mut port_bindings = HashMap::new();
        if let (Some(container_port), Some(host_port)) = (spec.container_port, spec.host_port) {
            let key = format!("{container_port}/tcp");
            exposed_ports.insert(key.clone(), HashMap::new());
            port_bindings.insert(
                key,
                Some(vec![PortBinding {
                    host_ip: Some("0.0.0.0".to_string()),
                    host_port: Some(host_port.to_string()),
                }]),
            );
        }

        let host_config = HostConfig {
            binds: (!binds.is_empty()).then_some(binds),
            port_bindings: (!port_bindings.is_empty()).then_some(port_bindings),
            network_mode: Some(spec.network.clone()),
            restart_policy: Some(RestartPolicy {
                name: Some(RestartPolicyNameEnum::UNLESS_STOPPED),
                maximum_retry_count: None,
            }),
            ..Default::default()
        };

        let config = Config {
            image: Some(spec.image.clone()),
            cmd: (!spec.command.is_empty()).then(|| spec.command.clone()),
            env: (!env.is_empty()).then_some(env),
            working_dir: spec.working_dir.clone(),
            exposed_ports: (!exposed_ports.is_empty()).then_some(exposed_ports),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };
        let created = self
            .docker
            .create_container::<String, String>(Some(options), config)
            .await?;
        self.docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await?;
        info!(container = %spec.name, id = %created.id, "container started");
        Ok(created.id)
    }
}
