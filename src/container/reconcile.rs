//! Reconciliation of a project's desired container set against the daemon.
//!
//! Reconciliation is deliberately forward-only: if a later container fails,
//! the earlier ones stay up. A redeploy of the same project converges the
//! set again, and partial state is visible through `status` rather than
//! silently rolled back.

use super::engine::{ContainerEngine, ContainerState, EngineError};
use super::spec::ContainerSpec;
use tracing::{info, warn};

/// The desired container set for one project, in start order. Sidecars come
/// first so the app finds its services up when it boots.
#[derive(Debug, Clone, Default)]
pub struct ContainerPlan {
    pub network: String,
    pub containers: Vec<ContainerSpec>,
}

impl ContainerPlan {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            containers: Vec::new(),
        }
    }

    pub fn push(&mut self, spec: ContainerSpec) {
        self.containers.push(spec);
    }
}

/// Drive the daemon to match the plan. Existing containers with a planned
/// name are force-replaced, so reconcile is idempotent across redeploys.
pub async fn reconcile<E: ContainerEngine + ?Sized>(
    engine: &E,
    plan: &ContainerPlan,
) -> Result<(), EngineError> {
    engine.ensure_network(&plan.network).await?;

    for spec in &plan.containers {
        for volume in &spec.volumes {
            engine.ensure_volume(&volume.volume).await?;
        }
        engine.pull_image(&spec.image).await?;

        match engine.container_state(&spec.name).await? {
            ContainerState::Absent => {}
            state => {
                warn!(container = %spec.name, ?state, "replacing existing container");
                engine.remove_container(&spec.name).await?;
            }
        }

        engine.run_container(spec).await?;
    }

    info!(
        network = %plan.network,
        containers = plan.containers.len(),
        "reconcile complete"
    );
    Ok(())
}
