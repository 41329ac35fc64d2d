use async_trait::async_trait;
use quayside::container::{ContainerEngine, ContainerSpec, ContainerState, EngineError};
use std::sync::Mutex;

/// In-memory engine that records every call for assertions. Container names
/// listed in `fail_on_run` make `run_container` fail, to exercise the
/// forward-only failure path without a daemon.
#[derive(Default)]
pub struct MockEngine {
    pub calls: Mutex<Vec<String>>,
    pub specs: Mutex<Vec<ContainerSpec>>,
    pub fail_on_run: Vec<String>,
}

#[allow(dead_code)]
impl MockEngine {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            specs: Mutex::new(Vec::new()),
            fail_on_run: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// The spec passed to `run_container` for `name`, if it ran.
    pub fn ran_spec(&self, name: &str) -> Option<ContainerSpec> {
        self.specs.lock().unwrap().iter().find(|s| s.name == name).cloned()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn ensure_network(&self, name: &str) -> Result<(), EngineError> {
        self.log(format!("network {name}"));
        Ok(())
    }

    async fn ensure_volume(&self, name: &str) -> Result<(), EngineError> {
        self.log(format!("volume {name}"));
        Ok(())
    }

    async fn pull_image(&self, image: &str) -> Result<(), EngineError> {
        self.log(format!("pull {image}"));
        Ok(())
    }

    async fn container_state(&self, _name: &str) -> Result<ContainerState, EngineError> {
        Ok(ContainerState::Absent)
    }

    async fn remove_container(&self, name: &str) -> Result<(), EngineError> {
        self.log(format!("remove {name}"));
        Ok(())
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        if self.fail_on_run.iter().any(|n| *n == spec.name) {
            return Err(EngineError::Pull {
                image: spec.image.clone(),
                source: bollard::errors::Error::IOError {
                    err: std::io::Error::new(std::io::ErrorKind::Other, "injected failure"),
                },
            });
        }
        self.log(format!("run {}", spec.name));
        self.specs.lock().unwrap().push(spec.clone());
        Ok(format!("id-{}", spec.name))
    }
}
