//! Container lifecycle: specs, port allocation, engine access, reconcile.

pub mod engine;
pub mod ports;
pub mod reconcile;
pub mod spec;

pub use engine::{ContainerEngine, ContainerState, DockerEngine, EngineError};
pub use ports::{find_free_port, PortExhausted};
pub use reconcile::{reconcile, ContainerPlan};
pub use spec::{
    app_container_name, app_spec, db_container_name, db_spec, db_volume_name,
    redis_container_name, redis_spec, BindMount, ContainerSpec, DbCredentials, DbKind,
    VolumeMount,
};
