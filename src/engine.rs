// Container engine collaborator: enumeration and per-container stats reads

use crate::models::{ContainerRef, StatsRead};
use async_trait::async_trait;
use std::time::Duration;

/// The engine cannot be reached or refused to enumerate containers. Fatal to the sampler.
#[derive(Debug, thiserror::Error)]
#[error("container engine unavailable: {0}")]
pub struct EngineError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl EngineError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// Stats could not be obtained for one container. Absorbed by the sampler.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("stats unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("stats request timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed stats payload: {0}")]
    Malformed(String),
}

impl StatsError {
    pub fn unavailable(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Unavailable(err.into())
    }
}

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Currently running containers, in whatever order the engine returns them.
    async fn list_running_containers(&self) -> Result<Vec<ContainerRef>, EngineError>;

    /// One stats read for `container`.
    async fn get_stats(&self, container: &ContainerRef) -> Result<StatsRead, StatsError>;
}

#[async_trait]
impl<E: ContainerEngine + ?Sized> ContainerEngine for std::sync::Arc<E> {
    async fn list_running_containers(&self) -> Result<Vec<ContainerRef>, EngineError> {
        (**self).list_running_containers().await
    }

    async fn get_stats(&self, container: &ContainerRef) -> Result<StatsRead, StatsError> {
        (**self).get_stats(container).await
    }
}
