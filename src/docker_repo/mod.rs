// Docker engine access via bollard

mod stats;

use crate::engine::{ContainerEngine, EngineError, StatsError};
use crate::models::{ContainerRef, StatsRead};
use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::{ListContainersOptions, StatsOptions};
use futures_util::StreamExt;
use std::collections::HashMap;
use tracing::instrument;

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Connect over the local unix socket. The connection is lazy; the first API call may still fail.
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerEngine for DockerRepo {
    #[instrument(skip_all, fields(repo = "docker", operation = "list_running_containers"))]
    async fn list_running_containers(&self) -> Result<Vec<ContainerRef>, EngineError> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let options = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(EngineError::new)?;

        Ok(containers
            .into_iter()
            .filter_map(|c| {
                let id = c.id?;
                Some(ContainerRef::from_engine(id, c.names.as_deref()))
            })
            .collect())
    }

    #[instrument(skip_all, fields(repo = "docker", operation = "get_stats", container = %container.name))]
    async fn get_stats(&self, container: &ContainerRef) -> Result<StatsRead, StatsError> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(&container.id, Some(options));

        match stream.next().await {
            Some(Ok(s)) => stats::process_statistics(&s),
            Some(Err(e)) => Err(StatsError::unavailable(e)),
            None => Err(StatsError::Malformed("empty stats response".into())),
        }
    }
}
