//! ConfigMap processor
//!
//! Per ConfigMap: the Pods whose spec references it, as `Pod → ConfigMap`
//! usage edges.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};

use super::{KindProcessor, ProcessorOutput};
use crate::error::ProcessError;
use crate::mapper::context::ProcessContext;
use crate::mapper::references::{ConfigMapUsage, config_map_usage, describe_usage};
use crate::mapper::tasks::settle;
use crate::models::{Relationship, RelationshipKind, Resource, ResourceKind};

pub struct ConfigMapProcessor {
    ctx: ProcessContext,
    output: ProcessorOutput,
}

impl ConfigMapProcessor {
    pub fn new(ctx: ProcessContext) -> Self {
        Self {
            ctx,
            output: ProcessorOutput::default(),
        }
    }

    /// Pods of the namespace with their scanned ConfigMap usage
    async fn pod_usage(&self, namespace: &str) -> Result<Vec<(Arc<Pod>, ConfigMapUsage)>, ProcessError> {
        let pods = self.ctx.list_neighbors::<Pod>(namespace).await?;
        Ok(pods
            .into_iter()
            .filter_map(|pod| {
                let usage = pod.spec.as_ref().map(config_map_usage)?;
                (!usage.is_empty()).then_some((pod, usage))
            })
            .collect())
    }
}

#[async_trait]
impl KindProcessor for ConfigMapProcessor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ConfigMap
    }

    async fn process(&self, namespace: &str) -> Result<(), ProcessError> {
        let config_maps = self
            .ctx
            .list::<ConfigMap>(namespace)
            .await
            .map_err(|e| ProcessError::list_failure(ResourceKind::ConfigMap, namespace, e))?;
        tracing::debug!(namespace, count = config_maps.len(), "Processing config maps");
        if config_maps.is_empty() {
            return Ok(());
        }

        let pods = Arc::new(self.pod_usage(namespace).await?);
        let mut group = self.ctx.task_group();
        for config_map in config_maps {
            self.ctx.check_cancelled()?;
            let ctx = self.ctx.clone();
            let output = self.output.clone();
            let pods = pods.clone();
            group.spawn(process_config_map(ctx, output, pods, config_map));
        }
        settle(group.join().await?, "config map")?;
        Ok(())
    }

    fn resources(&self) -> Vec<Resource> {
        self.output.resources()
    }

    fn relationships(&self) -> Vec<Relationship> {
        self.output.relationships()
    }
}

async fn process_config_map(
    ctx: ProcessContext,
    output: ProcessorOutput,
    pods: Arc<Vec<(Arc<Pod>, ConfigMapUsage)>>,
    config_map: Arc<ConfigMap>,
) -> Result<(), ProcessError> {
    let id = output.add_object(config_map);

    for (pod, usage) in pods.iter() {
        ctx.check_cancelled()?;
        let Some(modes) = usage.get(&id.name) else {
            continue;
        };
        let pod_id = output.add_object(pod.clone());
        output.graph().add_relationship(Relationship::new(
            pod_id,
            id.clone(),
            RelationshipKind::Uses,
            describe_usage(modes),
        ));
    }
    Ok(())
}
