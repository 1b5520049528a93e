//! Deployment processor
//!
//! Per Deployment: owned Pods (label selector) and ConfigMaps referenced by the
//! pod template.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::ResourceExt;

use super::{KindProcessor, ProcessorOutput};
use crate::error::ProcessError;
use crate::mapper::context::ProcessContext;
use crate::mapper::references::{config_map_usage, describe_usage};
use crate::mapper::selector::{describe_label_selector, matches_label_selector};
use crate::mapper::tasks::settle;
use crate::models::{Relationship, RelationshipKind, Resource, ResourceId, ResourceKind};

pub struct DeploymentProcessor {
    ctx: ProcessContext,
    output: ProcessorOutput,
}

impl DeploymentProcessor {
    pub fn new(ctx: ProcessContext) -> Self {
        Self {
            ctx,
            output: ProcessorOutput::default(),
        }
    }
}

#[async_trait]
impl KindProcessor for DeploymentProcessor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Deployment
    }

    async fn process(&self, namespace: &str) -> Result<(), ProcessError> {
        let deployments = self
            .ctx
            .list::<Deployment>(namespace)
            .await
            .map_err(|e| ProcessError::list_failure(ResourceKind::Deployment, namespace, e))?;
        tracing::debug!(namespace, count = deployments.len(), "Processing deployments");
        if deployments.is_empty() {
            return Ok(());
        }

        let pods = Arc::new(self.ctx.list_neighbors::<Pod>(namespace).await?);
        let mut group = self.ctx.task_group();
        for deployment in deployments {
            self.ctx.check_cancelled()?;
            let ctx = self.ctx.clone();
            let output = self.output.clone();
            let namespace = namespace.to_string();
            let pods = pods.clone();
            group.spawn(process_deployment(ctx, output, namespace, pods, deployment));
        }
        settle(group.join().await?, "deployment")?;
        Ok(())
    }

    fn resources(&self) -> Vec<Resource> {
        self.output.resources()
    }

    fn relationships(&self) -> Vec<Relationship> {
        self.output.relationships()
    }
}

async fn process_deployment(
    ctx: ProcessContext,
    output: ProcessorOutput,
    namespace: String,
    pods: Arc<Vec<Arc<Pod>>>,
    deployment: Arc<Deployment>,
) -> Result<(), ProcessError> {
    let id = output.add_object(deployment.clone());

    let mut rules = ctx.task_group();
    rules.spawn(owned_pods(
        ctx.clone(),
        output.clone(),
        pods,
        id.clone(),
        deployment.clone(),
    ));
    rules.spawn(used_config_maps(ctx.clone(), output, namespace, id, deployment));
    settle(rules.join().await?, "deployment rule")?;
    Ok(())
}

async fn owned_pods(
    ctx: ProcessContext,
    output: ProcessorOutput,
    pods: Arc<Vec<Arc<Pod>>>,
    id: ResourceId,
    deployment: Arc<Deployment>,
) -> Result<(), ProcessError> {
    let Some(selector) = deployment.spec.as_ref().map(|spec| &spec.selector) else {
        return Ok(());
    };
    let description = describe_label_selector(selector);

    for pod in pods.iter() {
        ctx.check_cancelled()?;
        if !matches_label_selector(selector, pod.labels()) {
            continue;
        }
        let pod_id = output.add_object(pod.clone());
        output.graph().add_relationship(Relationship::new(
            id.clone(),
            pod_id,
            RelationshipKind::Owns,
            description.clone(),
        ));
    }
    Ok(())
}

async fn used_config_maps(
    ctx: ProcessContext,
    output: ProcessorOutput,
    namespace: String,
    id: ResourceId,
    deployment: Arc<Deployment>,
) -> Result<(), ProcessError> {
    let Some(pod_spec) = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
    else {
        return Ok(());
    };

    for (name, modes) in config_map_usage(pod_spec) {
        ctx.check_cancelled()?;
        let Some(config_map) = ctx.get_reference::<ConfigMap>(&namespace, &name).await? else {
            continue;
        };
        let cm_id = output.add_object(config_map);
        output.graph().add_relationship(Relationship::new(
            id.clone(),
            cm_id,
            RelationshipKind::Uses,
            describe_usage(&modes),
        ));
    }
    Ok(())
}
