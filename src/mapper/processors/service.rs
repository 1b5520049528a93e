//! Service processor
//!
//! Per Service: targeted Pods (selector superset) with resolved port mappings,
//! and the active endpoint count from the matching Endpoints object.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Endpoints, Pod, Service};
use kube::ResourceExt;

use super::{KindProcessor, ProcessorOutput};
use crate::error::ProcessError;
use crate::mapper::context::ProcessContext;
use crate::mapper::selector::matches_service_selector;
use crate::mapper::tasks::settle;
use crate::models::details::{format_service_ports, pod_named_port};
use crate::models::status::active_endpoints;
use crate::models::{Relationship, RelationshipKind, Resource, ResourceId, ResourceKind};

pub struct ServiceProcessor {
    ctx: ProcessContext,
    output: ProcessorOutput,
}

impl ServiceProcessor {
    pub fn new(ctx: ProcessContext) -> Self {
        Self {
            ctx,
            output: ProcessorOutput::default(),
        }
    }
}

#[async_trait]
impl KindProcessor for ServiceProcessor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Service
    }

    async fn process(&self, namespace: &str) -> Result<(), ProcessError> {
        let services = self
            .ctx
            .list::<Service>(namespace)
            .await
            .map_err(|e| ProcessError::list_failure(ResourceKind::Service, namespace, e))?;
        tracing::debug!(namespace, count = services.len(), "Processing services");
        if services.is_empty() {
            return Ok(());
        }

        let pods = Arc::new(self.ctx.list_neighbors::<Pod>(namespace).await?);
        let mut group = self.ctx.task_group();
        for service in services {
            self.ctx.check_cancelled()?;
            let ctx = self.ctx.clone();
            let output = self.output.clone();
            let namespace = namespace.to_string();
            let pods = pods.clone();
            group.spawn(process_service(ctx, output, namespace, pods, service));
        }
        settle(group.join().await?, "service")?;
        Ok(())
    }

    fn resources(&self) -> Vec<Resource> {
        self.output.resources()
    }

    fn relationships(&self) -> Vec<Relationship> {
        self.output.relationships()
    }
}

async fn process_service(
    ctx: ProcessContext,
    output: ProcessorOutput,
    namespace: String,
    pods: Arc<Vec<Arc<Pod>>>,
    service: Arc<Service>,
) -> Result<(), ProcessError> {
    let id = output.add_object(service.clone());

    let mut rules = ctx.task_group();
    rules.spawn(targeted_pods(
        ctx.clone(),
        output.clone(),
        pods,
        id.clone(),
        service.clone(),
    ));
    rules.spawn(endpoint_count(ctx.clone(), output, namespace, id));
    settle(rules.join().await?, "service rule")?;
    Ok(())
}

async fn targeted_pods(
    ctx: ProcessContext,
    output: ProcessorOutput,
    pods: Arc<Vec<Arc<Pod>>>,
    id: ResourceId,
    service: Arc<Service>,
) -> Result<(), ProcessError> {
    let selector = service
        .spec
        .as_ref()
        .and_then(|spec| spec.selector.clone())
        .unwrap_or_default();
    if selector.is_empty() {
        return Ok(());
    }

    for pod in pods.iter() {
        ctx.check_cancelled()?;
        if !matches_service_selector(&selector, pod.labels()) {
            continue;
        }
        let ports = format_service_ports(&service, |name| pod_named_port(pod, name));
        let pod_id = output.add_object(pod.clone());
        output.graph().add_relationship(Relationship::new(
            id.clone(),
            pod_id,
            RelationshipKind::Targets,
            ports,
        ));
    }
    Ok(())
}

async fn endpoint_count(
    ctx: ProcessContext,
    output: ProcessorOutput,
    namespace: String,
    id: ResourceId,
) -> Result<(), ProcessError> {
    let Some(endpoints) = ctx.get_reference::<Endpoints>(&namespace, &id.name).await? else {
        return Ok(());
    };
    let active = active_endpoints(&endpoints);
    output.graph().update_status(&id, |resource| {
        resource
            .status
            .push_detail(format!("Endpoints: {} active", active));
    });
    Ok(())
}
