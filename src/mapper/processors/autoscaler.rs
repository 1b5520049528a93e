//! HorizontalPodAutoscaler processor
//!
//! Per autoscaler: the Deployment named by `scaleTargetRef`.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;

use super::{KindProcessor, ProcessorOutput};
use crate::error::ProcessError;
use crate::mapper::context::ProcessContext;
use crate::mapper::tasks::settle;
use crate::models::status::{autoscaler_bounds, scale_summary};
use crate::models::{Relationship, RelationshipKind, Resource, ResourceKind};

pub struct AutoscalerProcessor {
    ctx: ProcessContext,
    output: ProcessorOutput,
}

impl AutoscalerProcessor {
    pub fn new(ctx: ProcessContext) -> Self {
        Self {
            ctx,
            output: ProcessorOutput::default(),
        }
    }
}

#[async_trait]
impl KindProcessor for AutoscalerProcessor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::HorizontalPodAutoscaler
    }

    async fn process(&self, namespace: &str) -> Result<(), ProcessError> {
        let autoscalers = self
            .ctx
            .list::<HorizontalPodAutoscaler>(namespace)
            .await
            .map_err(|e| {
                ProcessError::list_failure(ResourceKind::HorizontalPodAutoscaler, namespace, e)
            })?;
        tracing::debug!(namespace, count = autoscalers.len(), "Processing autoscalers");

        let mut group = self.ctx.task_group();
        for hpa in autoscalers {
            self.ctx.check_cancelled()?;
            let ctx = self.ctx.clone();
            let output = self.output.clone();
            let namespace = namespace.to_string();
            group.spawn(process_autoscaler(ctx, output, namespace, hpa));
        }
        settle(group.join().await?, "autoscaler")?;
        Ok(())
    }

    fn resources(&self) -> Vec<Resource> {
        self.output.resources()
    }

    fn relationships(&self) -> Vec<Relationship> {
        self.output.relationships()
    }
}

async fn process_autoscaler(
    ctx: ProcessContext,
    output: ProcessorOutput,
    namespace: String,
    hpa: Arc<HorizontalPodAutoscaler>,
) -> Result<(), ProcessError> {
    let (min, max) = autoscaler_bounds(&hpa);
    let target = hpa
        .spec
        .as_ref()
        .map(|spec| &spec.scale_target_ref)
        .filter(|target| target.kind == "Deployment")
        .map(|target| target.name.clone());
    let id = output.add_object(hpa);

    let Some(target_name) = target else {
        return Ok(());
    };
    let Some(deployment) = ctx
        .get_reference::<Deployment>(&namespace, &target_name)
        .await?
    else {
        return Ok(());
    };
    let deployment_id = output.add_object(deployment);
    output.graph().add_relationship(Relationship::new(
        id,
        deployment_id,
        RelationshipKind::Targets,
        scale_summary(min, max),
    ));
    Ok(())
}
