//! Kind processors
//!
//! One processor per primary kind. `process` lists the primary kind in one
//! namespace, fans out one task per item and, inside each item, one subtask per
//! relationship rule. Each processor writes into its own buffer graph; the
//! coordinator merges buffers once every processor of the namespace has been
//! joined.

mod autoscaler;
mod configmap;
mod deployment;
mod ingress;
mod service;

pub use autoscaler::AutoscalerProcessor;
pub use configmap::ConfigMapProcessor;
pub use deployment::DeploymentProcessor;
pub use ingress::IngressProcessor;
pub use service::ServiceProcessor;

use std::sync::Arc;

use async_trait::async_trait;

use super::context::ProcessContext;
use crate::error::ProcessError;
use crate::graph::ResourceGraph;
use crate::models::{KindObject, Relationship, Resource, ResourceId, ResourceKind};

/// Discovery and inference for one primary kind
#[async_trait]
pub trait KindProcessor: Send + Sync {
    /// Primary kind listed by this processor
    fn kind(&self) -> ResourceKind;

    /// Discover the primary kind in `namespace` plus its immediate neighbors
    ///
    /// Only a failure to list the primary kind is returned as an error.
    async fn process(&self, namespace: &str) -> Result<(), ProcessError>;

    /// Resources found so far
    fn resources(&self) -> Vec<Resource>;

    /// Relationships found so far
    fn relationships(&self) -> Vec<Relationship>;
}

/// Builds the processors for one namespace
pub type ProcessorFactory =
    Arc<dyn Fn(&ProcessContext) -> Vec<Arc<dyn KindProcessor>> + Send + Sync>;

/// Every built-in processor, in merge order
///
/// Resources deduplicate first-wins on merge, so the Service processor runs
/// ahead of the Ingress processor to keep its endpoint details.
pub fn default_processors(ctx: &ProcessContext) -> Vec<Arc<dyn KindProcessor>> {
    vec![
        Arc::new(DeploymentProcessor::new(ctx.clone())),
        Arc::new(ServiceProcessor::new(ctx.clone())),
        Arc::new(IngressProcessor::new(ctx.clone())),
        Arc::new(ConfigMapProcessor::new(ctx.clone())),
        Arc::new(AutoscalerProcessor::new(ctx.clone())),
    ]
}

pub fn default_factory() -> ProcessorFactory {
    Arc::new(default_processors)
}

/// Buffer graph shared by a processor and its spawned tasks
#[derive(Clone, Default)]
pub(crate) struct ProcessorOutput {
    graph: ResourceGraph,
}

impl ProcessorOutput {
    pub(crate) fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// Insert a typed object, returning its identity
    pub(crate) fn add_object<T: KindObject>(&self, obj: Arc<T>) -> ResourceId {
        let resource = Resource::from_object(obj);
        let id = resource.id.clone();
        self.graph.add_resource(resource);
        id
    }

    pub(crate) fn resources(&self) -> Vec<Resource> {
        self.graph.all_resources()
    }

    pub(crate) fn relationships(&self) -> Vec<Relationship> {
        self.graph.all_relationships()
    }
}
