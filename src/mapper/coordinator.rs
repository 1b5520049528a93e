//! Discovery coordinator
//!
//! Resolves target namespaces, runs every kind processor per namespace and
//! merges their buffers into one graph. Failures are contained: a list failure
//! drops one kind in one namespace, anything else drops that namespace, and
//! the run itself only fails on cancellation.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::context::ProcessContext;
use super::processors::{KindProcessor, ProcessorFactory, default_factory};
use crate::error::{DiscoveryWarning, MapperError, ProcessError, ProviderError};
use crate::graph::ResourceGraph;
use crate::kube::ClusterProvider;
use crate::models::{Resource, ResourceId, ResourceKind, ResourceStatus};

/// Tuning knobs for a discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Namespaces discovered at the same time
    pub namespace_concurrency: usize,
    /// Drop a whole namespace on any list failure
    pub strict: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            namespace_concurrency: 4,
            strict: false,
        }
    }
}

/// Result of a run: the assembled graph plus downgraded failures
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub graph: ResourceGraph,
    pub warnings: Vec<DiscoveryWarning>,
}

struct NamespaceOutcome {
    namespace: String,
    graph: Option<ResourceGraph>,
    warnings: Vec<DiscoveryWarning>,
}

pub struct DiscoveryCoordinator {
    provider: Arc<dyn ClusterProvider>,
    token: CancellationToken,
    options: DiscoveryOptions,
    factory: ProcessorFactory,
}

impl DiscoveryCoordinator {
    pub fn new(
        provider: Arc<dyn ClusterProvider>,
        token: CancellationToken,
        options: DiscoveryOptions,
    ) -> Self {
        Self {
            provider,
            token,
            options,
            factory: default_factory(),
        }
    }

    /// Replace the processor set built for each namespace
    pub fn with_processors(mut self, factory: ProcessorFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Namespaces to discover, sorted
    ///
    /// An explicit namespace must exist and is returned alone. Otherwise every
    /// listed namespace not in `excluded` is returned.
    pub async fn resolve_namespaces(
        &self,
        explicit: Option<&str>,
        excluded: &[String],
    ) -> Result<Vec<String>, MapperError> {
        if let Some(namespace) = explicit {
            let lookup = tokio::select! {
                _ = self.token.cancelled() => return Err(MapperError::Cancelled),
                result = self.provider.get(ResourceKind::Namespace, "", namespace) => result,
            };
            return match lookup {
                Ok(_) => Ok(vec![namespace.to_string()]),
                Err(ProviderError::NotFound { .. }) => {
                    Err(MapperError::NamespaceNotFound(namespace.to_string()))
                }
                Err(ProviderError::Cancelled) => Err(MapperError::Cancelled),
                Err(err) => Err(MapperError::Connectivity(err.to_string())),
            };
        }

        let listed = tokio::select! {
            _ = self.token.cancelled() => return Err(MapperError::Cancelled),
            result = self.provider.list_namespaces() => result,
        };
        let mut namespaces = match listed {
            Ok(namespaces) => namespaces,
            Err(ProviderError::Cancelled) => return Err(MapperError::Cancelled),
            Err(err) => return Err(MapperError::Connectivity(err.to_string())),
        };

        let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
        namespaces.retain(|ns| !excluded.contains(ns.as_str()));
        namespaces.sort();
        namespaces.dedup();
        tracing::info!(count = namespaces.len(), "Resolved namespaces");
        Ok(namespaces)
    }

    /// Resolve namespaces, then run discovery over them
    pub async fn discover(
        &self,
        explicit: Option<&str>,
        excluded: &[String],
    ) -> Result<DiscoveryReport, MapperError> {
        let namespaces = self.resolve_namespaces(explicit, excluded).await?;
        self.run(&namespaces).await
    }

    /// Discover every namespace and assemble the graph
    pub async fn run(&self, namespaces: &[String]) -> Result<DiscoveryReport, MapperError> {
        let concurrency = self.options.namespace_concurrency.max(1);
        let outcomes: Vec<Result<NamespaceOutcome, MapperError>> =
            futures::stream::iter(namespaces.iter().cloned())
                .map(|namespace| async move { self.discover_namespace(namespace).await })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        let mut outcomes = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;
        if self.token.is_cancelled() {
            return Err(MapperError::Cancelled);
        }
        outcomes.sort_by(|a, b| a.namespace.cmp(&b.namespace));

        let graph = ResourceGraph::new();
        let mut warnings = Vec::new();
        for outcome in outcomes {
            if let Some(namespace_graph) = outcome.graph {
                graph.merge(&namespace_graph);
            }
            warnings.extend(outcome.warnings);
        }
        warnings.sort();

        tracing::info!(
            resources = graph.resource_count(),
            relationships = graph.relationship_count(),
            warnings = warnings.len(),
            "Discovery complete"
        );
        Ok(DiscoveryReport { graph, warnings })
    }

    async fn discover_namespace(&self, namespace: String) -> Result<NamespaceOutcome, MapperError> {
        tracing::info!(namespace = %namespace, "Discovering namespace");
        let ctx = ProcessContext::new(self.provider.clone(), self.token.clone());
        let processors = (self.factory)(&ctx);

        let mut group = ctx.task_group();
        for processor in &processors {
            let processor: Arc<dyn KindProcessor> = processor.clone();
            let namespace = namespace.clone();
            group.spawn(async move {
                let kind = processor.kind();
                Ok((kind, processor.process(&namespace).await))
            });
        }
        let results = group.join().await.map_err(|_| MapperError::Cancelled)?;

        let mut warnings = Vec::new();
        let mut failed_kinds = HashSet::new();
        let mut fatal = Vec::new();
        for result in results {
            match result {
                Ok((_, Ok(()))) => {}
                Ok((_, Err(ProcessError::Cancelled))) | Err(ProcessError::Cancelled) => {
                    return Err(MapperError::Cancelled);
                }
                Ok((kind, Err(ProcessError::ListFailure { source, .. }))) if !self.options.strict => {
                    tracing::warn!(namespace = %namespace, %kind, error = %source, "Kind skipped");
                    warnings.push(DiscoveryWarning::for_kind(&namespace, kind, source.to_string()));
                    failed_kinds.insert(kind);
                }
                Ok((_, Err(err))) | Err(err) => fatal.push(err.to_string()),
            }
        }

        if !fatal.is_empty() {
            fatal.sort();
            let message = fatal.join("; ");
            tracing::warn!(namespace = %namespace, error = %message, "Namespace skipped");
            return Ok(NamespaceOutcome {
                warnings: vec![DiscoveryWarning::for_namespace(&namespace, message)],
                namespace,
                graph: None,
            });
        }

        let graph = ResourceGraph::new();
        graph.add_resource(
            Resource::new(ResourceId::new(ResourceKind::Namespace, "", &namespace))
                .with_status(ResourceStatus::new("Active", true, "")),
        );
        // A kind that failed to list contributes nothing, including the
        // objects other processors fetched as references.
        let failed = |id: &ResourceId| failed_kinds.contains(&id.kind);
        for processor in processors
            .iter()
            .filter(|p| !failed_kinds.contains(&p.kind()))
        {
            graph.extend(
                processor.resources().into_iter().filter(|r| !failed(&r.id)),
                processor
                    .relationships()
                    .into_iter()
                    .filter(|rel| !failed(&rel.source) && !failed(&rel.target)),
            );
        }

        Ok(NamespaceOutcome {
            namespace,
            graph: Some(graph),
            warnings,
        })
    }
}
