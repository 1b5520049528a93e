//! Ingress processor
//!
//! Per Ingress: backend Services (one edge per path occurrence plus the
//! default backend), TLS Secrets and the IngressClass.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Secret, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass};

use super::{KindProcessor, ProcessorOutput};
use crate::error::ProcessError;
use crate::mapper::context::ProcessContext;
use crate::mapper::tasks::settle;
use crate::models::status::ingress_class_controller;
use crate::models::{Relationship, RelationshipKind, Resource, ResourceId, ResourceKind};

const DEFAULT_BACKEND: &str = "default backend";

pub struct IngressProcessor {
    ctx: ProcessContext,
    output: ProcessorOutput,
}

impl IngressProcessor {
    pub fn new(ctx: ProcessContext) -> Self {
        Self {
            ctx,
            output: ProcessorOutput::default(),
        }
    }
}

#[async_trait]
impl KindProcessor for IngressProcessor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Ingress
    }

    async fn process(&self, namespace: &str) -> Result<(), ProcessError> {
        let ingresses = self
            .ctx
            .list::<Ingress>(namespace)
            .await
            .map_err(|e| ProcessError::list_failure(ResourceKind::Ingress, namespace, e))?;
        tracing::debug!(namespace, count = ingresses.len(), "Processing ingresses");

        let mut group = self.ctx.task_group();
        for ingress in ingresses {
            self.ctx.check_cancelled()?;
            let ctx = self.ctx.clone();
            let output = self.output.clone();
            let namespace = namespace.to_string();
            group.spawn(process_ingress(ctx, output, namespace, ingress));
        }
        settle(group.join().await?, "ingress")?;
        Ok(())
    }

    fn resources(&self) -> Vec<Resource> {
        self.output.resources()
    }

    fn relationships(&self) -> Vec<Relationship> {
        self.output.relationships()
    }
}

/// Every `(service name, description)` routing occurrence, in declaration order
pub fn backend_routes(ingress: &Ingress) -> Vec<(String, String)> {
    let Some(spec) = ingress.spec.as_ref() else {
        return Vec::new();
    };

    let mut routes = Vec::new();
    for rule in spec.rules.iter().flatten() {
        let host = rule.host.as_deref().unwrap_or_default();
        for path in rule.http.iter().flat_map(|http| http.paths.iter()) {
            if let Some(service) = path.backend.service.as_ref() {
                let path_value = path.path.as_deref().unwrap_or("/");
                routes.push((service.name.clone(), format!("{}{}", host, path_value)));
            }
        }
    }
    if let Some(service) = spec
        .default_backend
        .as_ref()
        .and_then(|backend| backend.service.as_ref())
    {
        routes.push((service.name.clone(), DEFAULT_BACKEND.to_string()));
    }
    routes
}

async fn process_ingress(
    ctx: ProcessContext,
    output: ProcessorOutput,
    namespace: String,
    ingress: Arc<Ingress>,
) -> Result<(), ProcessError> {
    let id = output.add_object(ingress.clone());

    let mut rules = ctx.task_group();
    rules.spawn(exposed_services(
        ctx.clone(),
        output.clone(),
        namespace.clone(),
        id.clone(),
        ingress.clone(),
    ));
    rules.spawn(tls_secrets(
        ctx.clone(),
        output.clone(),
        namespace.clone(),
        id.clone(),
        ingress.clone(),
    ));
    rules.spawn(ingress_class(ctx.clone(), output, id, ingress));
    settle(rules.join().await?, "ingress rule")?;
    Ok(())
}

async fn exposed_services(
    ctx: ProcessContext,
    output: ProcessorOutput,
    namespace: String,
    id: ResourceId,
    ingress: Arc<Ingress>,
) -> Result<(), ProcessError> {
    let mut resolved: HashMap<String, Option<ResourceId>> = HashMap::new();
    for (service_name, description) in backend_routes(&ingress) {
        ctx.check_cancelled()?;
        let target = match resolved.get(&service_name) {
            Some(target) => target.clone(),
            None => {
                let target = ctx
                    .get_reference::<Service>(&namespace, &service_name)
                    .await?
                    .map(|service| output.add_object(service));
                resolved.insert(service_name, target.clone());
                target
            }
        };
        if let Some(target) = target {
            output.graph().add_relationship(Relationship::new(
                id.clone(),
                target,
                RelationshipKind::Exposes,
                description,
            ));
        }
    }
    Ok(())
}

async fn tls_secrets(
    ctx: ProcessContext,
    output: ProcessorOutput,
    namespace: String,
    id: ResourceId,
    ingress: Arc<Ingress>,
) -> Result<(), ProcessError> {
    let entries = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.tls.clone())
        .unwrap_or_default();

    for entry in entries {
        ctx.check_cancelled()?;
        let Some(secret_name) = entry.secret_name.filter(|name| !name.is_empty()) else {
            continue;
        };
        let Some(secret) = ctx.get_reference::<Secret>(&namespace, &secret_name).await? else {
            continue;
        };
        let hosts = entry.hosts.unwrap_or_default().join(", ");
        let secret_id = output.add_object(secret);
        output.graph().add_relationship(Relationship::new(
            id.clone(),
            secret_id,
            RelationshipKind::Uses,
            hosts,
        ));
    }
    Ok(())
}

async fn ingress_class(
    ctx: ProcessContext,
    output: ProcessorOutput,
    id: ResourceId,
    ingress: Arc<Ingress>,
) -> Result<(), ProcessError> {
    let Some(class_name) = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.ingress_class_name.clone())
        .filter(|name| !name.is_empty())
    else {
        return Ok(());
    };

    let Some(class) = ctx.get_reference::<IngressClass>("", &class_name).await? else {
        return Ok(());
    };
    let controller = ingress_class_controller(&class);
    let class_id = output.add_object(class);
    output.graph().add_relationship(Relationship::new(
        id,
        class_id,
        RelationshipKind::Uses,
        controller,
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_routes_keep_every_occurrence() {
        let ingress: Ingress = serde_json::from_value(json!({
            "metadata": { "name": "web", "namespace": "default" },
            "spec": {
                "defaultBackend": { "service": { "name": "web-svc", "port": { "number": 80 } } },
                "rules": [{
                    "host": "app.example.com",
                    "http": { "paths": [
                        { "path": "/", "pathType": "Prefix",
                          "backend": { "service": { "name": "web-svc", "port": { "number": 80 } } } },
                        { "path": "/api", "pathType": "Prefix",
                          "backend": { "service": { "name": "web-svc", "port": { "number": 80 } } } }
                    ] }
                }]
            }
        }))
        .unwrap();

        assert_eq!(
            backend_routes(&ingress),
            vec![
                ("web-svc".to_string(), "app.example.com/".to_string()),
                ("web-svc".to_string(), "app.example.com/api".to_string()),
                ("web-svc".to_string(), "default backend".to_string()),
            ]
        );
    }
}
