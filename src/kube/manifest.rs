//! Offline provider backed by YAML manifests
//!
//! Loads multi-document YAML (including `kind: List` wrappers) into typed
//! objects so discovery can run without a cluster. Documents of kinds the
//! mapper does not know are ignored. Namespaced objects without a namespace
//! land in `default`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;
use serde_json::Value;

use super::provider::ClusterProvider;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{ResourceKind, ResourcePayload};

const DEFAULT_NAMESPACE: &str = "default";

/// `ClusterProvider` over objects loaded from manifests
#[derive(Debug, Clone, Default)]
pub struct ManifestProvider {
    /// `(kind, namespace)` to objects keyed by name
    objects: BTreeMap<(ResourceKind, String), BTreeMap<String, ResourcePayload>>,
    namespaces: BTreeSet<String>,
}

impl ManifestProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every manifest document from a file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse manifest file: {}", path.display()))
    }

    /// Load every document of a multi-document YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut provider = Self::new();
        for (index, document) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
            let value = Value::deserialize(document)
                .with_context(|| format!("Invalid YAML in document {}", index + 1))?;
            provider
                .push_value(value)
                .with_context(|| format!("Invalid object in document {}", index + 1))?;
        }
        tracing::debug!(
            namespaces = provider.namespaces.len(),
            "Loaded manifest objects"
        );
        Ok(provider)
    }

    fn push_value(&mut self, mut value: Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }

        let kind_name = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if kind_name == "List" {
            if let Some(Value::Array(items)) = value.get_mut("items").map(Value::take) {
                for item in items {
                    self.push_value(item)?;
                }
            }
            return Ok(());
        }

        let Some(kind) = ResourceKind::parse_optional(&kind_name) else {
            tracing::debug!(kind = %kind_name, "Ignoring manifest document of unknown kind");
            return Ok(());
        };

        if !kind.is_cluster_scoped() {
            default_namespace(&mut value);
        }

        let payload = ResourcePayload::from_json(kind, value)
            .with_context(|| format!("Failed to decode {}", kind))?;
        self.insert(payload);
        Ok(())
    }

    /// Add one object, replacing any earlier object with the same identity
    pub fn insert(&mut self, payload: ResourcePayload) {
        let kind = payload.kind();
        let (name, namespace) = payload.name_and_namespace();

        if kind == ResourceKind::Namespace {
            self.namespaces.insert(name.clone());
        } else if !namespace.is_empty() {
            self.ensure_namespace(&namespace);
        }

        self.objects
            .entry((kind, namespace))
            .or_default()
            .insert(name, payload);
    }

    /// Register a namespace implied by an object inside it
    fn ensure_namespace(&mut self, namespace: &str) {
        if !self.namespaces.insert(namespace.to_string()) {
            return;
        }
        let implied = Namespace {
            metadata: ObjectMeta {
                name: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.objects
            .entry((ResourceKind::Namespace, String::new()))
            .or_default()
            .entry(namespace.to_string())
            .or_insert_with(|| ResourcePayload::Namespace(Arc::new(implied)));
    }

    fn scope(kind: ResourceKind, namespace: &str) -> String {
        if kind.is_cluster_scoped() {
            String::new()
        } else {
            namespace.to_string()
        }
    }
}

fn default_namespace(value: &mut Value) {
    let Some(Value::Object(metadata)) = value.get_mut("metadata") else {
        return;
    };
    let missing = metadata
        .get("namespace")
        .and_then(Value::as_str)
        .is_none_or(str::is_empty);
    if missing {
        metadata.insert(
            "namespace".to_string(),
            Value::String(DEFAULT_NAMESPACE.to_string()),
        );
    }
}

#[async_trait]
impl ClusterProvider for ManifestProvider {
    async fn list_namespaces(&self) -> ProviderResult<Vec<String>> {
        Ok(self.namespaces.iter().cloned().collect())
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
    ) -> ProviderResult<Vec<ResourcePayload>> {
        Ok(self
            .objects
            .get(&(kind, Self::scope(kind, namespace)))
            .map(|objects| objects.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> ProviderResult<ResourcePayload> {
        self.objects
            .get(&(kind, Self::scope(kind, namespace)))
            .and_then(|objects| objects.get(name))
            .cloned()
            .ok_or_else(|| ProviderError::not_found(kind, namespace, name))
    }
}
