//! ConfigMap reference scanning
//!
//! Walks a pod spec for the three ways a ConfigMap can be consumed: a volume,
//! a container `envFrom` source and a per-key environment variable. Init
//! containers count like regular containers.

use std::collections::{BTreeMap, BTreeSet};

use k8s_openapi::api::core::v1::PodSpec;

/// How a ConfigMap is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UsageMode {
    Volume,
    Environment,
    EnvironmentVariable,
}

impl UsageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageMode::Volume => "volume",
            UsageMode::Environment => "environment",
            UsageMode::EnvironmentVariable => "environment variable",
        }
    }
}

/// ConfigMap name to the distinct usage modes that reference it
pub type ConfigMapUsage = BTreeMap<String, BTreeSet<UsageMode>>;

/// Scan a pod spec
pub fn config_map_usage(spec: &PodSpec) -> ConfigMapUsage {
    let mut usage = ConfigMapUsage::new();

    for volume in spec.volumes.iter().flatten() {
        if let Some(source) = &volume.config_map {
            record(&mut usage, &source.name, UsageMode::Volume);
        }
        let projections = volume
            .projected
            .as_ref()
            .and_then(|projected| projected.sources.as_ref());
        for projection in projections.into_iter().flatten() {
            if let Some(source) = &projection.config_map {
                record(&mut usage, &source.name, UsageMode::Volume);
            }
        }
    }

    let containers = spec
        .containers
        .iter()
        .chain(spec.init_containers.iter().flatten());
    for container in containers {
        for source in container.env_from.iter().flatten() {
            if let Some(config_map) = &source.config_map_ref {
                record(&mut usage, &config_map.name, UsageMode::Environment);
            }
        }
        for var in container.env.iter().flatten() {
            let key_ref = var
                .value_from
                .as_ref()
                .and_then(|from| from.config_map_key_ref.as_ref());
            if let Some(key_ref) = key_ref {
                record(&mut usage, &key_ref.name, UsageMode::EnvironmentVariable);
            }
        }
    }

    usage
}

/// Usage modes as lexicographically sorted, comma-joined tokens
pub fn describe_usage(modes: &BTreeSet<UsageMode>) -> String {
    let mut tokens: Vec<&str> = modes.iter().map(UsageMode::as_str).collect();
    tokens.sort_unstable();
    tokens.join(", ")
}

fn record(usage: &mut ConfigMapUsage, name: &str, mode: UsageMode) {
    if name.is_empty() {
        return;
    }
    usage.entry(name.to_string()).or_default().insert(mode);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod_spec(value: serde_json::Value) -> PodSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_all_three_modes_collapse_into_one_entry() {
        let spec = pod_spec(json!({
            "volumes": [{ "name": "cfg", "configMap": { "name": "app-config" } }],
            "containers": [{
                "name": "app",
                "envFrom": [{ "configMapRef": { "name": "app-config" } }],
                "env": [{
                    "name": "MODE",
                    "valueFrom": { "configMapKeyRef": { "name": "app-config", "key": "mode" } }
                }]
            }]
        }));

        let usage = config_map_usage(&spec);
        assert_eq!(usage.len(), 1);
        assert_eq!(
            describe_usage(&usage["app-config"]),
            "environment, environment variable, volume"
        );
    }

    #[test]
    fn test_init_containers_and_projected_volumes() {
        let spec = pod_spec(json!({
            "volumes": [{
                "name": "bundle",
                "projected": { "sources": [{ "configMap": { "name": "ca-bundle" } }] }
            }],
            "containers": [{ "name": "app" }],
            "initContainers": [{
                "name": "migrate",
                "envFrom": [{ "configMapRef": { "name": "db-config" } }]
            }]
        }));

        let usage = config_map_usage(&spec);
        assert_eq!(describe_usage(&usage["ca-bundle"]), "volume");
        assert_eq!(describe_usage(&usage["db-config"]), "environment");
    }

    #[test]
    fn test_secret_references_are_ignored() {
        let spec = pod_spec(json!({
            "volumes": [{ "name": "tls", "secret": { "secretName": "tls" } }],
            "containers": [{
                "name": "app",
                "envFrom": [{ "secretRef": { "name": "creds" } }],
                "env": [{ "name": "PLAIN", "value": "1" }]
            }]
        }));

        assert!(config_map_usage(&spec).is_empty());
    }

    #[test]
    fn test_empty_names_are_ignored() {
        let spec = pod_spec(json!({
            "volumes": [{ "name": "cfg", "configMap": {} }],
            "containers": [{
                "name": "app",
                "env": [{
                    "name": "A",
                    "valueFrom": { "configMapKeyRef": { "name": "", "key": "a" } }
                }]
            }]
        }));

        assert!(config_map_usage(&spec).is_empty());
    }
}
