//! Normalized status summaries
//!
//! Each discovered object is reduced to a `{phase, ready, details}` triple when
//! it enters the graph. The raw object stays available through the payload.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Endpoints, Namespace, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass};
use serde::Serialize;

/// Normalized summary of an object's state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceStatus {
    pub phase: String,
    pub ready: bool,
    pub details: String,
}

impl ResourceStatus {
    pub fn new(phase: impl Into<String>, ready: bool, details: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            ready,
            details: details.into(),
        }
    }

    /// Append a detail fragment, comma-separated from any existing details
    pub fn push_detail(&mut self, detail: impl AsRef<str>) {
        let detail = detail.as_ref();
        if detail.is_empty() {
            return;
        }
        if !self.details.is_empty() {
            self.details.push_str(", ");
        }
        self.details.push_str(detail);
    }
}

/// Replica readiness classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    PartiallyReady,
    NotReady,
}

impl Readiness {
    /// Classify ready replicas against the desired count
    ///
    /// `desired == 0` counts as fully ready. More ready than desired happens
    /// mid-rollout and counts as ready as well.
    pub fn from_replicas(ready: i32, desired: i32) -> Self {
        if desired == 0 || ready >= desired {
            Readiness::Ready
        } else if ready > 0 {
            Readiness::PartiallyReady
        } else {
            Readiness::NotReady
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::Ready => "Ready",
            Readiness::PartiallyReady => "PartiallyReady",
            Readiness::NotReady => "NotReady",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Format a replica count as `"<ready>/<desired> replicas ready"`
pub fn replica_summary(ready: i32, desired: i32) -> String {
    format!("{}/{} replicas ready", ready, desired)
}

/// Format autoscaler bounds as `"scales <min>-<max> replicas"`
pub fn scale_summary(min: i32, max: i32) -> String {
    format!("scales {}-{} replicas", min, max)
}

/// Ready and desired replica counts of a Deployment (desired defaults to 1)
pub fn deployment_replicas(deployment: &Deployment) -> (i32, i32) {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(1);
    let ready = deployment
        .status
        .as_ref()
        .and_then(|status| status.ready_replicas)
        .unwrap_or(0);
    (ready, desired)
}

/// Min and max replica bounds of an autoscaler (min defaults to 1)
pub fn autoscaler_bounds(hpa: &HorizontalPodAutoscaler) -> (i32, i32) {
    match hpa.spec.as_ref() {
        Some(spec) => (spec.min_replicas.unwrap_or(1), spec.max_replicas),
        None => (1, 0),
    }
}

/// Whether the Pod reports a `Ready` condition with status `True`
pub fn pod_is_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
        .unwrap_or(false)
}

/// Number of ready addresses across all subsets of an Endpoints object
pub fn active_endpoints(endpoints: &Endpoints) -> usize {
    endpoints
        .subsets
        .as_ref()
        .map(|subsets| {
            subsets
                .iter()
                .map(|s| s.addresses.as_ref().map(Vec::len).unwrap_or(0))
                .sum()
        })
        .unwrap_or(0)
}

/// Capability to reduce an object to its normalized status
pub trait Summarize {
    fn summarize(&self) -> ResourceStatus;
}

impl Summarize for Deployment {
    fn summarize(&self) -> ResourceStatus {
        let (ready, desired) = deployment_replicas(self);
        let readiness = Readiness::from_replicas(ready, desired);
        ResourceStatus::new(
            readiness.as_str(),
            readiness.is_ready(),
            replica_summary(ready, desired),
        )
    }
}

impl Summarize for Pod {
    fn summarize(&self) -> ResourceStatus {
        let phase = self
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let ready = pod_is_ready(self);
        let details = if ready { "Ready" } else { "Not Ready" };
        ResourceStatus::new(phase, ready, details)
    }
}

impl Summarize for Service {
    fn summarize(&self) -> ResourceStatus {
        let Some(spec) = self.spec.as_ref() else {
            return ResourceStatus::new("Active", true, "");
        };
        match spec.type_.as_deref().unwrap_or("ClusterIP") {
            "NodePort" => {
                let node_ports: Vec<String> = spec
                    .ports
                    .iter()
                    .flatten()
                    .filter_map(|p| p.node_port)
                    .map(|p| p.to_string())
                    .collect();
                ResourceStatus::new(
                    "Active",
                    true,
                    format!("NodePorts: {}", node_ports.join(", ")),
                )
            }
            "LoadBalancer" => {
                let addresses: Vec<String> = self
                    .status
                    .as_ref()
                    .and_then(|s| s.load_balancer.as_ref())
                    .and_then(|lb| lb.ingress.as_ref())
                    .map(|ingress| {
                        ingress
                            .iter()
                            .filter_map(|i| i.ip.clone().or_else(|| i.hostname.clone()))
                            .collect()
                    })
                    .unwrap_or_default();
                if addresses.is_empty() {
                    ResourceStatus::new("Pending", false, "Waiting for LoadBalancer")
                } else {
                    ResourceStatus::new(
                        "Active",
                        true,
                        format!("LoadBalancer: {}", addresses.join(", ")),
                    )
                }
            }
            "ExternalName" => ResourceStatus::new(
                "Active",
                true,
                format!(
                    "ExternalName: {}",
                    spec.external_name.as_deref().unwrap_or_default()
                ),
            ),
            _ => ResourceStatus::new(
                "Active",
                true,
                format!(
                    "ClusterIP: {}",
                    spec.cluster_ip.as_deref().unwrap_or("None")
                ),
            ),
        }
    }
}

impl Summarize for Endpoints {
    fn summarize(&self) -> ResourceStatus {
        let active = active_endpoints(self);
        ResourceStatus::new("Active", active > 0, format!("{} active", active))
    }
}

impl Summarize for Ingress {
    fn summarize(&self) -> ResourceStatus {
        let mut status = ResourceStatus::new("Active", true, "");
        let tls_enabled = self
            .spec
            .as_ref()
            .and_then(|spec| spec.tls.as_ref())
            .is_some_and(|tls| !tls.is_empty());
        if tls_enabled {
            status.push_detail("TLS Enabled");
        }

        let addresses: Vec<String> = self
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .map(|ingress| {
                ingress
                    .iter()
                    .filter_map(|i| i.ip.clone().or_else(|| i.hostname.clone()))
                    .collect()
            })
            .unwrap_or_default();
        if !addresses.is_empty() {
            status.push_detail(format!("LoadBalancer: {}", addresses.join(", ")));
        }
        status
    }
}

impl Summarize for ConfigMap {
    fn summarize(&self) -> ResourceStatus {
        ResourceStatus::new("Active", true, format!("Keys: {}", config_map_keys(self)))
    }
}

impl Summarize for HorizontalPodAutoscaler {
    fn summarize(&self) -> ResourceStatus {
        let (min, max) = autoscaler_bounds(self);
        let current = self
            .status
            .as_ref()
            .and_then(|s| s.current_replicas)
            .unwrap_or(0);
        let mut status = ResourceStatus::new("Active", true, scale_summary(min, max));
        status.push_detail(format!("current {}", current));
        status
    }
}

impl Summarize for Secret {
    fn summarize(&self) -> ResourceStatus {
        ResourceStatus::new(
            "Active",
            true,
            format!("Type: {}", self.type_.as_deref().unwrap_or("Opaque")),
        )
    }
}

impl Summarize for IngressClass {
    fn summarize(&self) -> ResourceStatus {
        ResourceStatus::new(
            "Active",
            true,
            format!("Controller: {}", ingress_class_controller(self)),
        )
    }
}

impl Summarize for Namespace {
    fn summarize(&self) -> ResourceStatus {
        let phase = self
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Active".to_string());
        let ready = phase == "Active";
        ResourceStatus::new(phase, ready, "")
    }
}

/// Number of keys across `data` and `binaryData`
pub fn config_map_keys(cm: &ConfigMap) -> usize {
    cm.data.as_ref().map(|d| d.len()).unwrap_or(0)
        + cm.binary_data.as_ref().map(|d| d.len()).unwrap_or(0)
}

/// Controller identifier of an IngressClass, empty when unset
pub fn ingress_class_controller(class: &IngressClass) -> String {
    class
        .spec
        .as_ref()
        .and_then(|spec| spec.controller.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_readiness_classification() {
        assert_eq!(Readiness::from_replicas(0, 0), Readiness::Ready);
        assert_eq!(Readiness::from_replicas(2, 2), Readiness::Ready);
        assert_eq!(Readiness::from_replicas(1, 3), Readiness::PartiallyReady);
        assert_eq!(Readiness::from_replicas(0, 3), Readiness::NotReady);
        assert_eq!(Readiness::from_replicas(4, 3), Readiness::Ready);
    }

    #[test]
    fn test_deployment_summary_defaults_desired_to_one() {
        let deployment: Deployment = from_json(json!({
            "metadata": { "name": "web" },
            "spec": {
                "selector": { "matchLabels": { "app": "web" } },
                "template": {}
            }
        }));

        let status = deployment.summarize();
        assert_eq!(status.phase, "NotReady");
        assert!(!status.ready);
        assert_eq!(status.details, "0/1 replicas ready");
    }

    #[test]
    fn test_pod_summary_uses_ready_condition() {
        let pod: Pod = from_json(json!({
            "metadata": { "name": "web-1" },
            "status": {
                "phase": "Running",
                "conditions": [{ "type": "Ready", "status": "True" }]
            }
        }));

        let status = pod.summarize();
        assert_eq!(status.phase, "Running");
        assert!(status.ready);
    }

    #[test]
    fn test_pending_load_balancer_service() {
        let service: Service = from_json(json!({
            "metadata": { "name": "edge" },
            "spec": { "type": "LoadBalancer", "ports": [{ "port": 80 }] }
        }));

        let status = service.summarize();
        assert_eq!(status.phase, "Pending");
        assert!(!status.ready);
        assert_eq!(status.details, "Waiting for LoadBalancer");
    }

    #[test]
    fn test_node_port_service() {
        let service: Service = from_json(json!({
            "metadata": { "name": "np" },
            "spec": {
                "type": "NodePort",
                "ports": [
                    { "port": 80, "nodePort": 30080 },
                    { "port": 443, "nodePort": 30443 }
                ]
            }
        }));

        assert_eq!(service.summarize().details, "NodePorts: 30080, 30443");
    }

    #[test]
    fn test_ingress_summary_reports_tls_and_addresses() {
        let ingress: Ingress = from_json(json!({
            "metadata": { "name": "web" },
            "spec": { "tls": [{ "hosts": ["a.example.com"], "secretName": "tls" }] },
            "status": { "loadBalancer": { "ingress": [{ "ip": "203.0.113.7" }] } }
        }));

        assert_eq!(
            ingress.summarize().details,
            "TLS Enabled, LoadBalancer: 203.0.113.7"
        );
    }

    #[test]
    fn test_config_map_counts_binary_keys() {
        let cm: ConfigMap = from_json(json!({
            "metadata": { "name": "settings" },
            "data": { "a": "1", "b": "2" },
            "binaryData": { "blob": "AAEC" }
        }));

        assert_eq!(cm.summarize().details, "Keys: 3");
    }

    #[test]
    fn test_autoscaler_min_defaults_to_one() {
        let hpa: HorizontalPodAutoscaler = from_json(json!({
            "metadata": { "name": "web" },
            "spec": {
                "maxReplicas": 5,
                "scaleTargetRef": { "kind": "Deployment", "name": "web" }
            }
        }));

        assert_eq!(autoscaler_bounds(&hpa), (1, 5));
    }
}
