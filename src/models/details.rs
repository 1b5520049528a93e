//! Renderer detail lines per resource kind

use std::collections::BTreeSet;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{
    ConfigMap, Endpoints, Namespace, Pod, Secret, Service, ServicePort,
};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;

use super::status::config_map_keys;

/// A labelled detail value shown beneath a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

impl DetailField {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Capability to expose kind-specific detail fields
///
/// Only layer resources (Ingress, Service, Deployment, ConfigMap) are drawn
/// with detail lines; every other kind keeps the empty default.
pub trait DetailFields {
    fn detail_fields(&self) -> Vec<DetailField> {
        Vec::new()
    }
}

/// Format one Service port as `"<port>→<targetPort>/<protocol>"`
///
/// Named target ports go through `resolve`; names it cannot resolve are shown
/// verbatim. An unset target port equals the service port.
pub fn format_service_port<F>(port: &ServicePort, resolve: F) -> String
where
    F: Fn(&str) -> Option<i32>,
{
    let target = match port.target_port.as_ref() {
        Some(IntOrString::Int(n)) => n.to_string(),
        Some(IntOrString::String(name)) => resolve(name)
            .map(|n| n.to_string())
            .unwrap_or_else(|| name.clone()),
        None => port.port.to_string(),
    };
    let protocol = port.protocol.as_deref().unwrap_or("TCP");
    format!("{}→{}/{}", port.port, target, protocol)
}

/// Format all ports of a Service in declared order, comma-joined
pub fn format_service_ports<F>(service: &Service, resolve: F) -> String
where
    F: Fn(&str) -> Option<i32>,
{
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .map(|ports| {
            ports
                .iter()
                .map(|p| format_service_port(p, &resolve))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

/// Resolve a named container port across all containers of a Pod
pub fn pod_named_port(pod: &Pod, name: &str) -> Option<i32> {
    let spec = pod.spec.as_ref()?;
    spec.containers
        .iter()
        .flat_map(|c| c.ports.iter().flatten())
        .find(|p| p.name.as_deref() == Some(name))
        .map(|p| p.container_port)
}

impl DetailFields for Deployment {
    fn detail_fields(&self) -> Vec<DetailField> {
        let images: Vec<String> = self
            .spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|pod| {
                pod.containers
                    .iter()
                    .filter_map(|c| c.image.clone())
                    .collect()
            })
            .unwrap_or_default();
        if images.is_empty() {
            Vec::new()
        } else {
            vec![DetailField::new("Images", images.join(", "))]
        }
    }
}

impl DetailFields for Service {
    fn detail_fields(&self) -> Vec<DetailField> {
        let service_type = self
            .spec
            .as_ref()
            .and_then(|spec| spec.type_.clone())
            .unwrap_or_else(|| "ClusterIP".to_string());
        let mut fields = vec![DetailField::new("Type", service_type)];
        let ports = format_service_ports(self, |_| None);
        if !ports.is_empty() {
            fields.push(DetailField::new("Ports", ports));
        }
        fields
    }
}

impl DetailFields for Ingress {
    fn detail_fields(&self) -> Vec<DetailField> {
        let mut seen = BTreeSet::new();
        let hosts: Vec<String> = self
            .spec
            .as_ref()
            .and_then(|spec| spec.rules.as_ref())
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(|r| r.host.clone())
                    .filter(|h| seen.insert(h.clone()))
                    .collect()
            })
            .unwrap_or_default();
        if hosts.is_empty() {
            Vec::new()
        } else {
            vec![DetailField::new("Hosts", hosts.join(", "))]
        }
    }
}

impl DetailFields for ConfigMap {
    fn detail_fields(&self) -> Vec<DetailField> {
        vec![DetailField::new("Keys", config_map_keys(self).to_string())]
    }
}

impl DetailFields for Pod {}
impl DetailFields for Endpoints {}
impl DetailFields for HorizontalPodAutoscaler {}
impl DetailFields for Secret {}
impl DetailFields for IngressClass {}
impl DetailFields for Namespace {}
