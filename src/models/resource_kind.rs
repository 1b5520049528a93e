//! Resource and relationship kind definitions
//!
//! Centralizes the Kubernetes kinds the mapper understands so that kind names
//! are never hardcoded as strings across processors and the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumeration of the Kubernetes kinds discovered by the mapper
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ResourceKind {
    Namespace,
    Pod,
    Service,
    Endpoints,
    Ingress,
    ConfigMap,
    Deployment,
    HorizontalPodAutoscaler,
    Secret,
    IngressClass,
}

impl ResourceKind {
    /// Get the Kubernetes kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Pod => "Pod",
            ResourceKind::Service => "Service",
            ResourceKind::Endpoints => "Endpoints",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            ResourceKind::Secret => "Secret",
            ResourceKind::IngressClass => "IngressClass",
        }
    }

    /// Try to parse a string into a ResourceKind, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Cluster-scoped kinds carry an empty namespace
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(self, ResourceKind::Namespace | ResourceKind::IngressClass)
    }

    /// Get all resource kinds
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Namespace,
            ResourceKind::Pod,
            ResourceKind::Service,
            ResourceKind::Endpoints,
            ResourceKind::Ingress,
            ResourceKind::ConfigMap,
            ResourceKind::Deployment,
            ResourceKind::HorizontalPodAutoscaler,
            ResourceKind::Secret,
            ResourceKind::IngressClass,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}

/// Type of a directed relationship between two resources
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// Deployment owns the Pods its selector matches
    Owns,
    /// Workload or Ingress uses a ConfigMap, Secret or IngressClass
    Uses,
    /// Ingress exposes a Service
    Exposes,
    /// Service or autoscaler targets a Pod or Deployment
    Targets,
    Provides,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Owns => "owns",
            RelationshipKind::Uses => "uses",
            RelationshipKind::Exposes => "exposes",
            RelationshipKind::Targets => "targets",
            RelationshipKind::Provides => "provides",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
