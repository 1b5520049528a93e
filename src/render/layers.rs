//! Layer contents for the text renderer
//!
//! Each layer maps its resources to child lines. Resources and relationships
//! come out of the graph already sorted, so the layout only depends on graph
//! contents.

use crate::graph::ResourceGraph;
use crate::models::{
    Relationship, RelationshipKind, Resource, ResourceId, ResourceKind, ResourceStatus,
};

use super::palette::Palette;

pub const ARROW: &str = "➜";
pub const BULLET: &str = "●";
pub const OK: &str = "✓";
pub const WARN: &str = "⚠";
pub const ERROR: &str = "✗";
pub const INFO: &str = "ℹ";
pub const SCALE: &str = "⟳";

/// The four fixed rendering groups, in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Ingress,
    Service,
    Workload,
    Storage,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Ingress, Layer::Service, Layer::Workload, Layer::Storage];

    pub fn title(&self) -> &'static str {
        match self {
            Layer::Ingress => "Ingress Layer",
            Layer::Service => "Service Layer",
            Layer::Workload => "Workload Layer",
            Layer::Storage => "Storage Layer",
        }
    }

    /// Kind whose resources form the layer's top-level entries
    pub fn kind(&self) -> ResourceKind {
        match self {
            Layer::Ingress => ResourceKind::Ingress,
            Layer::Service => ResourceKind::Service,
            Layer::Workload => ResourceKind::Deployment,
            Layer::Storage => ResourceKind::ConfigMap,
        }
    }
}

/// One line beneath a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub depth: usize,
    pub symbol: String,
    pub text: String,
}

impl Child {
    fn new(depth: usize, symbol: String, text: impl Into<String>) -> Self {
        Self {
            depth,
            symbol,
            text: text.into(),
        }
    }
}

pub struct LayerView<'a> {
    pub graph: &'a ResourceGraph,
    pub palette: Palette,
    pub show_details: bool,
}

impl LayerView<'_> {
    /// Child lines for one top-level resource of `layer`
    pub fn children(&self, layer: Layer, resource: &Resource) -> Vec<Child> {
        match layer {
            Layer::Ingress => self.ingress_children(resource),
            Layer::Service => self.service_children(resource),
            Layer::Workload => self.workload_children(resource),
            Layer::Storage => self.storage_children(resource),
        }
    }

    fn ingress_children(&self, ingress: &Resource) -> Vec<Child> {
        let mut children = Vec::new();
        if self.show_details {
            children.extend(self.detail_children(ingress));
            for rel in self.graph.relationships_from(&ingress.id, RelationshipKind::Uses) {
                match rel.target.kind {
                    ResourceKind::Secret => children.push(Child::new(
                        1,
                        self.palette.ok(OK),
                        with_note(format!("TLS {}", self.token(&rel.target)), &rel.description),
                    )),
                    ResourceKind::IngressClass => children.push(Child::new(
                        1,
                        self.palette.info(INFO),
                        with_note(format!("Class {}", self.token(&rel.target)), &rel.description),
                    )),
                    _ => {}
                }
            }
        }
        for rel in self.graph.relationships_from(&ingress.id, RelationshipKind::Exposes) {
            children.push(Child::new(
                1,
                ARROW.to_string(),
                format!("{} via {}", self.token(&rel.target), rel.description),
            ));
        }
        children
    }

    fn service_children(&self, service: &Resource) -> Vec<Child> {
        let mut children = Vec::new();
        if self.show_details {
            children.extend(self.detail_children(service));
            if !service.status.details.is_empty() {
                children.push(Child::new(
                    1,
                    self.status_symbol(&service.status),
                    service.status.details.clone(),
                ));
            }
        }
        for rel in self.graph.relationships_from(&service.id, RelationshipKind::Targets) {
            children.push(Child::new(
                1,
                ARROW.to_string(),
                with_note(self.token(&rel.target), &rel.description),
            ));
            children.extend(self.pod_status(&rel.target));
        }
        children
    }

    fn workload_children(&self, deployment: &Resource) -> Vec<Child> {
        let mut children = Vec::new();
        if self.show_details {
            children.push(Child::new(
                1,
                self.status_symbol(&deployment.status),
                deployment.status.details.clone(),
            ));
            children.extend(self.detail_children(deployment));
        }
        for rel in self
            .graph
            .relationships_to(&deployment.id, RelationshipKind::Targets)
            .into_iter()
            .filter(|rel| rel.source.kind == ResourceKind::HorizontalPodAutoscaler)
        {
            children.push(Child::new(
                1,
                self.palette.info(SCALE),
                format!("{} {}", self.token(&rel.source), rel.description),
            ));
        }
        for rel in self.graph.relationships_from(&deployment.id, RelationshipKind::Owns) {
            children.push(Child::new(1, ARROW.to_string(), self.token(&rel.target)));
            children.extend(self.pod_status(&rel.target));
        }
        children
    }

    fn storage_children(&self, config_map: &Resource) -> Vec<Child> {
        let mut children = Vec::new();
        if self.show_details {
            children.extend(self.detail_children(config_map));
        }
        let users: Vec<Relationship> = self
            .graph
            .relationships_to(&config_map.id, RelationshipKind::Uses);
        for rel in users {
            children.push(Child::new(
                1,
                ARROW.to_string(),
                with_note(format!("Used by {}", self.token(&rel.source)), &rel.description),
            ));
        }
        children
    }

    fn detail_children(&self, resource: &Resource) -> Vec<Child> {
        resource
            .detail_fields()
            .into_iter()
            .map(|field| {
                Child::new(
                    1,
                    self.palette.info(INFO),
                    format!("{}: {}", field.label, field.value),
                )
            })
            .collect()
    }

    /// Nested status line for a Pod edge, details only
    fn pod_status(&self, pod: &ResourceId) -> Option<Child> {
        if !self.show_details {
            return None;
        }
        let resource = self.graph.get(pod)?;
        let status = &resource.status;
        let text = if status.details.is_empty() {
            status.phase.clone()
        } else {
            format!("{} ({})", status.phase, status.details)
        };
        Some(Child::new(2, self.status_symbol(status), text))
    }

    fn status_symbol(&self, status: &ResourceStatus) -> String {
        if status.ready {
            self.palette.ok(OK)
        } else if matches!(status.phase.as_str(), "NotReady" | "Failed" | "Unknown") {
            self.palette.error(ERROR)
        } else {
            self.palette.warn(WARN)
        }
    }

    /// Colored `Kind/name` token
    pub fn token(&self, id: &ResourceId) -> String {
        self.palette.kind(id.kind, &id.to_string())
    }
}

fn with_note(text: String, note: &str) -> String {
    if note.is_empty() {
        text
    } else {
        format!("{} ({})", text, note)
    }
}
