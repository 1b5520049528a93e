//! Kubernetes resource mapper
//!
//! Discovers resources across namespaces, infers how they relate (ownership,
//! routing, configuration usage, autoscaling) and renders the result as a
//! layered map. The binary is a thin shell over this library so the engine can
//! be driven from tests with an offline provider.

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod kube;
pub mod mapper;
pub mod models;
pub mod render;

// Re-export commonly used types for convenience
pub use error::{DiscoveryWarning, MapperError, ProcessError, ProviderError};
pub use graph::{GraphSnapshot, ResourceGraph};
pub use mapper::{DiscoveryCoordinator, DiscoveryOptions, DiscoveryReport};
pub use models::{Relationship, RelationshipKind, Resource, ResourceId, ResourceKind};
pub use render::{RenderOptions, Renderer, render_output};
