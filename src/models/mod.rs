//! Mapper model layer
//!
//! Structure:
//! - `resource_kind.rs` - Resource and relationship kind enums
//! - `resource.rs` - Resource identities, resources and relationships
//! - `payload.rs` - Typed raw objects tagged by kind
//! - `status.rs` - Normalized status summaries
//! - `details.rs` - Renderer detail fields and port formatting

pub mod details;
pub mod payload;
pub mod resource;
pub mod resource_kind;
pub mod status;

pub use details::{DetailField, DetailFields};
pub use payload::{KindObject, ResourcePayload};
pub use resource::{Relationship, Resource, ResourceId};
pub use resource_kind::{RelationshipKind, ResourceKind};
pub use status::{Readiness, ResourceStatus, Summarize};
