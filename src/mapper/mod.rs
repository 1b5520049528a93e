//! Relationship discovery engine
//!
//! - `coordinator` - namespace resolution and per-namespace fan-out
//! - `processors` - one kind processor per primary kind
//! - `context` - cancellation-guarded typed provider calls
//! - `tasks` - structured fan-out helper
//! - `selector` - label selector matching
//! - `references` - ConfigMap reference scanning

mod context;
mod coordinator;
pub mod processors;
pub mod references;
pub mod selector;
mod tasks;

pub use context::ProcessContext;
pub use coordinator::{DiscoveryCoordinator, DiscoveryOptions, DiscoveryReport};
pub use processors::{KindProcessor, ProcessorFactory, default_processors};
pub use tasks::{TaskGroup, TaskResult, settle};
