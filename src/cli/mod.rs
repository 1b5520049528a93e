//! CLI module
//!
//! Argument parsing and logging setup for the binary.

mod args;
mod logging;

pub use args::Args;
pub use logging::{default_filter, init_logging};
