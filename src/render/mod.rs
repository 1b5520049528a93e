//! Layered renderer
//!
//! Renders a finished graph as a tree grouped into four fixed layers
//! (Ingress, Service, Workload, Storage), or as a structured JSON/YAML
//! document. Output depends only on graph contents and the options passed to
//! the constructor.

mod layers;
mod palette;
mod structured;

pub use structured::render_structured;

use anyhow::Result;

use crate::config::OutputFormat;
use crate::error::DiscoveryWarning;
use crate::graph::ResourceGraph;
use layers::{BULLET, Layer, LayerView, WARN};
use palette::Palette;

const TITLE: &str = "Kubernetes Resource Map";
const RULE_WIDTH: usize = 80;

/// Renderer switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_details: bool,
    pub color: bool,
    pub compact: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_details: true,
            color: true,
            compact: false,
        }
    }
}

pub struct Renderer {
    options: RenderOptions,
    palette: Palette,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            palette: Palette::new(options.color),
        }
    }

    /// Render the graph as layered text
    pub fn render(&self, graph: &ResourceGraph) -> String {
        let view = LayerView {
            graph,
            palette: self.palette,
            show_details: self.options.show_details,
        };
        let mut lines: Vec<String> = Vec::new();

        if !self.options.compact {
            lines.push(self.palette.heading(TITLE));
            lines.push("-".repeat(RULE_WIDTH));
            lines.push("External Traffic".to_string());
            lines.push("│".to_string());
            lines.push("▼".to_string());
        }

        let mut first = true;
        for layer in Layer::ALL {
            let resources = graph.resources_of_kind(layer.kind());
            if resources.is_empty() && self.options.compact {
                continue;
            }
            if !first && !self.options.compact {
                lines.push(String::new());
            }
            first = false;

            lines.push(self.palette.heading(&format!("[{}]", layer.title())));
            if resources.is_empty() {
                lines.push(format!("    {}", self.palette.dim("(none)")));
                continue;
            }

            let count = resources.len();
            for (index, resource) in resources.iter().enumerate() {
                let last = index + 1 == count;
                let glyph = if last { "└── " } else { "├── " };
                let namespace = if resource.namespace().is_empty() {
                    String::new()
                } else {
                    format!(" ({})", resource.namespace())
                };
                lines.push(format!(
                    "{}{} {}{}",
                    glyph,
                    BULLET,
                    view.token(&resource.id),
                    namespace
                ));

                let indent = if last { "    " } else { "│   " };
                for child in view.children(layer, resource) {
                    lines.push(format!(
                        "{}{}{} {}",
                        indent,
                        "  ".repeat(child.depth),
                        child.symbol,
                        child.text
                    ));
                }
            }
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// Render warnings as a block for the end of a run, empty without warnings
    pub fn render_warnings(&self, warnings: &[DiscoveryWarning]) -> String {
        if warnings.is_empty() {
            return String::new();
        }
        let mut output = format!("{}\n", self.palette.heading("Warnings:"));
        for warning in warnings {
            output.push_str(&format!("  {} {}\n", self.palette.warn(WARN), warning));
        }
        output
    }
}

/// Render a discovery result in the requested format
pub fn render_output(
    graph: &ResourceGraph,
    warnings: &[DiscoveryWarning],
    options: RenderOptions,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(Renderer::new(options).render(graph)),
        OutputFormat::Json | OutputFormat::Yaml => render_structured(graph, warnings, format),
    }
}
