//! Structured (JSON/YAML) output

use anyhow::{Context, Result, bail};

use crate::config::OutputFormat;
use crate::error::DiscoveryWarning;
use crate::graph::ResourceGraph;

/// Serialize the graph snapshot and warnings
pub fn render_structured(
    graph: &ResourceGraph,
    warnings: &[DiscoveryWarning],
    format: OutputFormat,
) -> Result<String> {
    let snapshot = graph.snapshot().with_warnings(warnings);
    match format {
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&snapshot).context("Failed to serialize JSON")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => serde_yaml::to_string(&snapshot).context("Failed to serialize YAML"),
        OutputFormat::Text => bail!("text output is not a structured format"),
    }
}
