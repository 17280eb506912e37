// Renderer module: turns analysis results into chart payloads and hands them off.

pub mod chart;
pub mod json_writer;

use crate::model::RenderError;
use std::path::PathBuf;

pub use chart::ChartSpec;
pub use json_writer::JsonChartWriter;

/// Consumes chart payloads read-only; returns where the chart ended up.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &ChartSpec) -> Result<PathBuf, RenderError>;
}
