use crate::model::RenderError;
use crate::renderer::ChartRenderer;
use crate::renderer::chart::ChartSpec;
use crate::utils::to_kebab_case;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Writes each chart as a JSON document for an external plotting tool.
pub struct JsonChartWriter {
    output_dir: PathBuf,
}

impl JsonChartWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn path_for(&self, chart: &ChartSpec) -> PathBuf {
        self.output_dir.join(format!(
            "{}-{}.json",
            to_kebab_case(&chart.instrument),
            chart.name
        ))
    }
}

impl ChartRenderer for JsonChartWriter {
    fn render(&self, chart: &ChartSpec) -> Result<PathBuf, RenderError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(chart);
        let json = serde_json::to_string_pretty(chart)?;
        fs::write(&path, json)?;
        info!("Chart written: {}", path.display());
        Ok(path)
    }
}
