use crate::analyzer::{AnalysisSettings, TrendAnalyzer, TrendLine};
use crate::config::InstrumentConfig;
use crate::fetcher::DataSource;
use crate::model::{PipelineError, PriceRequest, PriceSeries};
use crate::normalizer::normalize_rows;
use crate::parser::Parser;
use crate::renderer::ChartRenderer;
use crate::renderer::chart::{monthly_average_chart, price_and_moving_averages_chart, regression_chart};
use crate::series::SeriesStore;
use crate::storage::SqliteStorage;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Summary of one processed instrument.
#[derive(Debug, Clone)]
pub struct InstrumentOutcome {
    pub instrument: String,
    pub observations: usize,
    pub months: usize,
    pub rise_count: usize,
    pub drop_count: usize,
    pub charts: Vec<PathBuf>,
}

/// Logs every trend line whose slice is shorter than its configured span and
/// returns how many there were.
fn warn_clamped_spans(dataset: &str, trend_lines: &[TrendLine]) -> usize {
    let mut clamped = 0;
    for trend in trend_lines {
        if trend.slice.len() < trend.span as usize {
            warn!(
                "{}: regression span {} clamped to {} observations",
                dataset,
                trend.span,
                trend.slice.len()
            );
            clamped += 1;
        }
    }
    clamped
}

/// Shared collaborators for every instrument of a run.
pub struct Collaborators<'a> {
    pub source: &'a dyn DataSource,
    pub parser: &'a dyn Parser,
    pub analyzer: &'a TrendAnalyzer,
    pub storage: Arc<Mutex<SqliteStorage>>,
    pub renderer: &'a dyn ChartRenderer,
}

/// Fetches, analyzes, stores and renders a single instrument.
pub async fn process_instrument(
    cfg: &InstrumentConfig,
    api_key: &str,
    deps: &Collaborators<'_>,
) -> Result<InstrumentOutcome, PipelineError> {
    info!("Processing instrument: {}", cfg.dataset);
    let request = PriceRequest {
        dataset: cfg.dataset.clone(),
        start_date: cfg.start_date,
        end_date: cfg.end_date,
        api_key: api_key.to_string(),
    };

    let body = deps.source.fetch(&request).await?;
    let mut rows = deps.parser.parse(&body, &cfg.column)?;
    normalize_rows(&mut rows);
    let series = PriceSeries::from_rows(rows)?;
    info!(
        "{}: {} observations of {}",
        cfg.dataset,
        series.len(),
        cfg.column
    );

    let mut store = SeriesStore::new(series);
    let report = deps
        .analyzer
        .analyze(&mut store, &AnalysisSettings::from(cfg))?;
    warn_clamped_spans(&cfg.dataset, &report.trend_lines);

    {
        let mut storage = deps.storage.lock().await;
        storage.save_series(&cfg.dataset, store.series())?;
        storage.save_monthly(&cfg.dataset, &report.monthly)?;
    }

    let mut charts = vec![
        price_and_moving_averages_chart(
            &cfg.dataset,
            &cfg.column,
            &store,
            &cfg.moving_average_windows,
            &report.monthly,
        )?,
        monthly_average_chart(&cfg.dataset, &cfg.column, &store, &report.monthly),
    ];
    charts.extend(
        report
            .trend_lines
            .iter()
            .map(|trend| regression_chart(&cfg.dataset, &cfg.column, trend)),
    );

    let mut written = Vec::with_capacity(charts.len());
    for chart in &charts {
        written.push(deps.renderer.render(chart)?);
    }

    info!("Finished instrument: {}", cfg.dataset);
    Ok(InstrumentOutcome {
        instrument: cfg.dataset.clone(),
        observations: store.len(),
        months: report.monthly.len(),
        rise_count: report.rise_count,
        drop_count: report.drop_count,
        charts: written,
    })
}
