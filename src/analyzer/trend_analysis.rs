use crate::analyzer::monthly;
use crate::analyzer::regression::{self, RegressionLine, TrailingSlice};
use crate::analyzer::rolling;
use crate::config::InstrumentConfig;
use crate::model::{AnalysisError, MonthlyAggregate, PriceSeries, TrendDirection};
use crate::series::{DerivedColumn, SeriesStore};
use serde::Serialize;
use tracing::{debug, info};

/// Trait defining the interface for a price series analyzer.
pub trait Analyzer {
    fn moving_average(
        &self,
        series: &PriceSeries,
        window: i64,
    ) -> Result<Vec<Option<f64>>, AnalysisError>;
    fn monthly_average(&self, series: &PriceSeries) -> Result<MonthlyAggregate, AnalysisError>;
    fn consecutive_run(
        &self,
        series: &PriceSeries,
        run_length: i64,
        direction: TrendDirection,
    ) -> Result<Vec<bool>, AnalysisError>;
    fn trailing_slice(&self, series: &PriceSeries, span: i64)
    -> Result<TrailingSlice, AnalysisError>;
    fn fit_line(&self, slice: &TrailingSlice) -> Result<RegressionLine, AnalysisError>;
}

/// Stateless implementation of the trend analyzer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for TrendAnalyzer {
    fn moving_average(
        &self,
        series: &PriceSeries,
        window: i64,
    ) -> Result<Vec<Option<f64>>, AnalysisError> {
        rolling::moving_average(&series.values(), window)
    }

    fn monthly_average(&self, series: &PriceSeries) -> Result<MonthlyAggregate, AnalysisError> {
        monthly::monthly_average(series.points())
    }

    fn consecutive_run(
        &self,
        series: &PriceSeries,
        run_length: i64,
        direction: TrendDirection,
    ) -> Result<Vec<bool>, AnalysisError> {
        rolling::consecutive_run(&series.values(), run_length, direction)
    }

    fn trailing_slice(
        &self,
        series: &PriceSeries,
        span: i64,
    ) -> Result<TrailingSlice, AnalysisError> {
        regression::trailing_slice(series.points(), span)
    }

    fn fit_line(&self, slice: &TrailingSlice) -> Result<RegressionLine, AnalysisError> {
        regression::fit_line(&slice.xs, &slice.ys)
    }
}

/// Windows and run lengths applied to one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub moving_average_windows: Vec<i64>,
    pub regression_spans: Vec<i64>,
    pub consecutive_rise: i64,
    pub consecutive_drop: i64,
}

impl From<&InstrumentConfig> for AnalysisSettings {
    fn from(cfg: &InstrumentConfig) -> Self {
        Self {
            moving_average_windows: cfg.moving_average_windows.clone(),
            regression_spans: cfg.regression_spans.clone(),
            consecutive_rise: cfg.consecutive_rise,
            consecutive_drop: cfg.consecutive_drop,
        }
    }
}

/// Regression fitted over one trailing span.
#[derive(Debug, Clone, Serialize)]
pub struct TrendLine {
    /// Configured span; the slice may hold fewer points.
    pub span: i64,
    pub slice: TrailingSlice,
    pub line: RegressionLine,
}

/// Structure representing the overall analysis result.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub monthly: MonthlyAggregate,
    pub trend_lines: Vec<TrendLine>,
    /// Number of days closing a rising run.
    pub rise_count: usize,
    /// Number of days closing a falling run.
    pub drop_count: usize,
}

pub fn moving_average_column(window: i64) -> String {
    format!("{} Moving Average", window)
}

pub fn consecutive_column(run_length: i64, direction: TrendDirection) -> String {
    format!("{} Consecutive {}", run_length, direction)
}

/// Name of the marker column holding raw values on run-closing days.
pub fn marker_column(direction: TrendDirection) -> String {
    direction.to_string()
}

impl TrendAnalyzer {
    /// Same as [`Analyzer::consecutive_run`] with the direction given as text
    /// (`rise` / `drop`).
    pub fn consecutive_run_named(
        &self,
        series: &PriceSeries,
        run_length: i64,
        direction: &str,
    ) -> Result<Vec<bool>, AnalysisError> {
        let direction: TrendDirection = direction.parse()?;
        self.consecutive_run(series, run_length, direction)
    }

    /// Computes every configured statistic, attaching the aligned columns to
    /// `store` and returning the non-aligned results.
    ///
    /// On error `store` is left exactly as it was passed in.
    pub fn analyze(
        &self,
        store: &mut SeriesStore,
        settings: &AnalysisSettings,
    ) -> Result<AnalysisReport, AnalysisError> {
        let series = store.series();
        let values = series.values();
        let mut columns: Vec<(String, DerivedColumn)> = Vec::new();

        for &window in &settings.moving_average_windows {
            let ma = self.moving_average(series, window)?;
            debug!(
                "MA {}: {} defined values",
                window,
                ma.iter().filter(|v| v.is_some()).count()
            );
            columns.push((moving_average_column(window), DerivedColumn::Numeric(ma)));
        }

        let mut counts = [0usize; 2];
        let runs = [
            (settings.consecutive_rise, TrendDirection::Rising),
            (settings.consecutive_drop, TrendDirection::Falling),
        ];
        for (slot, (run_length, direction)) in runs.into_iter().enumerate() {
            let mask = self.consecutive_run(series, run_length, direction)?;
            let markers: Vec<Option<f64>> = mask
                .iter()
                .zip(&values)
                .map(|(&hit, &value)| hit.then_some(value))
                .collect();
            counts[slot] = mask.iter().filter(|&&hit| hit).count();

            columns.push((
                consecutive_column(run_length, direction),
                DerivedColumn::Flags(mask),
            ));
            columns.push((marker_column(direction), DerivedColumn::Numeric(markers)));
        }

        let monthly = self.monthly_average(series)?;

        let mut trend_lines = Vec::with_capacity(settings.regression_spans.len());
        for &span in &settings.regression_spans {
            let slice = self.trailing_slice(series, span)?;
            let line = self.fit_line(&slice)?;
            debug!(
                "Regression over {} days: slope = {:.4}, intercept = {:.4}",
                slice.len(),
                line.slope,
                line.intercept
            );
            trend_lines.push(TrendLine { span, slice, line });
        }

        // attach only once every computation above has succeeded
        for (name, column) in columns {
            store.attach_column(name, column)?;
        }

        info!(
            "Analysis done: {} months, {} rise days, {} drop days, {} trend lines",
            monthly.len(),
            counts[0],
            counts[1],
            trend_lines.len()
        );

        Ok(AnalysisReport {
            monthly,
            trend_lines,
            rise_count: counts[0],
            drop_count: counts[1],
        })
    }
}
