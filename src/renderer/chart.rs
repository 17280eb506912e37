//! Chart payloads handed to the renderer.
//!
//! Builders only read the store and analysis results; they never modify them.

use crate::analyzer::TrendLine;
use crate::analyzer::trend_analysis::{marker_column, moving_average_column};
use crate::model::{AnalysisError, MonthlyAverage, TrendDirection};
use crate::series::SeriesStore;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    Circle,
    RiseTriangle,
    DropTriangle,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Line,
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: String,
    /// `None` leaves a gap in the plotted line.
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLine {
    pub label: Option<String>,
    pub kind: LineKind,
    pub marker: Option<Marker>,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub label: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Short slug identifying the chart within an instrument.
    pub name: String,
    pub instrument: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<ChartLine>,
    /// Explicit x tick labels; empty means the renderer picks its own.
    pub x_ticks: Vec<Tick>,
}

fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn line_over_dates(
    label: Option<String>,
    marker: Option<Marker>,
    dates: &[NaiveDate],
    values: impl IntoIterator<Item = Option<f64>>,
) -> ChartLine {
    ChartLine {
        label,
        kind: LineKind::Line,
        marker,
        points: dates
            .iter()
            .zip(values)
            .map(|(&date, y)| ChartPoint {
                x: date_label(date),
                y,
            })
            .collect(),
    }
}

fn monthly_line(label: &str, monthly: &[MonthlyAverage]) -> ChartLine {
    ChartLine {
        label: Some(label.to_string()),
        kind: LineKind::Line,
        marker: Some(Marker::Circle),
        points: monthly
            .iter()
            .map(|m| ChartPoint {
                x: m.month
                    .first_day()
                    .map(date_label)
                    .unwrap_or_else(|| m.month.to_string()),
                y: Some(m.average),
            })
            .collect(),
    }
}

/// Every `n`th regression tick label stays visible, `n = ceil(span / 10)`.
pub fn tick_visibility(span: i64) -> usize {
    if span <= 0 {
        return 1;
    }
    ((span as usize) + 9) / 10
}

/// Raw column, moving averages, monthly averages and rise/drop markers.
pub fn price_and_moving_averages_chart(
    instrument: &str,
    column: &str,
    store: &SeriesStore,
    windows: &[i64],
    monthly: &[MonthlyAverage],
) -> Result<ChartSpec, AnalysisError> {
    let dates = store.dates();
    let mut lines = vec![line_over_dates(
        Some(column.to_string()),
        None,
        &dates,
        store.values().into_iter().map(Some),
    )];

    for &window in windows {
        let ma = store.column(&moving_average_column(window))?;
        let values = ma
            .as_numeric()
            .ok_or_else(|| AnalysisError::NotFound(moving_average_column(window)))?;
        lines.push(line_over_dates(
            Some(format!("MA {} days", window)),
            None,
            &dates,
            values.iter().copied(),
        ));
    }

    lines.push(monthly_line("Monthly Average", monthly));

    for (direction, marker) in [
        (TrendDirection::Rising, Marker::RiseTriangle),
        (TrendDirection::Falling, Marker::DropTriangle),
    ] {
        let name = marker_column(direction);
        let values = store
            .column(&name)?
            .as_numeric()
            .ok_or_else(|| AnalysisError::NotFound(name.clone()))?;
        let mut line = line_over_dates(None, Some(marker), &dates, values.iter().copied());
        line.kind = LineKind::Scatter;
        lines.push(line);
    }

    Ok(ChartSpec {
        name: "price-and-moving-averages".to_string(),
        instrument: instrument.to_string(),
        title: format!(
            "{}\n{}, Monthly Average and Moving Averages",
            instrument, column
        ),
        x_label: "Date".to_string(),
        y_label: format!("{} Price", column),
        lines,
        x_ticks: Vec::new(),
    })
}

pub fn monthly_average_chart(
    instrument: &str,
    column: &str,
    store: &SeriesStore,
    monthly: &[MonthlyAverage],
) -> ChartSpec {
    let dates = store.dates();
    ChartSpec {
        name: "monthly-average".to_string(),
        instrument: instrument.to_string(),
        title: format!("{}\n{} and Monthly Price Average", instrument, column),
        x_label: "Date".to_string(),
        y_label: format!("{} Price", column),
        lines: vec![
            line_over_dates(
                Some(column.to_string()),
                None,
                &dates,
                store.values().into_iter().map(Some),
            ),
            monthly_line("Monthly Price Average", monthly),
        ],
        x_ticks: Vec::new(),
    }
}

/// Scatter of the trailing slice with its fitted line, x ticks labelled by date.
pub fn regression_chart(instrument: &str, column: &str, trend: &TrendLine) -> ChartSpec {
    let slice = &trend.slice;
    let every = tick_visibility(trend.span);
    let x_of = |x: f64| format!("{}", x as usize);

    let scatter = ChartLine {
        label: None,
        kind: LineKind::Scatter,
        marker: Some(Marker::Plus),
        points: slice
            .xs
            .iter()
            .zip(&slice.ys)
            .map(|(&x, &y)| ChartPoint { x: x_of(x), y: Some(y) })
            .collect(),
    };
    let fitted = ChartLine {
        label: Some("Regression Line".to_string()),
        kind: LineKind::Line,
        marker: None,
        points: slice
            .xs
            .iter()
            .zip(&trend.line.points)
            .map(|(&x, &y)| ChartPoint { x: x_of(x), y: Some(y) })
            .collect(),
    };

    ChartSpec {
        name: format!("regression-{}", trend.span),
        instrument: instrument.to_string(),
        title: format!("{} Days Regression Line", slice.len()),
        x_label: "Date".to_string(),
        y_label: format!("{} Price", column),
        lines: vec![scatter, fitted],
        x_ticks: slice
            .label_dates
            .iter()
            .enumerate()
            .map(|(i, &date)| Tick {
                label: date_label(date),
                visible: i % every == 0,
            })
            .collect(),
    }
}
