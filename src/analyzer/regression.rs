use crate::model::{AnalysisError, PricePoint};
use chrono::NaiveDate;
use serde::Serialize;

/// Last `span` observations laid out for a straight-line fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailingSlice {
    /// Positions `0..count`.
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub label_dates: Vec<NaiveDate>,
}

impl TrailingSlice {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionLine {
    pub slope: f64,
    pub intercept: f64,
    /// Fitted value at every input x, in input order.
    pub points: Vec<f64>,
}

impl RegressionLine {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

pub fn trailing_slice(points: &[PricePoint], span: i64) -> Result<TrailingSlice, AnalysisError> {
    if span <= 0 {
        return Err(AnalysisError::InvalidWindow(span));
    }

    let start = points.len().saturating_sub(span as usize);
    let tail = &points[start..];
    if tail.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            actual: tail.len(),
        });
    }

    Ok(TrailingSlice {
        xs: (0..tail.len()).map(|i| i as f64).collect(),
        ys: tail.iter().map(|p| p.value).collect(),
        label_dates: tail.iter().map(|p| p.date).collect(),
    })
}

/// Ordinary least squares fit of `ys` against `xs`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<RegressionLine, AnalysisError> {
    if xs.len() != ys.len() {
        return Err(AnalysisError::LengthMismatch {
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    if xs.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            actual: xs.len(),
        });
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let covariance: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let spread_x: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if spread_x == 0.0 {
        // every x identical: only one distinct position to fit through
        return Err(AnalysisError::DegenerateInput(xs.len()));
    }

    let slope = covariance / spread_x;
    let intercept = mean_y - slope * mean_x;

    Ok(RegressionLine {
        slope,
        intercept,
        points: xs.iter().map(|&x| intercept + slope * x).collect(),
    })
}
