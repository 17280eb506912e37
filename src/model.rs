// Core structs: PricePoint, PriceSeries, MonthlyAggregate and the error enums
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Daily price series, strictly increasing by date.
///
/// The order is fixed at construction; every derived column produced from it
/// is aligned by position with these points.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, AnalysisError> {
        if points.is_empty() {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AnalysisError::UnorderedSeries(pair[1].date));
            }
        }
        Ok(Self { points })
    }

    pub fn from_rows(rows: Vec<(NaiveDate, f64)>) -> Result<Self, AnalysisError> {
        Self::new(
            rows.into_iter()
                .map(|(date, value)| PricePoint { date, value })
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Calendar month key, ordered by (year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First calendar day of the month, used as the x position on charts.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub month: MonthKey,
    pub average: f64,
    pub observations: usize,
}

/// Monthly means in ascending month order, one entry per observed month.
pub type MonthlyAggregate = Vec<MonthlyAverage>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Rising,
    Falling,
}

impl FromStr for TrendDirection {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rise" | "rising" => Ok(TrendDirection::Rising),
            "drop" | "falling" => Ok(TrendDirection::Falling),
            _ => Err(AnalysisError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Rising => f.write_str("Rise"),
            TrendDirection::Falling => f.write_str("Drop"),
        }
    }
}

/// Single request to the market-data provider.
#[derive(Debug, Clone)]
pub struct PriceRequest {
    pub dataset: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub api_key: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("window must be positive, got {0}")]
    InvalidWindow(i64),
    #[error("unknown trend direction '{0}', expected 'rise' or 'drop'")]
    InvalidDirection(String),
    #[error("column length {actual} does not match series length {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("column '{0}' not found")]
    NotFound(String),
    #[error("need at least {required} observations, have {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("all {0} regression positions are identical, no line can be fitted")]
    DegenerateInput(usize),
    #[error("dates must be strictly increasing, out of order at {0}")]
    UnorderedSeries(NaiveDate),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(String),
    #[error("provider responded {status}: {body}")]
    InvalidResponse { status: u16, body: String },
    #[error("provider error: {0}")]
    Api(String),
    #[error("no data returned for {0}")]
    NoData(String),
    #[error("column '{0}' not present in dataset")]
    MissingColumn(String),
    #[error("malformed dataset: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(String),
    #[error("invalid stored date: {0}")]
    InvalidDate(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure of one instrument's fetch-analyze-render run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn series_rejects_unordered_dates() {
        let err = PriceSeries::from_rows(vec![(d(2020, 1, 2), 1.0), (d(2020, 1, 2), 2.0)])
            .unwrap_err();
        assert_eq!(err, AnalysisError::UnorderedSeries(d(2020, 1, 2)));
    }

    #[test]
    fn series_rejects_empty_input() {
        assert!(matches!(
            PriceSeries::new(Vec::new()),
            Err(AnalysisError::InsufficientData { actual: 0, .. })
        ));
    }

    #[test]
    fn direction_parsing() {
        assert_eq!("rise".parse::<TrendDirection>(), Ok(TrendDirection::Rising));
        assert_eq!("Falling".parse::<TrendDirection>(), Ok(TrendDirection::Falling));
        assert_eq!(
            "sideways".parse::<TrendDirection>(),
            Err(AnalysisError::InvalidDirection("sideways".into()))
        );
    }

    #[test]
    fn month_key_orders_by_year_then_month() {
        assert!(MonthKey::of(d(2019, 12, 31)) < MonthKey::of(d(2020, 1, 1)));
        assert_eq!(MonthKey::of(d(2020, 3, 9)).to_string(), "2020-03");
    }
}
