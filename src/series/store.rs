use crate::model::{AnalysisError, PricePoint, PriceSeries};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Column derived from a price series, aligned with it by position.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedColumn {
    /// `None` marks positions where the statistic is undefined.
    Numeric(Vec<Option<f64>>),
    Flags(Vec<bool>),
}

impl DerivedColumn {
    pub fn len(&self) -> usize {
        match self {
            DerivedColumn::Numeric(values) => values.len(),
            DerivedColumn::Flags(flags) => flags.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            DerivedColumn::Numeric(values) => Some(values),
            DerivedColumn::Flags(_) => None,
        }
    }

    pub fn as_flags(&self) -> Option<&[bool]> {
        match self {
            DerivedColumn::Flags(flags) => Some(flags),
            DerivedColumn::Numeric(_) => None,
        }
    }
}

/// Raw price series plus named derived columns.
pub struct SeriesStore {
    series: PriceSeries,
    columns: BTreeMap<String, DerivedColumn>,
}

impl SeriesStore {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series,
            columns: BTreeMap::new(),
        }
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn values(&self) -> Vec<f64> {
        self.series.values()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series.dates()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Last `n` observations in original order, or the whole series when
    /// `n` exceeds its length.
    pub fn tail(&self, n: usize) -> Vec<PricePoint> {
        let points = self.series.points();
        let start = points.len().saturating_sub(n);
        points[start..].to_vec()
    }

    /// Stores a derived column under `name`, replacing any column of the same name.
    pub fn attach_column(
        &mut self,
        name: impl Into<String>,
        column: DerivedColumn,
    ) -> Result<(), AnalysisError> {
        if column.len() != self.series.len() {
            return Err(AnalysisError::LengthMismatch {
                expected: self.series.len(),
                actual: column.len(),
            });
        }
        self.columns.insert(name.into(), column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Result<&DerivedColumn, AnalysisError> {
        self.columns
            .get(name)
            .ok_or_else(|| AnalysisError::NotFound(name.to_string()))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }
}
