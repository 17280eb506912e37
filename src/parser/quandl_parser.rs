// Quandl dataset JSON parsing
use crate::model::FetchError;
use crate::utils::parse_date;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub trait Parser {
    /// Extracts `(date, value)` rows for `column` from a raw response body.
    fn parse(&self, body: &str, column: &str) -> Result<Vec<(NaiveDate, f64)>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct DatasetResponse {
    dataset: Option<Dataset>,
    quandl_error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(default)]
    dataset_code: String,
    column_names: Vec<String>,
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: String,
    message: String,
}

pub struct QuandlParser;

impl QuandlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QuandlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for QuandlParser {
    fn parse(&self, body: &str, column: &str) -> Result<Vec<(NaiveDate, f64)>, FetchError> {
        let response: DatasetResponse =
            serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if let Some(err) = response.quandl_error {
            return Err(FetchError::Api(format!("{}: {}", err.code, err.message)));
        }
        let dataset = response
            .dataset
            .ok_or_else(|| FetchError::Malformed("missing 'dataset' object".into()))?;

        let date_idx = dataset
            .column_names
            .iter()
            .position(|c| c.eq_ignore_ascii_case("date"))
            .ok_or_else(|| FetchError::MissingColumn("Date".into()))?;
        let value_idx = dataset
            .column_names
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .ok_or_else(|| FetchError::MissingColumn(column.to_string()))?;

        let mut rows = Vec::with_capacity(dataset.data.len());
        let mut skipped = 0usize;
        for row in &dataset.data {
            let date = row
                .get(date_idx)
                .and_then(Value::as_str)
                .and_then(parse_date)
                .ok_or_else(|| FetchError::Malformed(format!("bad date in row {:?}", row)))?;

            match row.get(value_idx) {
                Some(Value::Null) | None => skipped += 1,
                Some(v) => {
                    let value = v.as_f64().ok_or_else(|| {
                        FetchError::Malformed(format!("non-numeric {} on {}", column, date))
                    })?;
                    rows.push((date, value));
                }
            }
        }

        if skipped > 0 {
            debug!("Skipped {} rows with empty {}", skipped, column);
        }
        if rows.is_empty() {
            return Err(FetchError::NoData(dataset.dataset_code));
        }
        Ok(rows)
    }
}
