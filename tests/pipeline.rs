use chrono::{Duration, NaiveDate};
use serde_json::json;
use std::sync::Arc;
use stock_trend::analyzer::TrendAnalyzer;
use stock_trend::config::InstrumentConfig;
use stock_trend::fetcher::DataSource;
use stock_trend::model::{FetchError, PipelineError, PriceRequest};
use stock_trend::parser::QuandlParser;
use stock_trend::pipeline::{process_instrument, Collaborators};
use stock_trend::renderer::JsonChartWriter;
use stock_trend::storage::SqliteStorage;
use tokio::sync::Mutex;

/// Serves a fixed dataset, newest row first like the provider's default order.
struct StubSource {
    body: String,
}

impl StubSource {
    fn with_closes(start: NaiveDate, closes: &[f64]) -> Self {
        let mut data: Vec<serde_json::Value> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let date = start + Duration::days(i as i64);
                json!([date.format("%Y-%m-%d").to_string(), c + 1.0, *c])
            })
            .collect();
        data.reverse();
        let body = json!({
            "dataset": {
                "dataset_code": "BDT_X",
                "column_names": ["Date", "Open", "Close"],
                "data": data
            }
        });
        Self {
            body: body.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DataSource for StubSource {
    async fn fetch(&self, req: &PriceRequest) -> Result<String, FetchError> {
        if req.api_key != "test-key" {
            return Err(FetchError::InvalidResponse {
                status: 400,
                body: "bad key".into(),
            });
        }
        Ok(self.body.clone())
    }
}

fn instrument() -> InstrumentConfig {
    InstrumentConfig {
        dataset: "FSE/BDT_X".into(),
        start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        column: "Close".into(),
        moving_average_windows: vec![30, 7],
        regression_spans: vec![30, 7],
        consecutive_rise: 5,
        consecutive_drop: 4,
    }
}

#[tokio::test]
async fn processes_instrument_end_to_end() {
    let start = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
    // climbs 10 -> 20, falls back to 11, repeated
    let closes: Vec<f64> = (0..60)
        .map(|i| {
            let phase = i % 20;
            if phase < 10 { 10.0 + phase as f64 } else { 30.0 - phase as f64 }
        })
        .collect();
    let source = StubSource::with_closes(start, &closes);

    let out = tempfile::tempdir().unwrap();
    let storage = Arc::new(Mutex::new(SqliteStorage::new(":memory:").unwrap()));
    let parser = QuandlParser::new();
    let analyzer = TrendAnalyzer::new();
    let renderer = JsonChartWriter::new(out.path());
    let deps = Collaborators {
        source: &source,
        parser: &parser,
        analyzer: &analyzer,
        storage: storage.clone(),
        renderer: &renderer,
    };

    let outcome = process_instrument(&instrument(), "test-key", &deps)
        .await
        .unwrap();

    assert_eq!(outcome.observations, 60);
    // Jan 15 .. Mar 14
    assert_eq!(outcome.months, 3);
    // price + monthly + two regressions
    assert_eq!(outcome.charts.len(), 4);
    assert!(outcome.charts.iter().all(|p| p.exists()));
    // three rising legs of 11 values close a 5-day run on their last 6 days
    assert_eq!(outcome.rise_count, 18);
    // falling legs close a 4-day run on 7, 7 and 6 days
    assert_eq!(outcome.drop_count, 20);

    let stored = storage.lock().await.load_series("FSE/BDT_X").unwrap().unwrap();
    assert_eq!(stored.len(), 60);
    assert_eq!(stored.points()[0].date, start);
    assert_eq!(stored.values()[..3], closes[..3]);

    let monthly = storage.lock().await.load_monthly("FSE/BDT_X").unwrap();
    assert_eq!(monthly.len(), 3);
}

#[tokio::test]
async fn fetch_failure_is_reported() {
    let source = StubSource::with_closes(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), &[1.0, 2.0]);
    let out = tempfile::tempdir().unwrap();
    let parser = QuandlParser::new();
    let analyzer = TrendAnalyzer::new();
    let renderer = JsonChartWriter::new(out.path());
    let deps = Collaborators {
        source: &source,
        parser: &parser,
        analyzer: &analyzer,
        storage: Arc::new(Mutex::new(SqliteStorage::new(":memory:").unwrap())),
        renderer: &renderer,
    };

    let err = process_instrument(&instrument(), "wrong-key", &deps)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::InvalidResponse { status: 400, .. })
    ));
}

#[tokio::test]
async fn single_observation_cannot_be_regressed() {
    let source = StubSource::with_closes(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), &[1.0]);
    let out = tempfile::tempdir().unwrap();
    let parser = QuandlParser::new();
    let analyzer = TrendAnalyzer::new();
    let renderer = JsonChartWriter::new(out.path());
    let deps = Collaborators {
        source: &source,
        parser: &parser,
        analyzer: &analyzer,
        storage: Arc::new(Mutex::new(SqliteStorage::new(":memory:").unwrap())),
        renderer: &renderer,
    };

    let err = process_instrument(&instrument(), "test-key", &deps)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Analysis(_)));
}
