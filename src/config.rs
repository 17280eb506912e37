use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    pub dataset: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_column")]
    pub column: String,
    #[serde(default = "default_windows")]
    pub moving_average_windows: Vec<i64>,
    #[serde(default = "default_windows")]
    pub regression_spans: Vec<i64>,
    #[serde(default = "default_consecutive_rise")]
    pub consecutive_rise: i64,
    #[serde(default = "default_consecutive_drop")]
    pub consecutive_drop: i64,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    pub instruments: Vec<InstrumentConfig>,
}

fn default_column() -> String {
    "Close".to_string()
}

fn default_windows() -> Vec<i64> {
    vec![90, 30, 7]
}

fn default_consecutive_rise() -> i64 {
    5
}

fn default_consecutive_drop() -> i64 {
    4
}

fn default_base_url() -> String {
    "https://www.quandl.com/api/v3".to_string()
}

fn default_db_path() -> String {
    "data.db".to_string()
}

fn default_output_dir() -> String {
    "charts".to_string()
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
