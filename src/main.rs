use futures::future::join_all;
use std::sync::Arc;
use stock_trend::analyzer::TrendAnalyzer;
use stock_trend::config::{load_config, AppConfig};
use stock_trend::fetcher::QuandlFetcher;
use stock_trend::parser::QuandlParser;
use stock_trend::pipeline::{process_instrument, Collaborators};
use stock_trend::renderer::JsonChartWriter;
use stock_trend::storage::SqliteStorage;
use tokio::sync::Mutex;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            std::process::exit(1);
        }
    };

    let fetcher = match QuandlFetcher::new(config.base_url.clone()) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let parser = QuandlParser::new();
    let analyzer = TrendAnalyzer::new();
    let renderer = JsonChartWriter::new(&config.output_dir);

    let storage = match SqliteStorage::new(&config.db_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };

    let deps = Collaborators {
        source: &fetcher,
        parser: &parser,
        analyzer: &analyzer,
        storage,
        renderer: &renderer,
    };

    info!("Instruments to process: {}", config.instruments.len());
    let tasks: Vec<_> = config
        .instruments
        .iter()
        .map(|cfg| process_instrument(cfg, &config.api_key, &deps))
        .collect();
    let results = join_all(tasks).await;

    let mut failures = 0;
    for (cfg, result) in config.instruments.iter().zip(results) {
        match result {
            Ok(outcome) => info!(
                "{}: {} days, {} months, {} rise days, {} drop days, {} charts",
                outcome.instrument,
                outcome.observations,
                outcome.months,
                outcome.rise_count,
                outcome.drop_count,
                outcome.charts.len()
            ),
            Err(e) => {
                failures += 1;
                error!("{} failed: {}", cfg.dataset, e);
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
