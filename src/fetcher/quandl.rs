use crate::fetcher::traits::DataSource;
use crate::model::{FetchError, PriceRequest};

use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches dataset JSON from a Quandl-compatible `/datasets` endpoint.
pub struct QuandlFetcher {
    client: Client,
    base_url: String,
}

impl QuandlFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("stock-trend/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn build_url(&self, req: &PriceRequest) -> String {
        format!(
            "{}/datasets/{}.json",
            self.base_url.trim_end_matches('/'),
            req.dataset.trim_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl DataSource for QuandlFetcher {
    async fn fetch(&self, req: &PriceRequest) -> Result<String, FetchError> {
        let url = self.build_url(req);
        info!(
            "GET {} [{} .. {}]",
            url, req.start_date, req.end_date
        );

        let start_date = req.start_date.format("%Y-%m-%d").to_string();
        let end_date = req.end_date.format("%Y-%m-%d").to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
                ("order", "asc"),
                ("api_key", req.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Provider responded [{}] for {}", status, req.dataset);
            return Err(FetchError::InvalidResponse {
                status: status.as_u16(),
                body,
            });
        }

        info!("Fetched {} bytes for {}", body.len(), req.dataset);
        Ok(body)
    }
}
