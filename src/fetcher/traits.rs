use crate::model::{FetchError, PriceRequest};

/// Source of raw daily price datasets.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Performs a single request and returns the raw response body.
    async fn fetch(&self, req: &PriceRequest) -> Result<String, FetchError>;
}
