// Fetcher module: retrieval of raw price datasets from the market-data provider.

pub mod quandl;
pub mod traits;

pub use quandl::QuandlFetcher;
pub use traits::DataSource;
