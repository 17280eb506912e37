//! Daily price trend analysis: moving averages, monthly averages,
//! consecutive rise/drop detection and trailing regression lines.

pub mod analyzer;
pub mod config;
pub mod fetcher;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod renderer;
pub mod series;
pub mod storage;
pub mod utils;
