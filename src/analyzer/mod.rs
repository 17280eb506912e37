// Analyzer module: aggregates submodules for different aspects of analysis.

pub mod monthly;
pub mod regression;
pub mod rolling;
pub mod trend_analysis;

// Re-export the main Analyzer implementation for ease of use.
pub use trend_analysis::{AnalysisReport, AnalysisSettings, Analyzer, TrendAnalyzer, TrendLine};
