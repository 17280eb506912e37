pub mod quandl_parser;

pub use quandl_parser::{Parser, QuandlParser};
