// Series module: in-memory price series with aligned derived columns.

pub mod store;

pub use store::{DerivedColumn, SeriesStore};
