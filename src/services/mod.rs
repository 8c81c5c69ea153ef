pub mod aggregator;
pub mod export;

pub use aggregator::{AggregationReport, Aggregator, FetchFailure};
pub use export::{SelectedEntry, Selection};
