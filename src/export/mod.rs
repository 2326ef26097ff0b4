//! Export functionality for analysis
//!
//! CSV export of training metrics: per-window win/draw rates and the
//! per-episode draw series.

mod metrics_csv;

pub use metrics_csv::{DrawGameRecord, MetricsCsvExporter};
