pub mod aggregator;
pub mod config;
pub mod error;
pub mod report;
pub mod source;
pub mod window;

pub use aggregator::{compute, percent_change, MetricKey, MetricValue, MetricsSnapshot, ReportTotals};
pub use error::{CoreError, InvalidInputError, WindowLabel};
pub use window::{derive_previous_window, PeriodWindow};
