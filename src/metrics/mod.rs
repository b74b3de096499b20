//! Generation session metrics

mod collector;
mod types;

pub use collector::MetricsCollector;
pub use types::{MetricsSnapshot, SessionMetrics, SessionOutcome, StreamMetrics};

// Bound on retained latency samples
pub(crate) const MAX_METRICS_HISTORY: usize = 1000;
