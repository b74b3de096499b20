use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::types::{average, percentile, MetricsSnapshot, SessionMetrics, SessionOutcome, StreamMetrics};
use super::MAX_METRICS_HISTORY;

/// Collects generation session metrics
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    enabled: bool,
    state: Arc<RwLock<MetricsState>>,
    start_time: Instant,
}

#[derive(Debug, Default)]
struct MetricsState {
    started: usize,
    completed: usize,
    cancelled: usize,
    failed: usize,
    rejected_busy: usize,
    validation_failures: usize,

    total_chunks: usize,
    total_bytes: usize,
    streaming_time: Duration,

    first_chunk_latencies: Vec<Duration>,
    durations: Vec<Duration>,
}

fn push_bounded(samples: &mut Vec<Duration>, sample: Duration) {
    samples.push(sample);
    if samples.len() > MAX_METRICS_HISTORY {
        samples.remove(0);
    }
}

impl MetricsCollector {
    /// Create a new collector. A disabled collector ignores every record.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: Arc::new(RwLock::new(MetricsState::default())),
            start_time: Instant::now(),
        }
    }

    pub async fn record_session_started(&self) {
        if self.enabled {
            self.state.write().await.started += 1;
        }
    }

    pub async fn record_rejected_busy(&self) {
        if self.enabled {
            self.state.write().await.rejected_busy += 1;
        }
    }

    pub async fn record_validation_failure(&self) {
        if self.enabled {
            self.state.write().await.validation_failures += 1;
        }
    }

    pub async fn record_first_chunk(&self, latency: Duration) {
        if self.enabled {
            push_bounded(&mut self.state.write().await.first_chunk_latencies, latency);
        }
    }

    pub async fn record_chunk(&self, bytes: usize) {
        if !self.enabled {
            return;
        }
        let mut state = self.state.write().await;
        state.total_chunks += 1;
        state.total_bytes += bytes;
    }

    /// Record the end of a session and how long it ran
    pub async fn record_session_finished(&self, outcome: SessionOutcome, duration: Duration) {
        if !self.enabled {
            return;
        }
        let mut state = self.state.write().await;
        match outcome {
            SessionOutcome::Completed => state.completed += 1,
            SessionOutcome::Cancelled => state.cancelled += 1,
            SessionOutcome::Failed => state.failed += 1,
        }
        state.streaming_time += duration;
        push_bounded(&mut state.durations, duration);
    }

    /// Get a snapshot of current metrics
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let state = self.state.read().await;

        let bytes_per_second = if !state.streaming_time.is_zero() {
            state.total_bytes as f32 / state.streaming_time.as_secs_f32()
        } else {
            0.0
        };

        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            sessions: SessionMetrics {
                started: state.started,
                completed: state.completed,
                cancelled: state.cancelled,
                failed: state.failed,
                rejected_busy: state.rejected_busy,
                validation_failures: state.validation_failures,
                average_time_to_first_chunk: average(&state.first_chunk_latencies),
                average_duration: average(&state.durations),
                p95_duration: percentile(&state.durations, 0.95),
            },
            stream: StreamMetrics {
                total_chunks: state.total_chunks,
                total_bytes: state.total_bytes,
                bytes_per_second,
            },
        }
    }
}
