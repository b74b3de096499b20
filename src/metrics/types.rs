use std::time::Duration;
use serde::{Deserialize, Serialize};

/// How a generation session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Completed,
    Cancelled,
    Failed,
}

/// Snapshot of all metrics at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Time since the collector was created
    pub uptime: Duration,

    /// Session counters and latencies
    pub sessions: SessionMetrics,

    /// Streaming volume
    pub stream: StreamMetrics,
}

/// Generation session counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Sessions that reached the backend
    pub started: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub failed: usize,

    /// Submits rejected because a session was already running
    pub rejected_busy: usize,

    /// Submits rejected by parameter validation
    pub validation_failures: usize,

    /// Average delay between issuing the request and the first chunk
    pub average_time_to_first_chunk: Duration,

    /// Average duration from request to stream close
    pub average_duration: Duration,

    /// 95th percentile session duration
    pub p95_duration: Duration,
}

/// Streamed data volume
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamMetrics {
    pub total_chunks: usize,
    pub total_bytes: usize,

    /// Bytes per second across completed streaming time
    pub bytes_per_second: f32,
}

impl SessionMetrics {
    /// Failed share of finished sessions
    pub fn failure_rate(&self) -> f32 {
        let finished = self.completed + self.cancelled + self.failed;
        if finished > 0 {
            self.failed as f32 / finished as f32
        } else {
            0.0
        }
    }
}

pub(crate) fn average(samples: &[Duration]) -> Duration {
    if samples.is_empty() {
        return Duration::default();
    }
    let total: Duration = samples.iter().sum();
    total / samples.len() as u32
}

pub(crate) fn percentile(samples: &[Duration], fraction: f32) -> Duration {
    let mut sorted = samples.to_vec();
    sorted.sort();
    let idx = ((sorted.len() as f32 * fraction) as usize).min(sorted.len().saturating_sub(1));
    sorted.get(idx).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_statistics() {
        let samples: Vec<_> = [10, 20, 30, 40, 50].iter().map(|&ms| Duration::from_millis(ms)).collect();
        assert_eq!(average(&samples), Duration::from_millis(30));
        assert_eq!(percentile(&samples, 0.95), Duration::from_millis(50));
        assert_eq!(average(&[]), Duration::default());
        assert_eq!(percentile(&[], 0.95), Duration::default());
    }

    #[test]
    fn test_failure_rate() {
        let metrics = SessionMetrics {
            completed: 3,
            cancelled: 0,
            failed: 1,
            ..Default::default()
        };
        assert_eq!(metrics.failure_rate(), 0.25);
        assert_eq!(SessionMetrics::default().failure_rate(), 0.0);
    }
}
