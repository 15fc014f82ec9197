// Conversion throughput metrics
//
// Lightweight atomic counters for points and blocks moved during a run

use crate::services::TranscodeStats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Throughput metrics for one conversion run
///
/// Uses atomic operations so the numbers can be read from another thread while the
/// run is still writing them. Logged through `tracing` when the run finishes.
#[derive(Debug)]
pub struct RunMetrics {
    /// Files that went through the transcoder successfully
    pub files_transcoded: AtomicU64,

    /// Total points copied across all files
    pub points_copied: AtomicU64,

    /// Total blocks written across all files
    pub blocks_written: AtomicU64,

    /// Time spent inside successful conversions, in milliseconds
    pub transcode_time_ms: AtomicU64,

    /// Run start time
    start_time: Instant,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            files_transcoded: AtomicU64::new(0),
            points_copied: AtomicU64::new(0),
            blocks_written: AtomicU64::new(0),
            transcode_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed conversion
    pub fn record_transcode(&self, stats: &TranscodeStats) {
        self.files_transcoded.fetch_add(1, Ordering::Relaxed);
        self.points_copied.fetch_add(stats.points, Ordering::Relaxed);
        self.blocks_written.fetch_add(stats.blocks, Ordering::Relaxed);
        self.transcode_time_ms
            .fetch_add(stats.duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Points per second across successful conversions
    pub fn points_per_second(&self) -> f64 {
        let ms = self.transcode_time_ms.load(Ordering::Relaxed);
        let points = self.points_copied.load(Ordering::Relaxed);
        if ms > 0 {
            points as f64 * 1000.0 / ms as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Run metrics: {} files, {} points in {} blocks, {:.0} points/s, elapsed {:.2}s",
            self.files_transcoded.load(Ordering::Relaxed),
            self.points_copied.load(Ordering::Relaxed),
            self.blocks_written.load(Ordering::Relaxed),
            self.points_per_second(),
            self.elapsed().as_secs_f64()
        );
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}
