//! Broadcast statistics.

use std::time::{Duration, Instant};

use jukebox_ipc::BroadcastStats;

use crate::registry::BroadcastOutcome;

/// Collects broadcast counters on the engine thread.
pub struct BroadcastMetrics {
    stats: BroadcastStats,
    started: Instant,
    last_report_time: Instant,
    report_interval: Duration,
}

impl BroadcastMetrics {
    /// Create a new metrics collector.
    pub fn new(report_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            stats: BroadcastStats::default(),
            started: now,
            last_report_time: now,
            report_interval,
        }
    }

    /// Record one chunk fanned out to the listener set.
    pub fn record_broadcast(&mut self, bytes: usize, outcome: BroadcastOutcome) {
        self.stats.chunks_broadcast += 1;
        self.stats.bytes_broadcast += bytes as u64;
        self.stats.deliveries_skipped += outcome.skipped as u64;
        self.stats.listeners_dropped += outcome.dropped as u64;
    }

    /// Record a track read to its end.
    pub fn record_track_finished(&mut self) {
        self.stats.tracks_finished += 1;
    }

    /// Record a track abandoned on an open or read error.
    pub fn record_track_failed(&mut self) {
        self.stats.tracks_failed += 1;
    }

    /// Get current counters.
    pub fn snapshot(&self) -> BroadcastStats {
        self.stats.clone()
    }

    /// Time since the engine started.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether the periodic report is due at `now`.
    pub fn report_due(&self, now: Instant) -> bool {
        now.duration_since(self.last_report_time) >= self.report_interval
    }

    /// Restart the report interval from `now`.
    pub fn mark_reported(&mut self, now: Instant) {
        self.last_report_time = now;
    }
}

impl Default for BroadcastMetrics {
    fn default() -> Self {
        Self::new(crate::STATS_LOG_INTERVAL)
    }
}
