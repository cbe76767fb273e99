//! Sweep Statistics Module
//!
//! Counters describing what the expiration sweeper has done so far.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Sweep Stats ==
/// Shared, lock-free sweep counters.
#[derive(Debug, Default)]
pub struct SweepStats {
    ticks: AtomicU64,
    closed: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`SweepStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStatsSnapshot {
    /// Completed ticks, successful or not
    pub ticks: u64,
    /// Auctions moved to Completed by the sweeper
    pub closed: u64,
    /// Ticks whose store call failed
    pub failures: u64,
}

impl SweepStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Success ==
    pub fn record_success(&self, closed: u64) {
        self.closed.fetch_add(closed, Ordering::Relaxed);
        self.ticks.fetch_add(1, Ordering::Release);
    }

    // == Record Failure ==
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.ticks.fetch_add(1, Ordering::Release);
    }

    // == Snapshot ==
    pub fn snapshot(&self) -> SweepStatsSnapshot {
        SweepStatsSnapshot {
            ticks: self.ticks.load(Ordering::Acquire),
            closed: self.closed.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
