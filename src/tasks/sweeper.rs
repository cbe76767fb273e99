//! Expiration Sweeper
//!
//! Background task that periodically closes auctions whose lifetime has
//! elapsed.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::auction::{Clock, DurationPolicy, ExpirationStore};
use crate::tasks::SweepStats;

/// Periodic reconciliation of expired auctions against one store.
///
/// Each tick computes `cutoff = now - lifetime` and asks the store to close
/// every Active auction created at or before it. A failed tick is logged and
/// the next tick acts as the retry.
pub struct ExpirationSweeper {
    store: Arc<dyn ExpirationStore>,
    clock: Arc<dyn Clock>,
    policy: DurationPolicy,
    stats: Arc<SweepStats>,
}

impl ExpirationSweeper {
    pub fn new(
        store: Arc<dyn ExpirationStore>,
        policy: DurationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
            stats: Arc::new(SweepStats::new()),
        }
    }

    /// Shares an existing stats sink instead of the sweeper's own.
    pub fn with_stats(mut self, stats: Arc<SweepStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> Arc<SweepStats> {
        self.stats.clone()
    }

    /// Spawns [`run`](Self::run) onto the tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Ticks until `cancel` fires.
    ///
    /// The interval is fixed from the policy when the loop starts. The first
    /// tick happens one interval after start, ticks never overlap, and
    /// cancellation is only observed between ticks so an in-flight store
    /// update always completes.
    pub async fn run(self, cancel: CancellationToken) {
        let period = self.policy.sweep_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Auction expiration sweeper started: lifetime={:?}, interval={:?}",
            self.policy.lifetime(),
            period
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.tick().await;
        }

        info!("Auction expiration sweeper stopped");
    }

    // == Tick ==
    async fn tick(&self) {
        let Some(cutoff) = expiry_cutoff(self.clock.now(), self.policy) else {
            debug!("Expiration sweep: lifetime exceeds representable time, nothing to close");
            self.stats.record_success(0);
            return;
        };

        match self.store.close_expired(cutoff).await {
            Ok(closed) => {
                if closed > 0 {
                    info!("Expiration sweep: closed {} expired auctions", closed);
                } else {
                    debug!("Expiration sweep: no expired auctions found");
                }
                self.stats.record_success(closed);
            }
            Err(err) => {
                error!("Error trying to close expired auctions: {}", err);
                self.stats.record_failure();
            }
        }
    }
}

/// `now - lifetime`, or None when that underflows the calendar.
pub fn expiry_cutoff(now: DateTime<Utc>, policy: DurationPolicy) -> Option<DateTime<Utc>> {
    TimeDelta::from_std(policy.lifetime())
        .ok()
        .and_then(|lifetime| now.checked_sub_signed(lifetime))
}
