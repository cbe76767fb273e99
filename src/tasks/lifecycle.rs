//! Store Lifecycle
//!
//! Owns the expiration sweeper for one store: building the lifecycle never
//! spawns anything, `start` launches the sweep under a cancellation scope and
//! `stop` cancels it and waits for the loop to exit.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::auction::{Clock, DurationPolicy, ExpirationStore, SystemClock};
use crate::config::Config;
use crate::error::{AuctionError, Result};
use crate::tasks::{ExpirationSweeper, SweepStats, SweepStatsSnapshot};

// == Sweeper State ==
/// Where the sweeper is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperState {
    NotStarted,
    Running,
    Stopped,
}

struct RunningSweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Store plus the sweeper that keeps its auctions' status current.
///
/// A lifecycle can be started once. Dropping it without calling
/// [`stop`](Self::stop) leaves the sweep running until the runtime shuts down.
pub struct StoreLifecycle<S> {
    store: Arc<S>,
    policy: DurationPolicy,
    clock: Arc<dyn Clock>,
    stats: Arc<SweepStats>,
    started: bool,
    running: Option<RunningSweeper>,
}

impl<S: ExpirationStore> StoreLifecycle<S> {
    // == Constructor ==
    /// Resolves the lifetime from `config` and uses the system clock.
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self::with_clock(store, DurationPolicy::from_config(config), Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, policy: DurationPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
            stats: Arc::new(SweepStats::new()),
            started: false,
            running: None,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    pub fn stats(&self) -> SweepStatsSnapshot {
        self.stats.snapshot()
    }

    /// Current state. A sweeper whose parent scope was cancelled reports
    /// `Stopped` even before [`stop`](Self::stop) is called.
    pub fn state(&self) -> SweeperState {
        match (&self.running, self.started) {
            (_, false) => SweeperState::NotStarted,
            (Some(running), true) if !running.handle.is_finished() => SweeperState::Running,
            _ => SweeperState::Stopped,
        }
    }

    // == Start ==
    /// Spawns the sweeper under a child of `cancel`.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the lifecycle was already started; a
    /// stopped sweeper is never restarted.
    pub fn start(&mut self, cancel: &CancellationToken) -> Result<()> {
        if self.started {
            return Err(AuctionError::InvalidRequest(
                "Expiration sweeper was already started".to_string(),
            ));
        }

        let child = cancel.child_token();
        let store: Arc<dyn ExpirationStore> = self.store.clone();
        let handle = ExpirationSweeper::new(store, self.policy, self.clock.clone())
            .with_stats(self.stats.clone())
            .spawn(child.clone());

        self.started = true;
        self.running = Some(RunningSweeper {
            cancel: child,
            handle,
        });
        Ok(())
    }

    // == Stop ==
    /// Cancels the sweeper and waits for its current tick to finish.
    ///
    /// Does nothing if the sweeper was never started or is already stopped.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            debug!("Expiration sweeper not running, nothing to stop");
            return;
        };

        running.cancel.cancel();
        if let Err(err) = running.handle.await {
            error!("Expiration sweeper task ended abnormally: {}", err);
        }
    }
}
