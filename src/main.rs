//! Auction Sweeper - auction store with automatic expiration
//!
//! Runs the in-memory auction store together with its expiration sweep until
//! the process is asked to shut down.

use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auction_sweeper::{Config, InMemoryAuctionStore, StoreLifecycle};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the auction store
/// 4. Start the expiration sweep under a root cancellation token
/// 5. Wait for SIGINT/SIGTERM, then cancel and wait for the sweep to stop
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auction_sweeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting auction sweeper");

    let config = Config::from_env();
    let store = Arc::new(InMemoryAuctionStore::new());
    let mut lifecycle = StoreLifecycle::new(store, &config);
    info!(
        "Configuration loaded: lifetime={:?}, sweep_interval={:?}",
        lifecycle.policy().lifetime(),
        lifecycle.policy().sweep_interval()
    );

    let shutdown = CancellationToken::new();
    lifecycle.start(&shutdown)?;

    shutdown_signal().await?;
    shutdown.cancel();
    lifecycle.stop().await;

    let stats = lifecycle.stats();
    info!(
        "Shutdown complete: ticks={}, closed={}, failed_ticks={}",
        stats.ticks, stats.closed, stats.failures
    );
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
