//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiration sweep: closes auctions whose lifetime has elapsed

mod lifecycle;
mod stats;
mod sweeper;

pub use lifecycle::{StoreLifecycle, SweeperState};
pub use stats::{SweepStats, SweepStatsSnapshot};
pub use sweeper::{expiry_cutoff, ExpirationSweeper};
