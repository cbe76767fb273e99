//! Auction Sweeper - auction store with automatic expiration
//!
//! Auctions are created Active and a background sweep closes them once their
//! configured lifetime has elapsed.

pub mod auction;
pub mod config;
pub mod error;
pub mod tasks;

pub use auction::{AuctionRepository, DurationPolicy, InMemoryAuctionStore};
pub use config::Config;
pub use error::{AuctionError, Result};
pub use tasks::{StoreLifecycle, SweeperState};
