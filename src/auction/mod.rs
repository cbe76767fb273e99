//! Auction Module
//!
//! Auction entities, the lifetime policy, the clock abstraction and the store.

mod clock;
mod entity;
mod policy;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entity::{
    truncate_to_seconds, Auction, AuctionFilter, AuctionRecord, AuctionStatus, Bid,
    ProductCondition,
};
pub use policy::{
    parse_duration, DurationPolicy, DEFAULT_AUCTION_LIFETIME, MAX_SWEEP_INTERVAL,
    MIN_SWEEP_INTERVAL,
};
pub use store::{AuctionRepository, ExpirationStore, InMemoryAuctionStore};
