//! Error types for the auction store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Auction Error Enum ==
/// Unified error type for store operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuctionError {
    /// Auction or bid not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid entity data or lifecycle misuse
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Auction is no longer accepting bids
    #[error("Auction closed: {0}")]
    AuctionClosed(String),

    /// Store failure (connectivity, serialization, poisoned state)
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Duration Parse Error ==
/// Reasons a duration expression is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration expression")]
    Empty,

    #[error("expected a number at position {0}")]
    MissingNumber(usize),

    #[error("missing unit after {0}")]
    MissingUnit(u64),

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("duration overflows")]
    Overflow,

    #[error("duration must be greater than zero")]
    Zero,
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, AuctionError>;
