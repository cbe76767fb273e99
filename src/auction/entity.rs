//! Auction Entity Module
//!
//! Defines auctions and bids along with the record shape the store persists.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuctionError, Result};

// == Validation Limits ==
const MIN_PRODUCT_NAME_LEN: usize = 2;
const MIN_CATEGORY_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 11;

// == Auction Status ==
/// Lifecycle status of an auction. Only moves Active -> Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AuctionStatus {
    Active,
    Completed,
}

impl From<AuctionStatus> for u8 {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Active => 0,
            AuctionStatus::Completed => 1,
        }
    }
}

impl TryFrom<u8> for AuctionStatus {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(AuctionStatus::Active),
            1 => Ok(AuctionStatus::Completed),
            other => Err(format!("invalid auction status {}", other)),
        }
    }
}

// == Product Condition ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProductCondition {
    New,
    Used,
    Refurbished,
}

impl From<ProductCondition> for u8 {
    fn from(condition: ProductCondition) -> Self {
        match condition {
            ProductCondition::New => 1,
            ProductCondition::Used => 2,
            ProductCondition::Refurbished => 3,
        }
    }
}

impl TryFrom<u8> for ProductCondition {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ProductCondition::New),
            2 => Ok(ProductCondition::Used),
            3 => Ok(ProductCondition::Refurbished),
            other => Err(format!("invalid product condition {}", other)),
        }
    }
}

// == Auction ==
/// An auction as seen by the use-case layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Auction {
    pub id: String,
    pub product_name: String,
    pub category: String,
    pub description: String,
    pub condition: ProductCondition,
    pub status: AuctionStatus,
    /// Creation time, whole-second precision. Expiry is measured from here.
    pub created_at: DateTime<Utc>,
}

impl Auction {
    // == Constructor ==
    /// Creates a new Active auction stamped with the current time.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if any text field is shorter than allowed.
    pub fn new(
        product_name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        condition: ProductCondition,
    ) -> Result<Self> {
        Self::new_at(product_name, category, description, condition, Utc::now())
    }

    /// Creates a new Active auction with an explicit creation time.
    ///
    /// The timestamp is truncated to whole seconds, matching what the store
    /// persists.
    pub fn new_at(
        product_name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        condition: ProductCondition,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let auction = Self {
            id: Uuid::new_v4().to_string(),
            product_name: product_name.into(),
            category: category.into(),
            description: description.into(),
            condition,
            status: AuctionStatus::Active,
            created_at: truncate_to_seconds(created_at),
        };

        if let Some(error_msg) = auction.validate() {
            return Err(AuctionError::InvalidRequest(error_msg));
        }

        Ok(auction)
    }

    // == Validate ==
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.product_name.chars().count() < MIN_PRODUCT_NAME_LEN {
            return Some(format!(
                "Product name must have at least {} characters",
                MIN_PRODUCT_NAME_LEN
            ));
        }
        if self.category.chars().count() < MIN_CATEGORY_LEN {
            return Some(format!(
                "Category must have at least {} characters",
                MIN_CATEGORY_LEN
            ));
        }
        if self.description.chars().count() < MIN_DESCRIPTION_LEN {
            return Some(format!(
                "Description must have at least {} characters",
                MIN_DESCRIPTION_LEN
            ));
        }
        None
    }

    /// True when the auction is Active and was created at or before `cutoff`.
    pub fn is_expired_at(&self, cutoff: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && self.created_at <= cutoff
    }
}

// == Auction Record ==
/// Persisted shape of an auction.
///
/// Enums are stored as their integer codes and the creation time as whole
/// seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionRecord {
    pub id: String,
    pub product_name: String,
    pub category: String,
    pub description: String,
    pub condition: ProductCondition,
    pub status: AuctionStatus,
    pub timestamp: i64,
}

impl From<&Auction> for AuctionRecord {
    fn from(auction: &Auction) -> Self {
        Self {
            id: auction.id.clone(),
            product_name: auction.product_name.clone(),
            category: auction.category.clone(),
            description: auction.description.clone(),
            condition: auction.condition,
            status: auction.status,
            timestamp: auction.created_at.timestamp(),
        }
    }
}

impl TryFrom<&AuctionRecord> for Auction {
    type Error = AuctionError;

    fn try_from(record: &AuctionRecord) -> Result<Self> {
        let created_at = DateTime::from_timestamp(record.timestamp, 0).ok_or_else(|| {
            AuctionError::Internal(format!(
                "Auction {} has an out-of-range timestamp {}",
                record.id, record.timestamp
            ))
        })?;

        Ok(Self {
            id: record.id.clone(),
            product_name: record.product_name.clone(),
            category: record.category.clone(),
            description: record.description.clone(),
            condition: record.condition,
            status: record.status,
            created_at,
        })
    }
}

// == Auction Filter ==
/// Criteria for listing auctions. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuctionFilter {
    pub status: Option<AuctionStatus>,
    pub category: Option<String>,
}

impl AuctionFilter {
    pub fn matches(&self, record: &AuctionRecord) -> bool {
        self.status.map_or(true, |status| record.status == status)
            && self
                .category
                .as_deref()
                .map_or(true, |category| record.category == category)
    }
}

// == Bid ==
/// A bid placed against an auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub user_id: String,
    pub auction_id: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Bid {
    /// Creates a new bid stamped with the current time.
    ///
    /// # Errors
    /// Returns `InvalidRequest` for empty ids or a non-positive amount.
    pub fn new(
        user_id: impl Into<String>,
        auction_id: impl Into<String>,
        amount: f64,
    ) -> Result<Self> {
        let bid = Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            auction_id: auction_id.into(),
            amount,
            created_at: Utc::now(),
        };

        if bid.user_id.is_empty() || bid.auction_id.is_empty() {
            return Err(AuctionError::InvalidRequest(
                "Bid requires a user id and an auction id".to_string(),
            ));
        }
        if !bid.amount.is_finite() || bid.amount <= 0.0 {
            return Err(AuctionError::InvalidRequest(format!(
                "Bid amount must be positive, got {}",
                bid.amount
            )));
        }

        Ok(bid)
    }
}

// == Utility Functions ==
/// Drops sub-second precision from a timestamp.
pub fn truncate_to_seconds(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::seconds(1)).unwrap_or(ts)
}
