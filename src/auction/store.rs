//! Auction Store Module
//!
//! In-memory persistence for auctions and bids. Every mutation runs inside one
//! write-lock critical section, so readers never see a half-applied update.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::error;

use crate::auction::{Auction, AuctionFilter, AuctionRecord, AuctionStatus, Bid};
use crate::error::{AuctionError, Result};

// == Repository Traits ==
/// Operations the use-case layer performs against the store.
#[async_trait]
pub trait AuctionRepository: Send + Sync + 'static {
    async fn create_auction(&self, auction: &Auction) -> Result<()>;
    async fn find_auction_by_id(&self, id: &str) -> Result<Auction>;
    async fn find_auctions(&self, filter: &AuctionFilter) -> Result<Vec<Auction>>;
    /// Closes one auction ahead of its expiry. Returns false if it was already
    /// Completed.
    async fn close_auction(&self, id: &str) -> Result<bool>;
    /// Stores a bid only if its auction is still Active at write time.
    async fn create_bid(&self, bid: &Bid) -> Result<()>;
    async fn find_bids_by_auction_id(&self, auction_id: &str) -> Result<Vec<Bid>>;
    /// Highest bid for an auction; the earliest bid wins ties.
    async fn find_winning_bid(&self, auction_id: &str) -> Result<Bid>;
}

/// Bulk expiry transition, used only by the sweeper.
#[async_trait]
pub trait ExpirationStore: Send + Sync + 'static {
    /// Marks every Active auction created at or before `cutoff` as Completed
    /// in one atomic step. Returns how many auctions changed.
    async fn close_expired(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

// == Store State ==
#[derive(Debug, Default)]
struct StoreState {
    auctions: HashMap<String, AuctionRecord>,
    bids: HashMap<String, Vec<Bid>>,
}

// == In-Memory Store ==
/// Thread-safe auction store. Constructing it starts nothing in the
/// background; see [`crate::tasks::StoreLifecycle`].
#[derive(Debug, Default)]
pub struct InMemoryAuctionStore {
    state: RwLock<StoreState>,
}

impl InMemoryAuctionStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    /// Returns the number of stored auctions.
    pub async fn len(&self) -> usize {
        self.state.read().await.auctions.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.auctions.is_empty()
    }

    // == Records ==
    /// Snapshot of every persisted record, ordered by creation time then id.
    pub async fn records(&self) -> Vec<AuctionRecord> {
        let state = self.state.read().await;
        let mut records: Vec<AuctionRecord> = state.auctions.values().cloned().collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        records
    }
}

#[async_trait]
impl AuctionRepository for InMemoryAuctionStore {
    async fn create_auction(&self, auction: &Auction) -> Result<()> {
        let mut state = self.state.write().await;
        if state.auctions.contains_key(&auction.id) {
            error!("Error trying to insert auction {}: duplicate id", auction.id);
            return Err(AuctionError::Internal(
                "Error trying to insert auction".to_string(),
            ));
        }

        state
            .auctions
            .insert(auction.id.clone(), AuctionRecord::from(auction));
        Ok(())
    }

    async fn find_auction_by_id(&self, id: &str) -> Result<Auction> {
        let state = self.state.read().await;
        let record = state
            .auctions
            .get(id)
            .ok_or_else(|| AuctionError::NotFound(format!("auction {}", id)))?;
        Auction::try_from(record)
    }

    async fn find_auctions(&self, filter: &AuctionFilter) -> Result<Vec<Auction>> {
        let state = self.state.read().await;
        let mut records: Vec<&AuctionRecord> = state
            .auctions
            .values()
            .filter(|record| filter.matches(record))
            .collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        records.into_iter().map(Auction::try_from).collect()
    }

    async fn close_auction(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let record = state
            .auctions
            .get_mut(id)
            .ok_or_else(|| AuctionError::NotFound(format!("auction {}", id)))?;

        if record.status == AuctionStatus::Completed {
            return Ok(false);
        }
        record.status = AuctionStatus::Completed;
        Ok(true)
    }

    async fn create_bid(&self, bid: &Bid) -> Result<()> {
        let mut state = self.state.write().await;
        let status = state
            .auctions
            .get(&bid.auction_id)
            .map(|record| record.status)
            .ok_or_else(|| AuctionError::NotFound(format!("auction {}", bid.auction_id)))?;

        if status != AuctionStatus::Active {
            return Err(AuctionError::AuctionClosed(bid.auction_id.clone()));
        }

        state
            .bids
            .entry(bid.auction_id.clone())
            .or_default()
            .push(bid.clone());
        Ok(())
    }

    async fn find_bids_by_auction_id(&self, auction_id: &str) -> Result<Vec<Bid>> {
        let state = self.state.read().await;
        Ok(state.bids.get(auction_id).cloned().unwrap_or_default())
    }

    async fn find_winning_bid(&self, auction_id: &str) -> Result<Bid> {
        let state = self.state.read().await;
        if !state.auctions.contains_key(auction_id) {
            return Err(AuctionError::NotFound(format!("auction {}", auction_id)));
        }

        // Bids are appended in acceptance order, so a strict comparison keeps
        // the earliest of equal amounts.
        state
            .bids
            .get(auction_id)
            .and_then(|bids| {
                bids.iter().fold(None::<&Bid>, |best, bid| match best {
                    Some(current) if current.amount >= bid.amount => Some(current),
                    _ => Some(bid),
                })
            })
            .cloned()
            .ok_or_else(|| AuctionError::NotFound(format!("bids for auction {}", auction_id)))
    }
}

#[async_trait]
impl ExpirationStore for InMemoryAuctionStore {
    async fn close_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let cutoff_secs = cutoff.timestamp();
        let mut state = self.state.write().await;

        let mut modified = 0;
        for record in state.auctions.values_mut() {
            if record.status == AuctionStatus::Active && record.timestamp <= cutoff_secs {
                record.status = AuctionStatus::Completed;
                modified += 1;
            }
        }

        Ok(modified)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::ProductCondition;
    use chrono::TimeDelta;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn auction_at(created_at: DateTime<Utc>) -> Auction {
        Auction::new_at(
            "Camera",
            "Electronics",
            "Mirrorless camera body",
            ProductCondition::New,
            created_at,
        )
        .unwrap()
    }

    fn auction_in(category: &str) -> Auction {
        Auction::new(
            "Camera",
            category,
            "Mirrorless camera body",
            ProductCondition::Refurbished,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_store_new() {
        let store = InMemoryAuctionStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let store = InMemoryAuctionStore::new();
        let auction = auction_at(Utc::now());

        assert_ok!(store.create_auction(&auction).await);
        let found = store.find_auction_by_id(&auction.id).await.unwrap();

        assert_eq!(found, auction);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_id_fails() {
        let store = InMemoryAuctionStore::new();
        let auction = auction_at(Utc::now());

        store.create_auction(&auction).await.unwrap();
        let result = store.create_auction(&auction).await;
        assert!(matches!(result, Err(AuctionError::Internal(_))));
    }

    #[tokio::test]
    async fn test_find_nonexistent() {
        let store = InMemoryAuctionStore::new();
        let result = store.find_auction_by_id("missing").await;
        assert!(matches!(result, Err(AuctionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_auctions_by_filter() {
        let store = InMemoryAuctionStore::new();
        let phone = auction_in("Phones");
        let book = auction_in("Books");
        store.create_auction(&phone).await.unwrap();
        store.create_auction(&book).await.unwrap();
        store.close_auction(&book.id).await.unwrap();

        let all = store.find_auctions(&AuctionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = store
            .find_auctions(&AuctionFilter {
                status: Some(AuctionStatus::Active),
                category: None,
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, phone.id);

        let completed_books = store
            .find_auctions(&AuctionFilter {
                status: Some(AuctionStatus::Completed),
                category: Some("Books".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(completed_books.len(), 1);
        assert_eq!(completed_books[0].id, book.id);
    }

    #[tokio::test]
    async fn test_close_expired_respects_cutoff() {
        let store = InMemoryAuctionStore::new();
        let now = Utc::now();
        let expired = auction_at(now - TimeDelta::seconds(2));
        let fresh = auction_at(now);
        store.create_auction(&expired).await.unwrap();
        store.create_auction(&fresh).await.unwrap();

        let closed = store.close_expired(now - TimeDelta::seconds(1)).await.unwrap();
        assert_eq!(closed, 1);

        let expired = store.find_auction_by_id(&expired.id).await.unwrap();
        let fresh = store.find_auction_by_id(&fresh.id).await.unwrap();
        assert_eq!(expired.status, AuctionStatus::Completed);
        assert_eq!(fresh.status, AuctionStatus::Active);
    }

    #[tokio::test]
    async fn test_close_expired_boundary_is_inclusive() {
        let store = InMemoryAuctionStore::new();
        let auction = auction_at(Utc::now());
        store.create_auction(&auction).await.unwrap();

        assert_eq!(
            store
                .close_expired(auction.created_at - TimeDelta::seconds(1))
                .await
                .unwrap(),
            0
        );
        assert_eq!(store.close_expired(auction.created_at).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_close_expired_is_idempotent() {
        let store = InMemoryAuctionStore::new();
        let now = Utc::now();
        for offset in 1..=3 {
            store
                .create_auction(&auction_at(now - TimeDelta::minutes(offset)))
                .await
                .unwrap();
        }

        assert_eq!(store.close_expired(now).await.unwrap(), 3);
        let after_first = store.records().await;

        assert_eq!(store.close_expired(now).await.unwrap(), 0);
        assert_eq!(store.records().await, after_first);

        assert_eq!(store.close_expired(now + TimeDelta::hours(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_sweeps_close_each_auction_once() {
        let store = Arc::new(InMemoryAuctionStore::new());
        let now = Utc::now();
        for offset in 0..50 {
            store
                .create_auction(&auction_at(now - TimeDelta::seconds(offset)))
                .await
                .unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.close_expired(now).await.unwrap() })
            })
            .collect();

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }

        assert_eq!(total, 50);
        let active = store
            .find_auctions(&AuctionFilter {
                status: Some(AuctionStatus::Active),
                category: None,
            })
            .await
            .unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_close_auction_is_one_way() {
        let store = InMemoryAuctionStore::new();
        let auction = auction_at(Utc::now());
        store.create_auction(&auction).await.unwrap();

        assert!(store.close_auction(&auction.id).await.unwrap());
        assert!(!store.close_auction(&auction.id).await.unwrap());
        assert_eq!(store.close_expired(Utc::now()).await.unwrap(), 0);

        let found = store.find_auction_by_id(&auction.id).await.unwrap();
        assert_eq!(found.status, AuctionStatus::Completed);
        assert_err!(store.close_auction("missing").await);
    }

    #[tokio::test]
    async fn test_bid_accepted_while_active() {
        let store = InMemoryAuctionStore::new();
        let auction = auction_at(Utc::now());
        store.create_auction(&auction).await.unwrap();

        let bid = Bid::new("user-1", &auction.id, 100.0).unwrap();
        assert_ok!(store.create_bid(&bid).await);

        let bids = store.find_bids_by_auction_id(&auction.id).await.unwrap();
        assert_eq!(bids, vec![bid]);
    }

    #[tokio::test]
    async fn test_bid_rejected_after_close() {
        let store = InMemoryAuctionStore::new();
        let auction = auction_at(Utc::now() - TimeDelta::minutes(10));
        store.create_auction(&auction).await.unwrap();
        store.close_expired(Utc::now()).await.unwrap();

        let bid = Bid::new("user-1", &auction.id, 100.0).unwrap();
        let result = store.create_bid(&bid).await;

        assert!(matches!(result, Err(AuctionError::AuctionClosed(_))));
        assert!(store
            .find_bids_by_auction_id(&auction.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_bid_on_missing_auction() {
        let store = InMemoryAuctionStore::new();
        let bid = Bid::new("user-1", "missing", 5.0).unwrap();
        let result = store.create_bid(&bid).await;
        assert!(matches!(result, Err(AuctionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_winning_bid() {
        let store = InMemoryAuctionStore::new();
        let auction = auction_at(Utc::now());
        store.create_auction(&auction).await.unwrap();

        assert!(matches!(
            store.find_winning_bid(&auction.id).await,
            Err(AuctionError::NotFound(_))
        ));

        let low = Bid::new("user-1", &auction.id, 10.0).unwrap();
        let high = Bid::new("user-2", &auction.id, 50.0).unwrap();
        let tie = Bid::new("user-3", &auction.id, 50.0).unwrap();
        for bid in [&low, &high, &tie] {
            store.create_bid(bid).await.unwrap();
        }

        let winner = store.find_winning_bid(&auction.id).await.unwrap();
        assert_eq!(winner.id, high.id);
    }
}
