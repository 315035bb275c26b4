//! Read-side cache invalidation.
//!
//! A confirmed transaction changes markets, positions, stats and listings. Consumers re-fetch
//! whatever the pipeline invalidates.

use crate::types::OperationParams;
use dashmap::DashMap;
use serde_json::Value;
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use tracing::{debug, trace};

/// A family of cached reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Market listings.
    Markets,
    /// Positions of the user.
    UserPositions,
    /// Aggregate stats of the user.
    UserStats,
    /// P2P listings, for one market or all of them.
    Listings {
        /// Market the listings belong to, `None` for every market.
        market_id: Option<String>,
    },
}

impl CacheKey {
    /// Returns the scope name of the key.
    pub const fn scope(&self) -> &'static str {
        match self {
            Self::Markets => "markets",
            Self::UserPositions => "user-positions",
            Self::UserStats => "user-stats",
            Self::Listings { .. } => "p2p-listings",
        }
    }

    /// Returns the keys a confirmed transaction for `params` makes stale.
    pub fn invalidated_by(params: &OperationParams) -> Vec<Self> {
        vec![
            Self::Markets,
            Self::UserPositions,
            Self::UserStats,
            Self::Listings { market_id: params.market_id().map(str::to_string) },
        ]
    }

    /// Whether invalidating `self` also invalidates `other`.
    fn covers(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Listings { market_id: None }, Self::Listings { .. }) => true,
            (Self::Listings { market_id: Some(_) }, Self::Listings { market_id: None }) => true,
            _ => self == other,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listings { market_id: Some(market_id) } => {
                write!(f, "{}/{market_id}", self.scope())
            }
            _ => f.write_str(self.scope()),
        }
    }
}

/// Receives invalidation signals.
pub trait CacheInvalidator: fmt::Debug + Send + Sync {
    /// Marks everything under `key` as stale.
    fn invalidate(&self, key: &CacheKey);
}

/// In-process cache of read results.
///
/// Invalidating a market's listings also drops the all-markets listing, and invalidating all
/// listings drops every market's listing.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<CacheKey, Value>,
    generation: AtomicU64,
}

impl QueryCache {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value of `key`.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let entry = self.entries.get(key)?;
        trace!(%key, "Query cache HIT");
        Some(entry.value().clone())
    }

    /// Caches `value` under `key`.
    pub fn insert(&self, key: CacheKey, value: Value) {
        self.entries.insert(key, value);
    }

    /// Number of invalidations so far. Consumers compare it to notice stale reads.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheInvalidator for QueryCache {
    fn invalidate(&self, key: &CacheKey) {
        let before = self.entries.len();
        self.entries.retain(|cached, _| !key.covers(cached));
        self.generation.fetch_add(1, Ordering::AcqRel);
        debug!(%key, dropped = before.saturating_sub(self.entries.len()), "Invalidated cached reads");
    }
}
