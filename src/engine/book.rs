use tracing::{debug, info, instrument, trace};

use crate::engine::cross::resolve_crossing;
use crate::engine::side::BookSide;
use crate::engine::types::PriceLevel;

/// Both sides of one symbol's book. Every snapshot or diff batch is followed
/// by crossing resolution, so readers never observe a crossed book.
#[derive(Debug, Clone)]
pub struct OrderBook {
    symbol: String,
    bids: BookSide,
    asks: BookSide,
    snapshot_uid: u64,
    last_diff_uid: u64,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        info!(symbol = %symbol, "Initialized new order book");
        Self {
            symbol,
            bids: BookSide::bids(),
            asks: BookSide::asks(),
            snapshot_uid: 0,
            last_diff_uid: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Update id of the last snapshot applied.
    pub fn snapshot_uid(&self) -> u64 {
        self.snapshot_uid
    }

    /// Update id of the last snapshot or diff batch applied.
    pub fn last_diff_uid(&self) -> u64 {
        self.last_diff_uid
    }

    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    /// Direct access for ingestion code that edits a side itself.
    /// Call [`OrderBook::resolve_crossing`] once both sides are updated.
    pub fn bids_mut(&mut self) -> &mut BookSide {
        &mut self.bids
    }

    pub fn asks_mut(&mut self) -> &mut BookSide {
        &mut self.asks
    }

    pub fn resolve_crossing(&mut self) {
        resolve_crossing(&mut self.bids, &mut self.asks);
    }

    /// Replaces both sides with the snapshot's levels. Zero-amount rows are dropped.
    #[instrument(skip_all, fields(symbol = %self.symbol, update_id = update_id))]
    pub fn apply_snapshot(&mut self, bids: &[PriceLevel], asks: &[PriceLevel], update_id: u64) {
        self.bids.clear();
        self.asks.clear();

        for level in bids.iter().filter(|l| l.amount() != 0.0) {
            self.bids.upsert(*level);
        }
        for level in asks.iter().filter(|l| l.amount() != 0.0) {
            self.asks.upsert(*level);
        }

        self.snapshot_uid = update_id;
        self.last_diff_uid = update_id;
        self.resolve_crossing();

        debug!(bid_levels = self.bids.len(), ask_levels = self.asks.len(), "Applied snapshot");
    }

    /// Applies a batch of level changes. A zero amount deletes the price level,
    /// anything else inserts or overwrites it.
    #[instrument(skip_all, fields(symbol = %self.symbol, update_id = update_id))]
    pub fn apply_diffs(&mut self, bids: &[PriceLevel], asks: &[PriceLevel], update_id: u64) {
        for level in bids {
            Self::apply_level(&mut self.bids, level);
        }
        for level in asks {
            Self::apply_level(&mut self.asks, level);
        }

        self.last_diff_uid = update_id;
        self.resolve_crossing();

        trace!(bid_levels = self.bids.len(), ask_levels = self.asks.len(), "Applied diffs");
    }

    fn apply_level(side: &mut BookSide, level: &PriceLevel) {
        if level.amount() == 0.0 {
            side.remove(level.price());
        } else {
            side.upsert(*level);
        }
    }

    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.best()
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.best()
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some(ask.price() - bid.price())
    }

    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.price() + ask.price()) / 2.0)
    }

    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price() >= ask.price(),
            _ => false,
        }
    }

    pub fn top_bids(&self, n: usize) -> Vec<PriceLevel> {
        self.bids.top(n)
    }

    pub fn top_asks(&self, n: usize) -> Vec<PriceLevel> {
        self.asks.top(n)
    }

    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.snapshot_uid = 0;
        self.last_diff_uid = 0;
    }
}
