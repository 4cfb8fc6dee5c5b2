use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use tracing::trace;

use crate::engine::types::{PriceLevel, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
struct LevelEntry {
    amount: f64,
    update_id: u64,
}

/// One side of the book: price -> (amount, update id).
///
/// Keys are kept ascending for both sides. The bid side reads best-to-worst
/// from the back of the map, the ask side from the front.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<OrderedFloat<f64>, LevelEntry>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self { side, levels: BTreeMap::new() }
    }

    pub fn bids() -> Self {
        Self::new(Side::Bid)
    }

    pub fn asks() -> Self {
        Self::new(Side::Ask)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Inserts the level, overwriting amount and update id in place when the
    /// price is already present. Returns the level it replaced.
    pub fn upsert(&mut self, level: PriceLevel) -> Option<PriceLevel> {
        let entry = LevelEntry { amount: level.amount(), update_id: level.update_id() };
        self.levels
            .insert(level.key(), entry)
            .map(|old| Self::to_level(&level.key(), &old))
    }

    pub fn remove(&mut self, price: f64) -> Option<PriceLevel> {
        let key = OrderedFloat(price);
        self.levels.remove(&key).map(|entry| Self::to_level(&key, &entry))
    }

    pub fn get(&self, price: f64) -> Option<PriceLevel> {
        let key = OrderedFloat(price);
        self.levels.get(&key).map(|entry| Self::to_level(&key, entry))
    }

    /// Top of book: highest bid or lowest ask.
    pub fn best(&self) -> Option<PriceLevel> {
        let best = match self.side {
            Side::Bid => self.levels.last_key_value(),
            Side::Ask => self.levels.first_key_value(),
        };
        best.map(|(key, entry)| Self::to_level(key, entry))
    }

    /// Removes the top of book and returns it.
    pub fn pop_best(&mut self) -> Option<PriceLevel> {
        let popped = match self.side {
            Side::Bid => self.levels.pop_last(),
            Side::Ask => self.levels.pop_first(),
        };
        popped.map(|(key, entry)| {
            trace!(side = %self.side, price = key.0, "Popped top of book");
            Self::to_level(&key, &entry)
        })
    }

    /// Walks the side best-to-worst.
    pub fn iter(&self) -> Box<dyn Iterator<Item = PriceLevel> + '_> {
        let levels = self.levels.iter().map(|(key, entry)| Self::to_level(key, entry));
        match self.side {
            Side::Bid => Box::new(levels.rev()),
            Side::Ask => Box::new(levels),
        }
    }

    pub fn top(&self, n: usize) -> Vec<PriceLevel> {
        self.iter().take(n).collect()
    }

    /// Total amount resting at `price` or better
    /// (bids at or above it, asks at or below it).
    pub fn depth_at(&self, price: f64) -> f64 {
        let key = OrderedFloat(price);
        match self.side {
            Side::Bid => self.levels.range(key..).map(|(_, e)| e.amount).sum(),
            Side::Ask => self.levels.range(..=key).map(|(_, e)| e.amount).sum(),
        }
    }

    fn to_level(key: &OrderedFloat<f64>, entry: &LevelEntry) -> PriceLevel {
        PriceLevel::new(key.0, entry.amount, entry.update_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(side: &BookSide) -> Vec<f64> {
        side.iter().map(|l| l.price()).collect()
    }

    #[test]
    fn test_empty_side() {
        let side = BookSide::bids();
        assert!(side.is_empty());
        assert_eq!(side.len(), 0);
        assert!(side.best().is_none());
        assert_eq!(side.depth_at(100.0), 0.0);
    }

    #[test]
    fn test_bid_best_is_highest() {
        let mut bids = BookSide::bids();
        bids.upsert(PriceLevel::new(99.0, 1.0, 1));
        bids.upsert(PriceLevel::new(101.0, 2.0, 2));
        bids.upsert(PriceLevel::new(100.0, 3.0, 3));

        assert_eq!(bids.best().unwrap().price(), 101.0);
        assert_eq!(prices(&bids), vec![101.0, 100.0, 99.0]);
    }

    #[test]
    fn test_ask_best_is_lowest() {
        let mut asks = BookSide::asks();
        asks.upsert(PriceLevel::new(102.0, 1.0, 1));
        asks.upsert(PriceLevel::new(100.5, 2.0, 2));
        asks.upsert(PriceLevel::new(101.0, 3.0, 3));

        assert_eq!(asks.best().unwrap().price(), 100.5);
        assert_eq!(prices(&asks), vec![100.5, 101.0, 102.0]);
    }

    #[test]
    fn test_upsert_updates_in_place() {
        let mut asks = BookSide::asks();
        assert!(asks.upsert(PriceLevel::new(100.0, 1.0, 1)).is_none());

        let replaced = asks.upsert(PriceLevel::new(100.0, 4.0, 7)).unwrap();
        assert_eq!(replaced.amount(), 1.0);
        assert_eq!(replaced.update_id(), 1);

        assert_eq!(asks.len(), 1);
        let level = asks.get(100.0).unwrap();
        assert_eq!(level.amount(), 4.0);
        assert_eq!(level.update_id(), 7);
    }

    #[test]
    fn test_remove_and_pop_best() {
        let mut bids = BookSide::bids();
        bids.upsert(PriceLevel::new(99.0, 1.0, 1));
        bids.upsert(PriceLevel::new(100.0, 1.0, 2));
        bids.upsert(PriceLevel::new(101.0, 1.0, 3));

        assert_eq!(bids.pop_best().unwrap().price(), 101.0);
        assert_eq!(bids.remove(99.0).unwrap().update_id(), 1);
        assert!(bids.remove(99.0).is_none());
        assert_eq!(prices(&bids), vec![100.0]);
    }

    #[test]
    fn test_top_and_depth() {
        let mut bids = BookSide::bids();
        let mut asks = BookSide::asks();
        for (i, p) in [98.0, 99.0, 100.0].into_iter().enumerate() {
            bids.upsert(PriceLevel::new(p, (i + 1) as f64, i as u64));
        }
        for (i, p) in [101.0, 102.0, 103.0].into_iter().enumerate() {
            asks.upsert(PriceLevel::new(p, (i + 1) as f64, i as u64));
        }

        let top: Vec<f64> = bids.top(2).iter().map(|l| l.price()).collect();
        assert_eq!(top, vec![100.0, 99.0]);
        let top: Vec<f64> = asks.top(2).iter().map(|l| l.price()).collect();
        assert_eq!(top, vec![101.0, 102.0]);

        // bids >= 99.0: 99.0 (2.0) + 100.0 (3.0)
        assert_eq!(bids.depth_at(99.0), 5.0);
        // asks <= 102.0: 101.0 (1.0) + 102.0 (2.0)
        assert_eq!(asks.depth_at(102.0), 3.0);
    }
}
