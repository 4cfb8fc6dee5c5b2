use std::cmp::Ordering;
use std::fmt;

use ordered_float::OrderedFloat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount resting at one price on one side of the book, stamped with the
/// feed sequence number of the update that last touched it.
///
/// Ordering and equality look at `price` only. Two levels with the same
/// price compare equal no matter what their amount or update id is.
#[derive(Debug, Clone, Copy)]
pub struct PriceLevel {
    price: f64,
    amount: f64,
    update_id: u64,
}

impl PriceLevel {
    pub fn new(price: f64, amount: f64, update_id: u64) -> Self {
        Self { price, amount, update_id }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn update_id(&self) -> u64 {
        self.update_id
    }

    /// Price times amount at this level.
    pub fn notional(&self) -> f64 {
        self.price * self.amount
    }

    pub(crate) fn key(&self) -> OrderedFloat<f64> {
        OrderedFloat(self.price)
    }
}

impl PartialEq for PriceLevel {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PriceLevel {}

impl PartialOrd for PriceLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriceLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
