use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::types::{PriceLevel, Side};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read feed: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed message: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: invalid {side} level: price={price}, amount={amount}")]
    InvalidLevel { line: usize, side: Side, price: f64, amount: f64 },
}

pub type FeedResult<T> = Result<T, FeedError>;

/// Level rows of one feed message. Rows are `[price, amount]` pairs; every row
/// inherits the message's update id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMessage {
    pub symbol: String,
    pub update_id: u64,
    #[serde(default)]
    pub bids: Vec<(f64, f64)>,
    #[serde(default)]
    pub asks: Vec<(f64, f64)>,
}

impl BookMessage {
    pub fn bid_levels(&self) -> Vec<PriceLevel> {
        Self::to_levels(&self.bids, self.update_id)
    }

    pub fn ask_levels(&self) -> Vec<PriceLevel> {
        Self::to_levels(&self.asks, self.update_id)
    }

    fn to_levels(rows: &[(f64, f64)], update_id: u64) -> Vec<PriceLevel> {
        rows.iter().map(|&(price, amount)| PriceLevel::new(price, amount, update_id)).collect()
    }

    /// Rejects rows the book cannot hold: non-finite numbers or negative amounts.
    pub fn validate(&self, line: usize) -> FeedResult<()> {
        for (side, rows) in [(Side::Bid, &self.bids), (Side::Ask, &self.asks)] {
            for &(price, amount) in rows {
                if !price.is_finite() || !amount.is_finite() || amount < 0.0 {
                    return Err(FeedError::InvalidLevel { line, side, price, amount });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedMessage {
    Snapshot(BookMessage),
    Diff(BookMessage),
}

impl FeedMessage {
    pub fn body(&self) -> &BookMessage {
        match self {
            FeedMessage::Snapshot(body) | FeedMessage::Diff(body) => body,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.body().symbol
    }

    pub fn update_id(&self) -> u64 {
        self.body().update_id
    }
}
