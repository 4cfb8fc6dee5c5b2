//! Crossed-book repair.
//!
//! After a batch of level updates has been applied to both sides, the best bid
//! may sit at or above the best ask. The side whose top level carries the older
//! update id has not caught up with the market yet, so its top level is dropped.
//! This repeats until the top-of-book pair no longer crosses or a side runs dry.

use tracing::{debug, instrument};

use crate::engine::side::BookSide;
use crate::engine::types::Side;

/// Removes stale top-of-book levels until every remaining bid is priced
/// strictly below every remaining ask.
///
/// When the tops cross or touch, the ask is removed if the bid's update id is
/// strictly greater; otherwise (equal ids included) the bid is removed.
/// Levels outside the crossed region are left alone.
#[instrument(level = "trace", skip_all, fields(bid_levels = bids.len(), ask_levels = asks.len()))]
pub fn resolve_crossing(bids: &mut BookSide, asks: &mut BookSide) {
    debug_assert_eq!(bids.side(), Side::Bid);
    debug_assert_eq!(asks.side(), Side::Ask);

    let mut bids_removed = 0u64;
    let mut asks_removed = 0u64;

    while let (Some(top_bid), Some(top_ask)) = (bids.best(), asks.best()) {
        if top_bid.price() < top_ask.price() {
            break;
        }

        if top_bid.update_id() > top_ask.update_id() {
            asks.pop_best();
            asks_removed += 1;
            debug!(
                price = top_ask.price(),
                update_id = top_ask.update_id(),
                bid_update_id = top_bid.update_id(),
                "Removed stale ask"
            );
        } else {
            bids.pop_best();
            bids_removed += 1;
            debug!(
                price = top_bid.price(),
                update_id = top_bid.update_id(),
                ask_update_id = top_ask.update_id(),
                "Removed stale bid"
            );
        }
    }

    if bids_removed + asks_removed > 0 {
        metrics::counter!("uncross_levels_removed_total", "side" => "bid").increment(bids_removed);
        metrics::counter!("uncross_levels_removed_total", "side" => "ask").increment(asks_removed);
        debug!(bids_removed, asks_removed, "Resolved crossed book");
    }
}
