use std::collections::VecDeque;
use std::io::BufRead;

use tracing::{debug, info, warn};

use crate::engine::book::OrderBook;
use crate::feed::types::{BookMessage, FeedError, FeedMessage, FeedResult};

/// Recent diffs kept for re-application when a snapshot arrives late.
pub const PAST_DIFF_WINDOW_SIZE: usize = 32;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub snapshots: usize,
    pub diffs: usize,
    pub rejected: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Diff older than the book's snapshot.
    Stale,
    OtherSymbol,
}

/// Parses one JSON line. Blank lines and `#` comments yield `None`.
pub fn parse_line(raw: &str, line: usize) -> FeedResult<Option<FeedMessage>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let msg: FeedMessage =
        serde_json::from_str(trimmed).map_err(|source| FeedError::Malformed { line, source })?;
    msg.body().validate(line)?;
    Ok(Some(msg))
}

/// Feeds messages for one symbol into its book.
///
/// Diffs with an update id below the current snapshot's are rejected. Applied
/// diffs are remembered in a bounded window; when a snapshot lands, the
/// remembered diffs newer than it are applied on top.
#[derive(Debug)]
pub struct BookTracker {
    book: OrderBook,
    past_diffs: VecDeque<BookMessage>,
    window: usize,
}

impl BookTracker {
    pub fn new(book: OrderBook) -> Self {
        Self::with_window(book, PAST_DIFF_WINDOW_SIZE)
    }

    pub fn with_window(book: OrderBook, window: usize) -> Self {
        Self { book, past_diffs: VecDeque::with_capacity(window), window }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn into_book(self) -> OrderBook {
        self.book
    }

    pub fn past_diffs(&self) -> usize {
        self.past_diffs.len()
    }

    pub fn apply_message(&mut self, msg: &FeedMessage) -> ApplyOutcome {
        if msg.symbol() != self.book.symbol() {
            return ApplyOutcome::OtherSymbol;
        }

        match msg {
            FeedMessage::Snapshot(body) => {
                self.restore_from_snapshot(body);
                ApplyOutcome::Applied
            }
            FeedMessage::Diff(body) => {
                if body.update_id < self.book.snapshot_uid() {
                    return ApplyOutcome::Stale;
                }
                self.book.apply_diffs(&body.bid_levels(), &body.ask_levels(), body.update_id);

                self.past_diffs.push_back(body.clone());
                while self.past_diffs.len() > self.window {
                    self.past_diffs.pop_front();
                }
                ApplyOutcome::Applied
            }
        }
    }

    fn restore_from_snapshot(&mut self, snapshot: &BookMessage) {
        self.book
            .apply_snapshot(&snapshot.bid_levels(), &snapshot.ask_levels(), snapshot.update_id);

        let mut restored = 0usize;
        for diff in self.past_diffs.iter().filter(|d| d.update_id > snapshot.update_id) {
            self.book.apply_diffs(&diff.bid_levels(), &diff.ask_levels(), diff.update_id);
            restored += 1;
        }
        if restored > 0 {
            debug!(restored, snapshot_uid = snapshot.update_id, "Re-applied diffs newer than snapshot");
        }
    }
}

/// Replays a JSON-lines feed through `tracker`, in file order.
pub fn replay<R: BufRead>(reader: R, tracker: &mut BookTracker) -> FeedResult<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (idx, raw) in reader.lines().enumerate() {
        let line = idx + 1;
        let raw = raw?;
        let Some(msg) = parse_line(&raw, line)? else {
            continue;
        };

        match tracker.apply_message(&msg) {
            ApplyOutcome::OtherSymbol => {
                warn!(line, symbol = msg.symbol(), expected = tracker.book().symbol(), "Skipping message for other symbol");
                stats.skipped += 1;
            }
            ApplyOutcome::Stale => {
                warn!(
                    line,
                    update_id = msg.update_id(),
                    snapshot_uid = tracker.book().snapshot_uid(),
                    "Rejecting diff older than snapshot"
                );
                stats.rejected += 1;
            }
            ApplyOutcome::Applied => {
                match &msg {
                    FeedMessage::Snapshot(_) => stats.snapshots += 1,
                    FeedMessage::Diff(_) => stats.diffs += 1,
                }
                debug!(line, update_id = msg.update_id(), "Applied feed message");
            }
        }
    }

    metrics::counter!("uncross_feed_messages_total").increment((stats.snapshots + stats.diffs) as u64);
    metrics::counter!("uncross_feed_rejected_total").increment(stats.rejected as u64);
    info!(
        snapshots = stats.snapshots,
        diffs = stats.diffs,
        rejected = stats.rejected,
        skipped = stats.skipped,
        "Feed replay completed"
    );
    Ok(stats)
}
