use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use uncross_rs::feed::replay::{self, BookTracker};
use uncross_rs::settings::Settings;
use uncross_rs::{telemetry, OrderBook, PriceLevel};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replays a recorded order book feed and prints the uncrossed book")]
struct Cli {
    /// JSON-lines file of snapshot/diff messages.
    feed: PathBuf,

    /// Optional settings file (toml, yaml or json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Symbol to track; overrides the settings value.
    #[arg(short, long)]
    symbol: Option<String>,

    /// Levels per side to print; overrides the settings value.
    #[arg(short, long)]
    depth: Option<usize>,
}

fn format_levels(levels: &[PriceLevel]) -> String {
    levels
        .iter()
        .map(|l| format!("{} @ {} (#{})", l.amount(), l.price(), l.update_id()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_state_summary(book: &OrderBook, depth: usize) {
    println!("\n=== {} Book State Summary ===", book.symbol());
    println!(
        "Bid levels: {}, Ask levels: {}, Last update: {}",
        book.bids().len(),
        book.asks().len(),
        book.last_diff_uid()
    );

    match book.best_bid() {
        Some(bid) => println!("Best bid: {} @ {}", bid.amount(), bid.price()),
        None => println!("Best bid: None"),
    }
    match book.best_ask() {
        Some(ask) => println!("Best ask: {} @ {}", ask.amount(), ask.price()),
        None => println!("Best ask: None"),
    }
    match book.spread() {
        Some(spread) => println!("Spread: {}", spread),
        None => println!("Spread: N/A"),
    }

    println!("Top {} bids: {}", depth, format_levels(&book.top_bids(depth)));
    println!("Top {} asks: {}", depth, format_levels(&book.top_asks(depth)));
    println!("========================\n");
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(symbol) = cli.symbol {
        settings.symbol = symbol;
    }
    if let Some(depth) = cli.depth {
        settings.depth = depth;
    }
    settings.validate()?;

    telemetry::init_tracing(&settings.log_filter);
    telemetry::init_metrics()?;
    info!(symbol = %settings.symbol, feed = %cli.feed.display(), "Starting feed replay");

    let file = File::open(&cli.feed)
        .with_context(|| format!("opening feed file {}", cli.feed.display()))?;

    let book = OrderBook::new(settings.symbol.clone());
    let mut tracker = BookTracker::with_window(book, settings.diff_window);
    let stats = replay::replay(BufReader::new(file), &mut tracker)?;

    println!(
        "Replayed {} snapshots and {} diffs ({} rejected as stale, {} skipped)",
        stats.snapshots, stats.diffs, stats.rejected, stats.skipped
    );
    print_state_summary(tracker.book(), settings.depth);

    Ok(())
}
