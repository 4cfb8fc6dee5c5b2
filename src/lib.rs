pub mod engine;    // price levels, book sides, crossing resolution
pub mod feed;      // recorded snapshot/diff messages
pub mod settings;  // file + env configuration
pub mod telemetry; // tracing + metrics setup

pub use engine::book::OrderBook;
pub use engine::cross::resolve_crossing;
pub use engine::side::BookSide;
pub use engine::types::{PriceLevel, Side};
