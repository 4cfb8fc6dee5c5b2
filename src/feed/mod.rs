// Recorded feed messages and their replay into an OrderBook
pub mod types;
pub use types::*;
pub mod replay;
