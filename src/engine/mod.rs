// Order book engine entrypoint
pub mod types;  // price level value type + side tag
pub mod side;   // one price-ordered side of the book
pub mod cross;  // crossed-book repair
pub mod book;   // both sides + snapshot/diff application
