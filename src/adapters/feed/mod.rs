//! File-backed feed adapters
//!
//! JSON history for warm-up, a JSON-lines tick stream and a JSON-lines
//! signal sink. Used by the `run` command.

mod history_file;
mod sink;
mod ticks;

pub use history_file::JsonHistoryFile;
pub use sink::JsonLinesSink;
pub use ticks::{FeedBatch, FeedEvent, TickFeed, TickRecord};
