//! Adapters Layer - Concrete implementations of ports
//!
//! - `feed`: JSON history provider, JSON-lines tick feed and signal sink
//! - `cli`: command-line surface

pub mod cli;
pub mod feed;
