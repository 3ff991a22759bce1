//! Incremental harvester for PTT-style discussion boards.
//!
//! Walks the newest index pages of a board, keeps listings above a popularity
//! threshold, and appends the body of every post not captured before to a CSV
//! table.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod harvest;
pub mod parser;
pub mod pipeline;
pub mod politeness;
pub mod popularity;
pub mod records;
pub mod store;

pub use config::Config;
pub use pipeline::Pipeline;
pub use records::{ContentRecord, ListingRecord};
