pub mod content;
pub mod lines;
pub mod listing;

pub use content::parse_post;
pub use listing::{parse_frontier, parse_listings};
