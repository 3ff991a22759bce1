//! Popularity score normalization and threshold filtering.
//!
//! The board shows a recommendation count per post: a plain integer, `爆` once
//! it passes the display limit, or `X` for a net-negative post.

use serde::Serialize;

use crate::records::ListingRecord;

pub const MAX_SENTINEL: &str = "爆";
pub const NEGATIVE_SENTINEL: &str = "X";
pub const MAX_SCORE: i64 = 100;
pub const NEGATIVE_SCORE: i64 = -1;
pub const DEFAULT_THRESHOLD: i64 = 40;

/// Map a raw popularity token to a numeric score.
pub fn normalize(token: &str) -> i64 {
    let token = token.trim();
    if token == MAX_SENTINEL {
        MAX_SCORE
    } else if token == NEGATIVE_SENTINEL {
        NEGATIVE_SCORE
    } else {
        token.parse().unwrap_or(0)
    }
}

/// Keep listings scoring at or above `threshold`, preserving input order.
pub fn filter(listings: &[ListingRecord], threshold: i64) -> Vec<ListingRecord> {
    listings
        .iter()
        .filter(|l| normalize(&l.raw_popularity) >= threshold)
        .cloned()
        .collect()
}

/// Token breakdown for the `stats` report.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PopularitySummary {
    pub total: usize,
    pub max_sentinel: usize,
    pub negative_sentinel: usize,
    pub numeric: usize,
    pub unparsed: usize,
    pub at_or_above: usize,
}

pub fn summarize(listings: &[ListingRecord], threshold: i64) -> PopularitySummary {
    let mut s = PopularitySummary {
        total: listings.len(),
        ..Default::default()
    };
    for l in listings {
        let token = l.raw_popularity.trim();
        match token {
            MAX_SENTINEL => s.max_sentinel += 1,
            NEGATIVE_SENTINEL => s.negative_sentinel += 1,
            t if t.parse::<i64>().is_ok() => s.numeric += 1,
            _ => s.unparsed += 1,
        }
        if normalize(token) >= threshold {
            s.at_or_above += 1;
        }
    }
    s
}
