//! Randomized pauses between requests so the board is never hammered.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::config::PolitenessConfig;

/// Inclusive range of seconds to wait.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DelayRange {
    pub min: f64,
    pub max: f64,
}

impl DelayRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both bounds finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.min, self.max].iter().all(|b| b.is_finite() && *b >= 0.0)
    }

    /// Uniform draw from the range, rounded to two decimals.
    /// Invalid ranges sample as zero.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let secs = if lo == hi { lo } else { rng.gen_range(lo..=hi) };
        (secs * 100.0).round() / 100.0
    }
}

/// Holds the two named delay ranges.
#[derive(Debug, Clone)]
pub struct Politeness {
    post: DelayRange,
    page: DelayRange,
}

impl Politeness {
    pub fn new(config: &PolitenessConfig) -> Self {
        Self {
            post: config.post_delay,
            page: config.page_delay,
        }
    }

    /// Pause after fetching a single post.
    pub async fn after_post(&self) {
        pause(self.post).await;
    }

    /// Pause after fetching a listing page.
    pub async fn after_page(&self) {
        pause(self.page).await;
    }
}

pub async fn pause(range: DelayRange) {
    let secs = range.sample(&mut rand::thread_rng()).max(0.0);
    if secs == 0.0 {
        return;
    }
    debug!("Sleeping {:.2}s", secs);
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}
