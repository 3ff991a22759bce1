use std::collections::HashSet;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::fetch::Fetcher;
use crate::parser::parse_post;
use crate::politeness::Politeness;
use crate::records::{ContentRecord, ListingRecord, PostContent};
use crate::store;

/// Harvest stats returned after completion.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestStats {
    /// Listings handed in.
    pub candidates: usize,
    /// Already present in the content table before this run.
    pub skipped_existing: usize,
    /// Same link appearing more than once in this batch.
    pub skipped_duplicate: usize,
    /// Posts fetched and parsed.
    pub fetched: usize,
    /// Posts whose fetch or parse produced nothing; stored with empty fields.
    pub empty: usize,
    pub written: usize,
    pub write_errors: usize,
}

/// Fetch one post and pull out its fields.
pub async fn extract_post(fetcher: &Fetcher, url: &str) -> Option<PostContent> {
    let html = fetcher.fetch(url).await?;
    let post = parse_post(&html);
    if post.is_none() {
        debug!("No content region in {}", url);
    }
    post
}

/// Appends content rows for listings not yet in the content table.
pub struct Harvester<'a> {
    fetcher: &'a Fetcher,
    politeness: &'a Politeness,
}

impl<'a> Harvester<'a> {
    pub fn new(fetcher: &'a Fetcher, politeness: &'a Politeness) -> Self {
        Self { fetcher, politeness }
    }

    /// Fetch every listing whose link is not already stored in `table`, appending
    /// one row per link as soon as it is extracted.
    pub async fn harvest(&self, listings: &[ListingRecord], table: &Path) -> HarvestStats {
        let mut stored = existing_links(table);
        let pending: Vec<&ListingRecord> = listings.iter().filter(|l| !stored.contains(&l.link)).collect();

        let mut stats = HarvestStats {
            candidates: listings.len(),
            skipped_existing: listings.len() - pending.len(),
            ..Default::default()
        };
        info!("New links to fetch: {}", pending.len());

        let pb = progress_bar(pending.len());
        for listing in pending {
            pb.inc(1);
            if stored.contains(&listing.link) {
                stats.skipped_duplicate += 1;
                continue;
            }

            let post = extract_post(self.fetcher, &listing.link).await;
            match post {
                Some(_) => stats.fetched += 1,
                None => stats.empty += 1,
            }

            let record = ContentRecord::new(listing.clone(), post.unwrap_or_default());
            match store::append_content(table, &record) {
                Ok(()) => {
                    stored.insert(listing.link.clone());
                    stats.written += 1;
                }
                Err(e) => {
                    warn!("Failed to write {} to {}: {:#}", listing.link, table.display(), e);
                    stats.write_errors += 1;
                }
            }

            self.politeness.after_post().await;
        }
        pb.finish_and_clear();

        info!(
            "Harvested {} posts ({} empty, {} write errors, {} already stored)",
            stats.written, stats.empty, stats.write_errors, stats.skipped_existing
        );
        stats
    }
}

/// Links already captured. Unreadable tables count as empty.
fn existing_links(table: &Path) -> HashSet<String> {
    match store::read_links(table) {
        Ok(links) => {
            if !links.is_empty() {
                info!("Existing rows in {}: {}", table.display(), links.len());
            }
            links
        }
        Err(e) => {
            warn!("Cannot read {}, fetching everything: {:#}", table.display(), e);
            HashSet::new()
        }
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
