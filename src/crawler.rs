use tracing::{error, info, warn};

use crate::config::BoardConfig;
use crate::fetch::Fetcher;
use crate::parser::{parse_frontier, parse_listings};
use crate::politeness::Politeness;
use crate::records::ListingRecord;

/// Result of walking the listing pages.
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// `None` when the newest page could not be determined.
    pub frontier: Option<u32>,
    pub pages_visited: usize,
    pub pages_empty: usize,
    pub listings: Vec<ListingRecord>,
}

/// Walks a board's index pages from newest to oldest.
pub struct Crawler<'a> {
    fetcher: &'a Fetcher,
    politeness: &'a Politeness,
    board: &'a BoardConfig,
}

impl<'a> Crawler<'a> {
    pub fn new(fetcher: &'a Fetcher, politeness: &'a Politeness, board: &'a BoardConfig) -> Self {
        Self {
            fetcher,
            politeness,
            board,
        }
    }

    /// Newest numbered page of the board.
    pub async fn resolve_frontier(&self) -> Option<u32> {
        let url = self.board.index_url();
        let html = self.fetcher.fetch(&url).await?;
        let frontier = parse_frontier(&html);
        if frontier.is_none() {
            warn!("No previous-page link on {}", url);
        }
        frontier
    }

    /// Listings of one page; empty when the page cannot be fetched.
    pub async fn scrape_page(&self, index: u32) -> Vec<ListingRecord> {
        let url = self.board.page_url(index);
        info!("Fetching page: {}", url);
        match self.fetcher.fetch(&url).await {
            Some(html) => parse_listings(&html, self.board),
            None => Vec::new(),
        }
    }

    /// Collect listings from `pages` pages, newest page first.
    pub async fn crawl(&self, pages: u32) -> CrawlReport {
        let Some(frontier) = self.resolve_frontier().await else {
            error!("Could not resolve the latest page index for /{}/", self.board.name);
            return CrawlReport::default();
        };
        info!("Latest page index for /{}/ is {}", self.board.name, frontier);

        let mut report = CrawlReport {
            frontier: Some(frontier),
            ..Default::default()
        };
        for index in page_range(frontier, pages) {
            let records = self.scrape_page(index).await;
            report.pages_visited += 1;
            if records.is_empty() {
                report.pages_empty += 1;
            }
            report.listings.extend(records);
            self.politeness.after_page().await;
        }

        info!(
            "Crawled {} pages ({} empty), {} listings",
            report.pages_visited,
            report.pages_empty,
            report.listings.len()
        );
        report
    }
}

/// Page indices `frontier, frontier-1, ...`, `pages` of them, never below 1.
pub fn page_range(frontier: u32, pages: u32) -> impl Iterator<Item = u32> {
    let lowest = frontier.saturating_sub(pages.saturating_sub(1)).max(1);
    let upper = if pages == 0 { 0 } else { frontier };
    (lowest..=upper).rev()
}
