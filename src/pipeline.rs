//! Crawl → filter → harvest, wired from a single `Config`.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::crawler::{CrawlReport, Crawler};
use crate::fetch::Fetcher;
use crate::harvest::{HarvestStats, Harvester};
use crate::politeness::Politeness;
use crate::popularity;
use crate::records::ListingRecord;
use crate::store::{self, Store};

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub frontier: Option<u32>,
    pub listings: usize,
    pub qualifying: usize,
    /// `None` when the crawl was aborted before anything was stored.
    pub harvest: Option<HarvestStats>,
}

pub struct Pipeline {
    config: Config,
    fetcher: Fetcher,
    politeness: Politeness,
    store: Store,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config.fetch).context("Failed to build HTTP client")?;
        let politeness = Politeness::new(&config.politeness);
        let store = Store::new(config.data_dir(), &config.board.name);
        Ok(Self {
            config,
            fetcher,
            politeness,
            store,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Crawl `pages` pages and overwrite the raw table. An unresolved frontier
    /// leaves storage untouched.
    pub async fn crawl(&self, pages: u32) -> Result<CrawlReport> {
        let crawler = Crawler::new(&self.fetcher, &self.politeness, &self.config.board);
        let report = crawler.crawl(pages).await;
        if report.frontier.is_none() {
            return Ok(report);
        }

        let path = self.store.raw_path();
        store::write_listings(&path, &report.listings)?;
        info!("Raw data saved to {} ({} rows)", path.display(), report.listings.len());
        Ok(report)
    }

    /// Filter `listings` and overwrite the filtered table for `threshold`.
    pub fn filter(&self, listings: &[ListingRecord], threshold: i64) -> Result<Vec<ListingRecord>> {
        let filtered = popularity::filter(listings, threshold);
        let path = self.store.filtered_path(threshold);
        store::write_listings(&path, &filtered)?;
        info!(
            "Saved {} records with {}+ recommendations to {}",
            filtered.len(),
            threshold,
            path.display()
        );
        Ok(filtered)
    }

    /// Re-filter the stored raw table.
    pub fn filter_stored(&self, threshold: i64) -> Result<Vec<ListingRecord>> {
        let raw = store::read_listings(&self.store.raw_path())?;
        self.filter(&raw, threshold)
    }

    pub async fn harvest(&self, listings: &[ListingRecord]) -> HarvestStats {
        let harvester = Harvester::new(&self.fetcher, &self.politeness);
        harvester.harvest(listings, &self.store.content_path()).await
    }

    /// Harvest content for the stored filtered table of `threshold`.
    pub async fn harvest_stored(&self, threshold: i64) -> Result<HarvestStats> {
        let listings = store::read_listings(&self.store.filtered_path(threshold))?;
        Ok(self.harvest(&listings).await)
    }

    /// Full run: crawl, store raw, filter, store filtered, harvest new content.
    pub async fn run(&self, pages: u32, threshold: i64) -> Result<RunSummary> {
        info!("Data will be saved in: {}", self.store.dir().display());
        let report = self.crawl(pages).await?;
        if report.frontier.is_none() {
            return Ok(RunSummary::default());
        }

        let filtered = self.filter(&report.listings, threshold)?;
        let stats = self.harvest(&filtered).await;
        Ok(RunSummary {
            frontier: report.frontier,
            listings: report.listings.len(),
            qualifying: filtered.len(),
            harvest: Some(stats),
        })
    }
}
