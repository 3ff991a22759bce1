//! Configuration loading and management.
//!
//! Every section has defaults, so a missing file or a partial file both work.
//! Components receive only the section they need.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::politeness::DelayRange;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board name must not be empty")]
    EmptyBoard,
    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("negative or non-finite delay bound in {0}")]
    InvalidDelay(&'static str),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub board: BoardConfig,
    pub fetch: FetchConfig,
    pub politeness: PolitenessConfig,
    pub crawl: CrawlConfig,
    pub storage: StorageConfig,
}

/// Where the board lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub name: String,
    pub base_url: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "stock".to_string(),
            base_url: "https://www.ptt.cc".to_string(),
        }
    }
}

impl BoardConfig {
    /// Unnumbered index page, always the newest listing page.
    pub fn index_url(&self) -> String {
        format!("{}/bbs/{}/index.html", self.base(), self.name)
    }

    pub fn page_url(&self, index: u32) -> String {
        format!("{}/bbs/{}/index{}.html", self.base(), self.name, index)
    }

    /// Resolve a listing href (usually `/bbs/<board>/M.xxx.html`) to an absolute URL.
    pub fn resolve_link(&self, href: &str) -> String {
        match Url::parse(self.base()).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base(), href),
        }
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Encoding label forced onto every response body.
    pub encoding: String,
    pub timeout_secs: u64,
    /// Extra default headers, e.g. `Cookie = "over18=1"`.
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            encoding: "utf-8".to_string(),
            timeout_secs: 30,
            headers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolitenessConfig {
    pub post_delay: DelayRange,
    pub page_delay: DelayRange,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            post_delay: DelayRange::new(0.1, 0.3),
            page_delay: DelayRange::new(0.2, 0.5),
        }
    }
}

impl PolitenessConfig {
    /// No waiting at all. Used by tests against a local origin.
    pub fn none() -> Self {
        Self {
            post_delay: DelayRange::new(0.0, 0.0),
            page_delay: DelayRange::new(0.0, 0.0),
        }
    }
}

/// Library default page count when neither the caller nor the file sets one.
pub const DEFAULT_PAGES: u32 = 5;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// `None` when the file leaves it unset, so front ends can pick their own default.
    pub pages: Option<u32>,
    pub threshold: i64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            pages: None,
            threshold: 40,
        }
    }
}

impl CrawlConfig {
    pub fn pages_or(&self, fallback: u32) -> u32 {
        self.pages.unwrap_or(fallback)
    }

    pub fn pages(&self) -> u32 {
        self.pages_or(DEFAULT_PAGES)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to `./<board name>` when unset.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.name.trim().is_empty() {
            return Err(ConfigError::EmptyBoard);
        }
        Url::parse(&self.board.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.board.base_url.clone(),
            source,
        })?;
        if !self.politeness.post_delay.is_valid() {
            return Err(ConfigError::InvalidDelay("post_delay"));
        }
        if !self.politeness.page_delay.is_valid() {
            return Err(ConfigError::InvalidDelay("page_delay"));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.board.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.board.name, "stock");
        assert_eq!(config.crawl.pages, None);
        assert_eq!(config.crawl.pages(), 5);
        assert_eq!(config.crawl.pages_or(10), 10);
        assert_eq!(config.crawl.threshold, 40);
        assert_eq!(config.fetch.user_agent, "Mozilla/5.0");
        assert_eq!(config.politeness.page_delay, DelayRange::new(0.2, 0.5));
        assert_eq!(config.data_dir(), PathBuf::from("stock"));
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = Config::from_toml(
            r#"
            [board]
            name = "Gossiping"

            [fetch.headers]
            Cookie = "over18=1"

            [politeness]
            post_delay = { min = 0.5, max = 1.0 }

            [storage]
            data_dir = "/tmp/gossip"
            "#,
        )
        .unwrap();
        assert_eq!(config.board.name, "Gossiping");
        assert_eq!(config.board.base_url, "https://www.ptt.cc");
        assert_eq!(config.fetch.headers.get("Cookie").map(String::as_str), Some("over18=1"));
        assert_eq!(config.politeness.post_delay, DelayRange::new(0.5, 1.0));
        assert_eq!(config.politeness.page_delay, DelayRange::new(0.2, 0.5));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/gossip"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_toml("[board]\nname = \"\"").is_err());
        assert!(Config::from_toml("[board]\nbase_url = \"not a url\"").is_err());
        assert!(Config::from_toml("[politeness]\npage_delay = { min = -1.0, max = 0.5 }").is_err());
    }

    #[test]
    fn rejects_non_finite_delays() {
        for range in ["{ min = nan, max = nan }", "{ min = 0.1, max = inf }", "{ min = -inf, max = 0.5 }"] {
            let toml = format!("[politeness]\npage_delay = {range}");
            let err = Config::from_toml(&toml).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::InvalidDelay("page_delay"))),
                "{range}: {err:#}"
            );
        }
        let toml = "[politeness]\npost_delay = { min = nan, max = 0.3 }";
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn pages_from_file_win_over_fallback() {
        let config = Config::from_toml("[crawl]\npages = 3").unwrap();
        assert_eq!(config.crawl.pages_or(10), 3);
        assert_eq!(config.crawl.pages(), 3);
    }

    #[test]
    fn board_urls() {
        let board = BoardConfig::default();
        assert_eq!(board.index_url(), "https://www.ptt.cc/bbs/stock/index.html");
        assert_eq!(board.page_url(123), "https://www.ptt.cc/bbs/stock/index123.html");
        assert_eq!(
            board.resolve_link("/bbs/stock/M.1700000000.A.1B2.html"),
            "https://www.ptt.cc/bbs/stock/M.1700000000.A.1B2.html"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let board = BoardConfig {
            name: "stock".into(),
            base_url: "http://127.0.0.1:8080/".into(),
        };
        assert_eq!(board.index_url(), "http://127.0.0.1:8080/bbs/stock/index.html");
        assert_eq!(
            board.resolve_link("/bbs/stock/M.1.A.html"),
            "http://127.0.0.1:8080/bbs/stock/M.1.A.html"
        );
    }
}
