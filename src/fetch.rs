//! Single-request HTTP fetcher.
//!
//! Every failure mode (transport, timeout, TLS, non-2xx) is collapsed into
//! `None` at the public boundary; callers skip and carry on.

use std::time::{Duration, Instant};

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::FetchConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid header {0:?}")]
    InvalidHeader(String),
}

pub struct Fetcher {
    client: reqwest::Client,
    encoding: &'static Encoding,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| FetchError::InvalidHeader(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| FetchError::InvalidHeader(name.as_str().to_string()))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        let encoding = Encoding::for_label(config.encoding.as_bytes()).unwrap_or_else(|| {
            warn!("Unknown encoding {:?}, falling back to UTF-8", config.encoding);
            UTF_8
        });

        Ok(Self { client, encoding })
    }

    /// GET `url` with the default header set.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        self.fetch_inner(url, None).await
    }

    /// GET `url`; `overrides` replace default headers of the same name.
    pub async fn fetch_with(&self, url: &str, overrides: &HeaderMap) -> Option<String> {
        self.fetch_inner(url, Some(overrides)).await
    }

    async fn fetch_inner(&self, url: &str, overrides: Option<&HeaderMap>) -> Option<String> {
        let start = Instant::now();
        match self.try_fetch(url, overrides).await {
            Ok(body) => {
                debug!("Fetched {} ({} bytes) in {}ms", url, body.len(), start.elapsed().as_millis());
                Some(body)
            }
            Err(e) => {
                warn!("Request failed for {}: {}", url, e);
                None
            }
        }
    }

    async fn try_fetch(&self, url: &str, overrides: Option<&HeaderMap>) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        if let Some(h) = overrides {
            request = request.headers(h.clone());
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let bytes = response.bytes().await?;
        let (text, _) = self.encoding.decode_without_bom_handling(&bytes);
        Ok(text.into_owned())
    }
}
