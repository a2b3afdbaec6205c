// src/fetch/mod.rs

use reqwest::{Client, StatusCode};
use scraper::Html;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Result, ScrapeError};

pub mod regions;

pub use regions::{enumerate_regions, region_paths};

/// HTTP GETs against the configured home domain, one at a time, with the
/// configured headers on every request.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    base: Url,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        // user_agent after default_headers so it wins
        let client = Client::builder()
            .default_headers(config.headers.clone())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base: config.home_domain.clone(),
        })
    }

    /// Resolve a site-relative path against the home domain.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|source| ScrapeError::InvalidUrl {
            input: path.to_string(),
            source,
        })
    }

    /// Single GET. A 200 body is parsed as HTML; any other status or a
    /// transport error is logged and yields `None`.
    #[instrument(level = "debug", skip(self, url), fields(url = %url))]
    pub async fn get_document(&self, url: &Url) -> Option<Html> {
        let resp = match self.client.get(url.clone()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%url, error = %e, "request failed");
                return None;
            }
        };

        let status = resp.status();
        info!(%url, status = status.as_u16(), "requested");
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "unable to return content");
            return None;
        }

        match resp.text().await {
            Ok(body) => Some(Html::parse_document(&body)),
            Err(e) => {
                warn!(%url, error = %e, "reading body failed");
                None
            }
        }
    }
}
