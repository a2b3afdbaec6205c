// src/config.rs

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::process::region::RegionPattern;

pub const DEFAULT_HOME_DOMAIN: &str = "http://www.barrons.com";
pub const DEFAULT_HOME_PAGE_PATH: &str = "/report/top-financial-advisors/1000/2018";
pub const DEFAULT_OUTPUT_PATH: &str = "barrons_financial_advisors.csv";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/50.0.2661.102 Safari/537.36";
pub const DEFAULT_REGION_PATTERN: &str = r"/1000/(\w+)/2018";
pub const DEFAULT_IMAGE_MARKER: &str = "Y";

/// What to do when a single region cannot be scraped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole run on the first failing region.
    #[default]
    Abort,
    /// Log the failure, leave the region out and keep going.
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown failure policy `{}` (expected abort|skip)", other)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => f.write_str("abort"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// Settings as they appear in an optional YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub home_domain: Option<String>,
    pub home_page_path: Option<String>,
    pub output_path: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub region_pattern: Option<String>,
    pub image_marker: Option<String>,
    pub on_region_error: Option<FailurePolicy>,
    pub delimiter: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ScrapeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ScrapeError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values supplied on the command line or through the environment.
/// These win over the config file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub home_domain: Option<String>,
    pub home_page_path: Option<String>,
    pub output_path: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub region_pattern: Option<String>,
    pub image_marker: Option<String>,
    pub on_region_error: Option<FailurePolicy>,
    pub delimiter: Option<String>,
}

/// Fully resolved and validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub home_domain: Url,
    pub home_page_path: String,
    pub output_path: PathBuf,
    pub user_agent: String,
    /// Extra request headers. Never contains `User-Agent`; that lives in `user_agent`.
    pub headers: HeaderMap,
    pub region_pattern: RegionPattern,
    pub image_marker: String,
    pub on_region_error: FailurePolicy,
    pub delimiter: u8,
}

impl Config {
    /// Layer overrides over the file over built-in defaults, then validate.
    pub fn resolve(file: Option<FileConfig>, overrides: ConfigOverrides) -> Result<Self> {
        let file = file.unwrap_or_default();

        let home_domain_raw = overrides
            .home_domain
            .or(file.home_domain)
            .unwrap_or_else(|| DEFAULT_HOME_DOMAIN.to_string());
        let home_domain = Url::parse(&home_domain_raw).map_err(|source| ScrapeError::InvalidUrl {
            input: home_domain_raw.clone(),
            source,
        })?;
        if home_domain.cannot_be_a_base() {
            return Err(ScrapeError::InvalidConfig(format!(
                "home domain `{}` cannot be used as a base URL",
                home_domain_raw
            )));
        }

        let pattern_raw = overrides
            .region_pattern
            .or(file.region_pattern)
            .unwrap_or_else(|| DEFAULT_REGION_PATTERN.to_string());
        let region_pattern = RegionPattern::new(&pattern_raw)?;

        let delimiter = match overrides.delimiter.or(file.delimiter) {
            Some(raw) => parse_delimiter(&raw)?,
            None => b',',
        };

        let (headers, header_user_agent) = header_map(&file.headers)?;

        let config = Config {
            home_domain,
            home_page_path: overrides
                .home_page_path
                .or(file.home_page_path)
                .unwrap_or_else(|| DEFAULT_HOME_PAGE_PATH.to_string()),
            output_path: overrides
                .output_path
                .or(file.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            user_agent: overrides
                .user_agent
                .or(file.user_agent)
                .or(header_user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            headers,
            region_pattern,
            image_marker: overrides
                .image_marker
                .or(file.image_marker)
                .unwrap_or_else(|| DEFAULT_IMAGE_MARKER.to_string()),
            on_region_error: overrides
                .on_region_error
                .or(file.on_region_error)
                .unwrap_or_default(),
            delimiter,
        };
        debug!(?config, "resolved configuration");
        Ok(config)
    }
}

/// Validate the file's extra headers once. A `User-Agent` entry is pulled out
/// and returned separately so it ranks below `user_agent` from any layer.
fn header_map(raw: &BTreeMap<String, String>) -> Result<(HeaderMap, Option<String>)> {
    let mut headers = HeaderMap::new();
    let mut user_agent = None;
    for (name, value) in raw {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ScrapeError::InvalidConfig(format!("bad header name `{}`", name)))?;
        let parsed = HeaderValue::from_str(value)
            .map_err(|_| ScrapeError::InvalidConfig(format!("bad value for header `{}`", name)))?;
        if header == USER_AGENT {
            user_agent = Some(value.clone());
        } else {
            headers.insert(header, parsed);
        }
    }
    Ok((headers, user_agent))
}

/// Accepts a single ASCII character, or `\t` / `tab` for a tab.
fn parse_delimiter(raw: &str) -> Result<u8> {
    match raw {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }
    match raw.as_bytes() {
        [b] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => Ok(*b),
        _ => Err(ScrapeError::InvalidConfig(format!(
            "delimiter must be a single ASCII character, got `{}`",
            raw
        ))),
    }
}
