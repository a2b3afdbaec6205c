// src/process/region.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::process::header::flatten_headers;
use crate::process::rows::{extract_rows, Record};

pub const REGION_COLUMN: &str = "region";

static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("table selector should parse"));

/// Regex pulling the region token out of a region path via its first capture group.
#[derive(Debug, Clone)]
pub struct RegionPattern(Regex);

impl RegionPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| {
            ScrapeError::InvalidConfig(format!("region pattern `{}`: {}", pattern, e))
        })?;
        // captures_len counts the implicit whole-match group
        if re.captures_len() < 2 {
            return Err(ScrapeError::InvalidConfig(format!(
                "region pattern `{}` has no capture group",
                pattern
            )));
        }
        Ok(Self(re))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// e.g. `/report/top-financial-advisors/1000/alabama/2018` → `alabama`
    pub fn region_id(&self, path: &str) -> Result<String> {
        self.0
            .captures(path)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ScrapeError::RegionPatternMismatch {
                path: path.to_string(),
                pattern: self.0.as_str().to_string(),
            })
    }
}

/// All records from one region page, sharing one column schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTable {
    pub region: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RegionTable {
    /// Attach `region` as a constant column. An existing `region` column is
    /// overwritten rather than duplicated.
    pub fn tagged(mut columns: Vec<String>, mut records: Vec<Record>, region: String) -> Self {
        match columns.iter().position(|c| c == REGION_COLUMN) {
            Some(idx) => {
                for r in &mut records {
                    r.set(idx, region.clone());
                }
            }
            None => {
                columns.push(REGION_COLUMN.to_string());
                for r in &mut records {
                    r.push(region.clone());
                }
            }
        }
        Self {
            region,
            columns,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turn a fetched region page into a tagged table: first `<table>`, flat
/// headers, records, region column.
pub fn parse_region_page(
    doc: &Html,
    path: &str,
    pattern: &RegionPattern,
    image_marker: &str,
) -> Result<RegionTable> {
    let region = pattern.region_id(path)?;
    let table = doc
        .select(&TABLE)
        .next()
        .ok_or_else(|| ScrapeError::MissingElement {
            what: "table",
            context: path.to_string(),
        })?;

    let columns = flatten_headers(table)?;
    let records = extract_rows(table, &columns, image_marker)?;
    debug!(%region, columns = columns.len(), rows = records.len(), "parsed region page");
    Ok(RegionTable::tagged(columns, records, region))
}
