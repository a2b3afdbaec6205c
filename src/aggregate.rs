// src/aggregate.rs

use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Config, FailurePolicy};
use crate::dataset::Dataset;
use crate::error::{ErrorKind, Result, ScrapeError};
use crate::fetch::{enumerate_regions, Fetcher};
use crate::process::region::{parse_region_page, RegionPattern, RegionTable};
use crate::write::write_dataset;

/// A region left out of the dataset under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFailure {
    pub path: String,
    pub kind: ErrorKind,
    pub error: String,
}

/// Everything gathered before writing.
#[derive(Debug)]
pub struct Collected {
    pub dataset: Dataset,
    pub regions_total: usize,
    pub failures: Vec<RegionFailure>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub regions_total: usize,
    pub regions_scraped: usize,
    pub failures: Vec<RegionFailure>,
    pub rows_written: usize,
    pub output_path: PathBuf,
}

/// Fetch one region page and turn it into a tagged table.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn scrape_region(fetcher: &Fetcher, path: &str, config: &Config) -> Result<RegionTable> {
    let url = fetcher.url_for(path)?;
    let doc = fetcher
        .get_document(&url)
        .await
        .ok_or_else(|| ScrapeError::RegionUnavailable {
            url: url.to_string(),
        })?;
    parse_region_page(&doc, path, &config.region_pattern, &config.image_marker)
}

/// Keep only the paths whose region id is in `only` (ASCII case-insensitive).
/// Paths the pattern cannot read an id from are never selected.
pub fn filter_regions(
    paths: Vec<String>,
    pattern: &RegionPattern,
    only: &[String],
) -> Result<Vec<String>> {
    if only.is_empty() {
        return Ok(paths);
    }

    let mut kept = Vec::new();
    let mut matched = vec![false; only.len()];
    for path in paths {
        let id = match pattern.region_id(&path) {
            Ok(id) => id,
            Err(e) => {
                debug!(%path, error = %e, "no region id, not selectable");
                continue;
            }
        };
        if let Some(i) = only.iter().position(|o| o.eq_ignore_ascii_case(&id)) {
            matched[i] = true;
            kept.push(path);
        }
    }
    for (name, hit) in only.iter().zip(&matched) {
        if !hit {
            warn!(region = %name, "requested region not listed on home page");
        }
    }
    if kept.is_empty() {
        return Err(ScrapeError::InvalidConfig(format!(
            "none of the requested regions {:?} are listed",
            only
        )));
    }
    Ok(kept)
}

/// Enumerate regions, scrape each in order and stack the results.
///
/// A failing region either aborts the run or is recorded and left out,
/// depending on `config.on_region_error`. Home page problems always abort.
#[instrument(level = "info", skip_all)]
pub async fn collect(fetcher: &Fetcher, config: &Config, only: &[String]) -> Result<Collected> {
    let paths = enumerate_regions(fetcher, &config.home_page_path).await?;
    let paths = filter_regions(paths, &config.region_pattern, only)?;
    let regions_total = paths.len();

    let mut tables = Vec::with_capacity(regions_total);
    let mut failures = Vec::new();
    for path in paths {
        match scrape_region(fetcher, &path, config).await {
            Ok(table) => {
                info!(region = %table.region, rows = table.len(), "scraped region");
                tables.push(table);
            }
            Err(e) => match config.on_region_error {
                FailurePolicy::Abort => {
                    error!(%path, error = %e, "region failed, aborting run");
                    return Err(e);
                }
                FailurePolicy::Skip => {
                    warn!(%path, error = %e, "region failed, skipping");
                    failures.push(RegionFailure {
                        kind: e.kind(),
                        error: e.to_string(),
                        path,
                    });
                }
            },
        }
    }

    if tables.is_empty() {
        return Err(ScrapeError::EmptyDataset);
    }

    Ok(Collected {
        dataset: Dataset::concat(tables),
        regions_total,
        failures,
    })
}

/// Full pipeline: enumerate → fetch → normalize → extract → tag → stack → write.
#[instrument(level = "info", skip_all, fields(home = %config.home_domain))]
pub async fn run(config: &Config, only: &[String]) -> Result<RunSummary> {
    let fetcher = Fetcher::new(config)?;
    let collected = collect(&fetcher, config, only).await?;
    let rows_written = write_dataset(&collected.dataset, &config.output_path, config.delimiter)?;

    let summary = RunSummary {
        regions_scraped: collected.regions_total - collected.failures.len(),
        regions_total: collected.regions_total,
        failures: collected.failures,
        rows_written,
        output_path: config.output_path.clone(),
    };
    info!(
        regions = summary.regions_total,
        scraped = summary.regions_scraped,
        failed = summary.failures.len(),
        rows = summary.rows_written,
        "run complete"
    );
    Ok(summary)
}
