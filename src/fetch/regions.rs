// src/fetch/regions.rs

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, trace};

use super::Fetcher;
use crate::error::{Result, ScrapeError};

/// Value of the "Make a Selection" placeholder option.
pub const NO_SELECTION: &str = "#";

static REGION_SELECT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("select#stateSelect").expect("region select selector should parse")
});
static OPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option").expect("option selector should parse"));

/// Region paths listed by the home page's region selector, in page order,
/// without the placeholder entry.
pub fn region_paths(doc: &Html) -> Result<Vec<String>> {
    let select = doc
        .select(&REGION_SELECT)
        .next()
        .ok_or_else(|| ScrapeError::MissingElement {
            what: "region selector",
            context: "home page".to_string(),
        })?;

    let mut paths = Vec::new();
    for opt in select.select(&OPTION) {
        let value = opt
            .value()
            .attr("value")
            .ok_or_else(|| ScrapeError::MissingElement {
                what: "option value",
                context: "region selector".to_string(),
            })?;
        if value == NO_SELECTION {
            continue;
        }
        trace!(path = value, "found region");
        paths.push(value.to_string());
    }
    Ok(paths)
}

/// Fetch the home page and list its regions. An unreachable home page or
/// an empty list is fatal: nothing downstream can run.
#[instrument(level = "info", skip(fetcher))]
pub async fn enumerate_regions(fetcher: &Fetcher, home_path: &str) -> Result<Vec<String>> {
    let url = fetcher.url_for(home_path)?;
    let doc = fetcher
        .get_document(&url)
        .await
        .ok_or_else(|| ScrapeError::HomePageUnavailable {
            url: url.to_string(),
        })?;

    let paths = region_paths(&doc)?;
    if paths.is_empty() {
        return Err(ScrapeError::NoRegions);
    }
    debug!(?paths, "region paths");
    info!(count = paths.len(), "enumerated regions");
    Ok(paths)
}
