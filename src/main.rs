use advisorscraper::{
    aggregate,
    config::{Config, ConfigOverrides, FailurePolicy, FileConfig},
    fetch::{enumerate_regions, Fetcher},
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Scrape every region's advisor ranking table into one delimited file.
#[derive(Parser, Debug)]
#[command(name = "advisorscraper", version)]
struct Args {
    /// Optional YAML file with any of the settings below
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL every request is made against
    #[arg(long, env = "ADVISORSCRAPER_HOME_DOMAIN")]
    home_domain: Option<String>,

    /// Path of the page listing the regions
    #[arg(long, env = "ADVISORSCRAPER_HOME_PAGE_PATH")]
    home_page_path: Option<String>,

    /// Destination file
    #[arg(short, long, env = "ADVISORSCRAPER_OUTPUT")]
    output: Option<PathBuf>,

    /// User-Agent sent on every request
    #[arg(long, env = "ADVISORSCRAPER_USER_AGENT")]
    user_agent: Option<String>,

    /// Regex whose first capture group is the region id
    #[arg(long, env = "ADVISORSCRAPER_REGION_PATTERN")]
    region_pattern: Option<String>,

    /// Value written for cells that only hold an image
    #[arg(long, env = "ADVISORSCRAPER_IMAGE_MARKER")]
    image_marker: Option<String>,

    /// abort | skip
    #[arg(long, env = "ADVISORSCRAPER_ON_REGION_ERROR")]
    on_region_error: Option<FailurePolicy>,

    /// Output field delimiter (single character, or `tab`)
    #[arg(long, env = "ADVISORSCRAPER_DELIMITER")]
    delimiter: Option<String>,

    /// Only scrape these region ids (repeatable)
    #[arg(long = "only", value_name = "REGION")]
    only: Vec<String>,

    /// Print the enumerated regions and exit
    #[arg(long)]
    list_regions: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            home_domain: self.home_domain.clone(),
            home_page_path: self.home_page_path.clone(),
            output_path: self.output.clone(),
            user_agent: self.user_agent.clone(),
            region_pattern: self.region_pattern.clone(),
            image_marker: self.image_marker.clone(),
            on_region_error: self.on_region_error,
            delimiter: self.delimiter.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_level = if args.verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();
    info!("startup");

    // ─── 2) resolve configuration ────────────────────────────────────
    let file = match &args.config {
        Some(path) => Some(
            FileConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
        ),
        None => None,
    };
    let config = Config::resolve(file, args.overrides()).context("resolving configuration")?;
    info!(
        home = %config.home_domain,
        output = %config.output_path.display(),
        policy = %config.on_region_error,
        "configuration"
    );

    // ─── 3) list mode ────────────────────────────────────────────────
    if args.list_regions {
        let fetcher = Fetcher::new(&config)?;
        let paths = enumerate_regions(&fetcher, &config.home_page_path)
            .await
            .context("enumerating regions")?;
        for path in paths {
            let id = config
                .region_pattern
                .region_id(&path)
                .unwrap_or_else(|_| "-".to_string());
            println!("{}\t{}", id, path);
        }
        return Ok(());
    }

    // ─── 4) scrape + write ───────────────────────────────────────────
    let summary = aggregate::run(&config, &args.only)
        .await
        .context("scrape failed")?;

    for failure in &summary.failures {
        warn!(path = %failure.path, kind = ?failure.kind, "skipped: {}", failure.error);
    }
    info!(
        "Wrote {} results from {}/{} regions to {}",
        summary.rows_written,
        summary.regions_scraped,
        summary.regions_total,
        summary.output_path.display()
    );
    Ok(())
}
