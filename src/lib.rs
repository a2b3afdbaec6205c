//! Scrape the regional top-advisor tables into one delimited file.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod process;
pub mod write;

pub use aggregate::{collect, run, RunSummary};
pub use config::{Config, ConfigOverrides, FailurePolicy, FileConfig};
pub use dataset::Dataset;
pub use error::{ErrorKind, Result, ScrapeError};
