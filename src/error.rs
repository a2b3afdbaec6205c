//! Error types for advisorscraper

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Broad failure classes, used to decide what a failure aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-200 response, connection failure or unusable URL.
    Transport,
    /// An expected element is missing or malformed.
    Structure,
    /// A body row does not line up with the derived columns.
    DataShape,
    /// Writing the output file failed.
    Output,
    /// Startup configuration is invalid.
    Config,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("home page unavailable: {url}")]
    HomePageUnavailable { url: String },

    #[error("region page unavailable: {url}")]
    RegionUnavailable { url: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid URL '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("missing {what} in {context}")]
    MissingElement { what: &'static str, context: String },

    #[error("expected 2 header rows, found {found}")]
    HeaderRowCount { found: usize },

    #[error("header rows expand to different widths: {first} vs {second}")]
    HeaderWidthMismatch { first: usize, second: usize },

    #[error("invalid colspan '{value}'")]
    InvalidColspan { value: String },

    #[error("region path '{path}' does not match pattern '{pattern}'")]
    RegionPatternMismatch { path: String, pattern: String },

    #[error("home page lists no regions")]
    NoRegions,

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("no region produced any rows")]
    EmptyDataset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load config '{path}': {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HomePageUnavailable { .. }
            | Self::RegionUnavailable { .. }
            | Self::Client(_)
            | Self::InvalidUrl { .. } => ErrorKind::Transport,
            Self::MissingElement { .. }
            | Self::HeaderRowCount { .. }
            | Self::HeaderWidthMismatch { .. }
            | Self::InvalidColspan { .. }
            | Self::RegionPatternMismatch { .. }
            | Self::NoRegions => ErrorKind::Structure,
            Self::RowWidthMismatch { .. } => ErrorKind::DataShape,
            Self::EmptyDataset | Self::Io(_) | Self::Csv(_) => ErrorKind::Output,
            Self::InvalidConfig(_) | Self::ConfigRead { .. } | Self::ConfigFile { .. } => {
                ErrorKind::Config
            }
        }
    }
}
