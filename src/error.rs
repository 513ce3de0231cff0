//! Error types for corpus loading, configuration and collection.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a corpus from a file.
///
/// Every variant is recoverable at the driver level by falling back to the
/// synthetic sample corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read corpus file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV corpus {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON corpus {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported corpus format for {0} (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),
}

/// Invalid or unreadable analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure while collecting articles from the search API.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned status {status}")]
    Status { status: u16 },

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to save collected articles: {0}")]
    Corpus(#[from] CorpusError),
}

impl CollectError {
    /// Whether retrying the same request may succeed: transport failures,
    /// rate limiting and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            CollectError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CollectError::Status { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
