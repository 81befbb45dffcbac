//! Data access for the RUEA dashboard
//!
//! Transports, the typed API client, and the resolvers that turn the remote
//! endpoints into facets and stat series, falling back to client-side
//! aggregation when the server cannot help.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod export;
pub mod fetch;
pub mod loader;
pub mod normalize;
pub mod resolve;
pub mod sources;

use tokio::task::JoinError;
use thiserror::Error;

// Re-exports
pub use aggregate::count_by_norm;
pub use api::{RueaApi, Summary};
pub use config::DashboardConfig;
pub use export::{ExportFormat, download_url, download_to_file, write_records_csv};
pub use fetch::{fetch_all, FetchLimits};
pub use loader::{Loaded, Loader};
pub use normalize::Normalizer;
pub use resolve::{
    facets_from_rows, FacetResolution, FacetResolver, ResolutionSource, StatsBatch, StatsRequest, StatsResolver,
    SummaryResolution, SummaryResolver,
};
pub use sources::{HttpTransport, MemoryTransport, Transport};

/// Failure of a single request against the API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("HTTP {status}{}", .detail.as_deref().map(|d| format!(" - {}", d)).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl RequestError {
    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server supplied detail message, when present
    pub fn detail(&self) -> Option<&str> {
        match self {
            RequestError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            RequestError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            RequestError::Status {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            RequestError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(error: serde_json::Error) -> Self {
        RequestError::Decode(error.to_string())
    }
}

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("{context}: server failed ({primary}); client-side fallback failed ({fallback})")]
    FallbackExhausted {
        context: String,
        primary: String,
        fallback: RequestError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}
