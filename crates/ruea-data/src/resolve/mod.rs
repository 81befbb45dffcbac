//! Resolvers: server endpoint first, client-side fallback second
//!
//! A resolver never fails. It reports where its data came from and, when
//! neither path worked, an error message next to an empty result.

mod facets;
mod stats;
mod summary;

pub use facets::{facets_from_rows, FacetResolution, FacetResolver};
pub use stats::{StatsBatch, StatsRequest, StatsResolver};
pub use summary::{SummaryResolution, SummaryResolver};

use serde::{Deserialize, Serialize};

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolutionSource {
    /// The dedicated server endpoint answered with usable data
    #[default]
    Server,
    /// Computed client-side from fetched rows
    Fallback,
    /// Both paths failed; the value is empty
    Degraded,
}

impl ResolutionSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ResolutionSource::Fallback)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResolutionSource::Server => "server",
            ResolutionSource::Fallback => "client-side",
            ResolutionSource::Degraded => "unavailable",
        }
    }
}
