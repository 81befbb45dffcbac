use ruea_core::{FilterField, FilterSet, SeriesOrder};

use super::ResolutionSource;
use crate::aggregate::count_by_norm;
use crate::api::{RueaApi, Summary};
use crate::fetch::{fetch_all, FetchLimits};
use crate::normalize::Normalizer;
use crate::DataError;

/// Places listed per ranking when the summary is computed client-side
pub const DEFAULT_SUMMARY_TOP: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResolution {
    pub summary: Summary,
    pub source: ResolutionSource,
    pub reason: Option<String>,
    pub error: Option<String>,
}

/// Resolves the headline summary of the filtered dataset
#[derive(Clone)]
pub struct SummaryResolver {
    api: RueaApi,
    limits: FetchLimits,
    top: usize,
}

impl SummaryResolver {
    pub fn new(api: RueaApi) -> Self {
        Self {
            api,
            limits: FetchLimits::default(),
            top: DEFAULT_SUMMARY_TOP,
        }
    }

    pub fn with_limits(mut self, limits: FetchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    /// Summary for `filters`, computed from a row scan when the summary
    /// endpoint fails. A zero total from the server is a valid answer.
    pub async fn resolve(&self, filters: &FilterSet) -> SummaryResolution {
        let reason = match self.api.summary(filters).await {
            Ok(summary) => {
                return SummaryResolution {
                    summary,
                    source: ResolutionSource::Server,
                    reason: None,
                    error: None,
                };
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!(%reason, "Computing summary from a full scan");

        match fetch_all(&self.api, filters, self.limits).await {
            Ok(rows) => {
                let ranking = |field: FilterField| {
                    count_by_norm(&rows, field.as_str(), Normalizer::for_field(field))
                        .into_view(Some(self.top), SeriesOrder::ByCount)
                };

                SummaryResolution {
                    summary: Summary {
                        total: rows.len() as u64,
                        top_corregimiento: ranking(FilterField::Corregimiento),
                        top_vereda: ranking(FilterField::Vereda),
                    },
                    source: ResolutionSource::Fallback,
                    reason: Some(reason),
                    error: None,
                }
            }
            Err(fallback) => {
                let error = DataError::FallbackExhausted {
                    context: "resumen".to_string(),
                    primary: reason.clone(),
                    fallback,
                };
                tracing::error!("{}", error);

                SummaryResolution {
                    summary: Summary::default(),
                    source: ResolutionSource::Degraded,
                    reason: Some(reason),
                    error: Some(error.to_string()),
                }
            }
        }
    }
}
