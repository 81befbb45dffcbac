use futures::future::join_all;

use ruea_core::{FilterField, FilterSet, SeriesOrder, StatSeries};

use super::ResolutionSource;
use crate::aggregate::count_by_norm;
use crate::api::RueaApi;
use crate::fetch::{fetch_all, FetchLimits};
use crate::normalize::Normalizer;
use crate::DataError;

/// One grouping requested in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsRequest {
    pub field: FilterField,
    /// Keep only the largest `top` groups
    pub top: Option<usize>,
    /// Final order of the series
    pub order: SeriesOrder,
}

impl StatsRequest {
    pub fn new(field: FilterField) -> Self {
        Self {
            field,
            top: None,
            order: SeriesOrder::ByCount,
        }
    }

    pub fn top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }

    pub fn by_name(mut self) -> Self {
        self.order = SeriesOrder::ByName;
        self
    }
}

/// Series for every request of a batch, in request order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsBatch {
    pub requests: Vec<StatsRequest>,
    pub series: Vec<StatSeries>,
    pub source: ResolutionSource,
    pub reason: Option<String>,
    pub error: Option<String>,
}

impl StatsBatch {
    /// Series of the first request grouping by `field`
    pub fn get(&self, field: FilterField) -> Option<&StatSeries> {
        self.requests
            .iter()
            .position(|request| request.field == field)
            .and_then(|index| self.series.get(index))
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(StatSeries::is_empty)
    }

    /// Whether at least one grouping produced an item
    pub fn is_usable(&self) -> bool {
        !self.is_empty()
    }

    /// Number of items across all series
    pub fn item_count(&self) -> usize {
        self.series.iter().map(StatSeries::len).sum()
    }
}

/// Resolves grouped counts for a batch of groupings
#[derive(Clone)]
pub struct StatsResolver {
    api: RueaApi,
    limits: FetchLimits,
}

impl StatsResolver {
    pub fn new(api: RueaApi) -> Self {
        Self {
            api,
            limits: FetchLimits::default(),
        }
    }

    /// Override the bounds of the fallback scan
    pub fn with_limits(mut self, limits: FetchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Counts for every request in `requests`.
    ///
    /// The server calls run concurrently; a failing call counts as an empty
    /// series. Only when the whole batch comes back empty is the server path
    /// abandoned, and then a single scan of the matching rows feeds every
    /// grouping. Never fails: if the scan fails too, each series is empty and
    /// `error` is set.
    pub async fn resolve(&self, filters: &FilterSet, requests: &[StatsRequest]) -> StatsBatch {
        let calls = requests.iter().map(|request| async move {
            self.api
                .stats(request.field, filters, request.top)
                .await
                .map(|series| series.into_view(request.top, request.order))
        });

        let mut first_error = None;
        let mut series = Vec::with_capacity(requests.len());
        for (request, result) in requests.iter().zip(join_all(calls).await) {
            match result {
                Ok(s) => series.push(s),
                Err(e) => {
                    tracing::debug!(field = %request.field, error = %e, "Stats call failed");
                    first_error.get_or_insert_with(|| e.to_string());
                    series.push(StatSeries::default());
                }
            }
        }

        let batch = StatsBatch {
            requests: requests.to_vec(),
            series,
            source: ResolutionSource::Server,
            reason: None,
            error: None,
        };
        if batch.is_usable() {
            return batch;
        }

        let reason = first_error.unwrap_or_else(|| "stats endpoint returned no items".to_string());
        tracing::warn!(%reason, groupings = requests.len(), "Computing stats from a full scan");

        match fetch_all(&self.api, filters, self.limits).await {
            Ok(rows) => {
                let series = requests
                    .iter()
                    .map(|request| {
                        count_by_norm(&rows, request.field.as_str(), Normalizer::for_field(request.field))
                            .into_view(request.top, request.order)
                    })
                    .collect();
                tracing::info!(rows = rows.len(), "Stats computed client-side");

                StatsBatch {
                    requests: requests.to_vec(),
                    series,
                    source: ResolutionSource::Fallback,
                    reason: Some(reason),
                    error: None,
                }
            }
            Err(fallback) => {
                let error = DataError::FallbackExhausted {
                    context: "estadísticas".to_string(),
                    primary: reason.clone(),
                    fallback,
                };
                tracing::error!("{}", error);

                StatsBatch {
                    requests: requests.to_vec(),
                    series: vec![StatSeries::default(); requests.len()],
                    source: ResolutionSource::Degraded,
                    reason: Some(reason),
                    error: Some(error.to_string()),
                }
            }
        }
    }

    /// Counts for a single grouping
    pub async fn resolve_one(&self, filters: &FilterSet, request: StatsRequest) -> StatsBatch {
        self.resolve(filters, &[request]).await
    }
}
