use ruea_core::collation::sort_spanish;
use ruea_core::{field_text, FacetSet, FilterField, FilterSet, Record};

use super::ResolutionSource;
use crate::api::RueaApi;
use crate::fetch::{fetch_all, FetchLimits};
use crate::DataError;

/// Rows sampled by the fallback when the facet endpoint is unusable
pub const DEFAULT_SAMPLE_LIMIT: usize = 5000;

/// Facets together with their provenance
#[derive(Debug, Clone, PartialEq)]
pub struct FacetResolution {
    pub facets: FacetSet,
    pub source: ResolutionSource,
    /// Why the server path was not used
    pub reason: Option<String>,
    /// User-visible error when both paths failed
    pub error: Option<String>,
}

impl FacetResolution {
    /// Whether any field has at least one choice
    pub fn is_usable(&self) -> bool {
        !self.facets.is_empty()
    }
}

/// Resolves the filter choices for the current filters
#[derive(Clone)]
pub struct FacetResolver {
    api: RueaApi,
    limits: FetchLimits,
}

impl FacetResolver {
    pub fn new(api: RueaApi) -> Self {
        Self {
            api,
            limits: FetchLimits {
                max_rows: DEFAULT_SAMPLE_LIMIT,
                ..FetchLimits::default()
            },
        }
    }

    /// Override the fallback sample size and page size
    pub fn with_limits(mut self, limits: FetchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Facets for `filters`.
    ///
    /// Uses the facet endpoint when it answers with at least one value; an
    /// error or an all-empty answer switches to deriving the facets from a
    /// sample of the matching rows. Never fails: if the sample cannot be
    /// fetched either, every field is empty and `error` is set.
    pub async fn resolve(&self, filters: &FilterSet) -> FacetResolution {
        let reason = match self.api.facets(filters).await {
            Ok(facets) if !facets.is_empty() => {
                return FacetResolution {
                    facets,
                    source: ResolutionSource::Server,
                    reason: None,
                    error: None,
                };
            }
            Ok(_) => "facet endpoint returned no values".to_string(),
            Err(e) => e.to_string(),
        };

        tracing::warn!(%reason, "Deriving facets from sampled rows");

        match fetch_all(&self.api, filters, self.limits).await {
            Ok(rows) => {
                tracing::info!(rows = rows.len(), "Facets derived client-side");
                FacetResolution {
                    facets: facets_from_rows(&rows),
                    source: ResolutionSource::Fallback,
                    reason: Some(reason),
                    error: None,
                }
            }
            Err(fallback) => {
                let error = DataError::FallbackExhausted {
                    context: "facetas".to_string(),
                    primary: reason.clone(),
                    fallback,
                };
                tracing::error!("{}", error);
                FacetResolution {
                    facets: FacetSet::empty(),
                    source: ResolutionSource::Degraded,
                    reason: Some(reason),
                    error: Some(error.to_string()),
                }
            }
        }
    }
}

/// Distinct lower-cased values per field, sorted with Spanish collation
pub fn facets_from_rows(rows: &[Record]) -> FacetSet {
    let mut facets = FacetSet::empty();

    for field in FilterField::ALL {
        let mut values: Vec<String> = rows
            .iter()
            .filter_map(|row| field_text(row, field.as_str()))
            .map(|value| value.to_lowercase())
            .collect();

        sort_spanish(&mut values);
        values.dedup();
        facets.set(field, values);
    }

    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FACETS_PATH, LIST_PATH};
    use crate::sources::MemoryTransport;
    use crate::RequestError;
    use serde_json::json;
    use std::sync::Arc;

    fn rows(values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let mut row = Record::new();
                row.insert("documento".into(), json!(i));
                row.insert("corregimiento".into(), json!(value));
                row
            })
            .collect()
    }

    fn resolver(transport: &Arc<MemoryTransport>) -> FacetResolver {
        FacetResolver::new(RueaApi::new(transport.clone()))
    }

    #[tokio::test]
    async fn test_failing_endpoint_falls_back_to_rows() {
        let transport = Arc::new(MemoryTransport::new(rows(&["Uno", "uno ", "Dos"])));
        transport.fail(FACETS_PATH, RequestError::Status { status: 500, detail: None });

        let resolution = resolver(&transport).resolve(&FilterSet::new()).await;

        assert_eq!(resolution.source, ResolutionSource::Fallback);
        assert_eq!(resolution.facets.get(FilterField::Corregimiento), &["dos", "uno"]);
        assert!(resolution.facets.get(FilterField::Vereda).is_empty());
        assert_eq!(resolution.reason.as_deref(), Some("HTTP 500"));
        assert_eq!(resolution.error, None);
    }

    #[tokio::test]
    async fn test_empty_answer_falls_back() {
        let transport = Arc::new(MemoryTransport::new(rows(&["Altavista"])));
        transport.respond_with(FACETS_PATH, json!({"corregimiento": [], "vereda": []}));

        let resolution = resolver(&transport).resolve(&FilterSet::new()).await;
        assert_eq!(resolution.source, ResolutionSource::Fallback);
        assert_eq!(resolution.facets.get(FilterField::Corregimiento), &["altavista"]);
    }

    #[tokio::test]
    async fn test_server_facets_are_used_as_is() {
        let transport = Arc::new(MemoryTransport::new(rows(&["12 - Corregimiento de San Sebastián"])));

        let resolution = resolver(&transport).resolve(&FilterSet::new()).await;
        assert_eq!(resolution.source, ResolutionSource::Server);
        assert_eq!(resolution.facets.get(FilterField::Corregimiento), &["san sebastian"]);
        assert_eq!(transport.call_count(LIST_PATH), 0);
    }

    #[tokio::test]
    async fn test_sample_is_capped_and_filtered() {
        let transport = Arc::new(MemoryTransport::new(rows(&["a", "b", "c", "d", "e"])));
        transport.fail(FACETS_PATH, RequestError::Transport("refused".into()));

        let resolution = resolver(&transport)
            .with_limits(FetchLimits::new(2, 3))
            .resolve(&FilterSet::new())
            .await;
        assert_eq!(resolution.facets.get(FilterField::Corregimiento), &["a", "b", "c"]);

        let calls = transport.calls();
        let list_calls: Vec<_> = calls.iter().filter(|call| call.path == LIST_PATH).collect();
        assert_eq!(list_calls.len(), 2);
        assert_eq!(list_calls[0].params.get("order_by"), Some("documento"));
    }

    #[tokio::test]
    async fn test_both_paths_failing_degrades_to_empty() {
        let transport = Arc::new(MemoryTransport::new(rows(&["Uno"])));
        transport.fail(FACETS_PATH, RequestError::Status { status: 404, detail: None });
        transport.fail(LIST_PATH, RequestError::Transport("connection refused".into()));

        let resolution = resolver(&transport).resolve(&FilterSet::new()).await;

        assert_eq!(resolution.source, ResolutionSource::Degraded);
        assert!(resolution.facets.is_empty());
        let error = resolution.error.unwrap();
        assert!(error.contains("HTTP 404"));
        assert!(error.contains("connection refused"));
    }

    #[test]
    fn test_facets_from_rows_sort_accents_together() {
        let facets = facets_from_rows(&rows(&["Ébano", "Zarzal", "Encenillo", "ebano"]));
        assert_eq!(
            facets.get(FilterField::Corregimiento),
            &["ebano", "ébano", "encenillo", "zarzal"]
        );
    }
}
