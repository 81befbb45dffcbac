// Resolvers degrade step by step: server endpoint, client-side scan, empty result with an error
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use ruea_core::{FilterField, FilterSet, QueryParams, StatItem};
use ruea_data::api::{FACETS_PATH, LIST_PATH, STATS_PATH};
use ruea_data::{
    FacetResolver, FetchLimits, RequestError, ResolutionSource, RueaApi, StatsRequest, StatsResolver,
    Transport,
};

/// Server without facet or stats support, counting list requests
struct ListOnly {
    rows: Vec<Value>,
    list_calls: AtomicUsize,
    stats_calls: AtomicUsize,
}

impl ListOnly {
    fn new(rows: Vec<Value>) -> Self {
        Self {
            rows,
            list_calls: AtomicUsize::new(0),
            stats_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transport for ListOnly {
    async fn get_json(&self, path: &str, params: &QueryParams) -> Result<Value, RequestError> {
        match path {
            LIST_PATH => {
                self.list_calls.fetch_add(1, Ordering::SeqCst);
                let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
                let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(50);
                let items: Vec<Value> = self.rows.iter().skip(offset).take(limit).cloned().collect();
                // legacy shape: count is the page length
                Ok(json!({ "count": items.len(), "items": items }))
            }
            STATS_PATH => {
                self.stats_calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({ "items": [] }))
            }
            FACETS_PATH => Err(RequestError::Status {
                status: 500,
                detail: Some("view v_ruea missing".to_string()),
            }),
            _ => Err(RequestError::Status { status: 404, detail: None }),
        }
    }

    fn source_name(&self) -> &str {
        "list-only"
    }
}

fn rows() -> Vec<Value> {
    vec![
        json!({"documento": 1, "corregimiento": "Uno", "vereda": "01 - Vereda Alto", "linea_productiva": "Café"}),
        json!({"documento": 2, "corregimiento": "uno ", "vereda": "Alto", "linea_productiva": null}),
        json!({"documento": 3, "corregimiento": "Dos", "vereda": "Veredas de Bajo", "linea_productiva": "cafe"}),
    ]
}

#[tokio::test]
async fn test_facets_fall_back_to_sampled_rows() {
    let transport = Arc::new(ListOnly::new(rows()));
    let resolver = FacetResolver::new(RueaApi::new(transport.clone()));

    let resolution = resolver.resolve(&FilterSet::new()).await;

    assert_eq!(resolution.source, ResolutionSource::Fallback);
    assert_eq!(resolution.reason.as_deref(), Some("HTTP 500 - view v_ruea missing"));
    assert_eq!(resolution.facets.get(FilterField::Corregimiento), &["dos", "uno"]);
    assert_eq!(resolution.facets.get(FilterField::LineaProductiva), &["cafe", "café"]);
    assert_eq!(transport.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_stats_batch_triggers_one_scan() {
    let transport = Arc::new(ListOnly::new(rows()));
    let resolver = StatsResolver::new(RueaApi::new(transport.clone())).with_limits(FetchLimits::new(2, 100));

    let requests = [
        StatsRequest::new(FilterField::Vereda).top(10),
        StatsRequest::new(FilterField::LineaProductiva),
        StatsRequest::new(FilterField::Corregimiento).by_name(),
    ];
    let batch = resolver.resolve(&FilterSet::new(), &requests).await;

    assert_eq!(batch.source, ResolutionSource::Fallback);
    assert_eq!(transport.stats_calls.load(Ordering::SeqCst), 3);
    // pages of 2 over 3 rows: one scan, two requests, shared by every grouping
    assert_eq!(transport.list_calls.load(Ordering::SeqCst), 2);

    assert_eq!(batch.get(FilterField::Vereda).unwrap().items(), &[StatItem::new("alto", 2), StatItem::new("bajo", 1)]);
    assert_eq!(batch.get(FilterField::LineaProductiva).unwrap().items(), &[StatItem::new("cafe", 2)]);
    assert_eq!(
        batch.get(FilterField::Corregimiento).unwrap().items(),
        &[StatItem::new("dos", 1), StatItem::new("uno", 2)]
    );
}

#[tokio::test]
async fn test_unreachable_server_degrades_without_panicking() {
    struct Down;

    #[async_trait]
    impl Transport for Down {
        async fn get_json(&self, _path: &str, _params: &QueryParams) -> Result<Value, RequestError> {
            Err(RequestError::Transport("connection refused".to_string()))
        }

        fn source_name(&self) -> &str {
            "down"
        }
    }

    let api = RueaApi::new(Arc::new(Down));

    let facets = FacetResolver::new(api.clone()).resolve(&FilterSet::new()).await;
    assert_eq!(facets.source, ResolutionSource::Degraded);
    assert!(facets.facets.is_empty());
    assert!(facets.error.is_some());

    let stats = StatsResolver::new(api)
        .resolve(&FilterSet::new(), &[StatsRequest::new(FilterField::Sexo)])
        .await;
    assert_eq!(stats.source, ResolutionSource::Degraded);
    assert_eq!(stats.series.len(), 1);
    assert!(stats.is_empty());
}
