//! Typed access to the RUEA endpoints

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ruea_core::collation::sort_spanish;
use ruea_core::{
    FacetSet, FilterField, FilterSet, PageRequest, QueryParams, Record, RecordPage, StatItem,
    StatSeries,
};

use crate::sources::Transport;
use crate::RequestError;

pub const LIST_PATH: &str = "/ruea";
pub const FACETS_PATH: &str = "/ruea/facetas";
pub const SUMMARY_PATH: &str = "/ruea/summary";
pub const STATS_PATH: &str = "/ruea/stats";

/// Headline numbers of the filtered dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: u64,
    pub top_corregimiento: StatSeries,
    pub top_vereda: StatSeries,
}

/// The two list shapes the server is known to return
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Paged { total: usize, items: Vec<Record> },
    Counted { count: usize, items: Vec<Record> },
    Bare { items: Vec<Record> },
}

impl From<ListResponse> for RecordPage {
    fn from(response: ListResponse) -> Self {
        match response {
            ListResponse::Paged { total, items } => RecordPage::new(total, items),
            ListResponse::Counted { count, items } => RecordPage::new(count, items),
            ListResponse::Bare { items } => RecordPage::new(items.len(), items),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FacetsResponse {
    corregimiento: Vec<Option<String>>,
    vereda: Vec<Option<String>>,
    linea_productiva: Vec<Option<String>>,
    escolaridad: Vec<Option<String>>,
    sexo: Vec<Option<String>>,
}

impl FacetsResponse {
    fn take(&mut self, field: FilterField) -> Vec<Option<String>> {
        std::mem::take(match field {
            FilterField::Corregimiento => &mut self.corregimiento,
            FilterField::Vereda => &mut self.vereda,
            FilterField::LineaProductiva => &mut self.linea_productiva,
            FilterField::Escolaridad => &mut self.escolaridad,
            FilterField::Sexo => &mut self.sexo,
        })
    }
}

#[derive(Deserialize)]
struct NamedTotal {
    #[serde(default)]
    name: Option<String>,
    total: u64,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    top_corregimiento: Vec<NamedTotal>,
    #[serde(default)]
    top_vereda: Vec<NamedTotal>,
}

#[derive(Deserialize)]
struct StatsResponse {
    #[serde(default)]
    items: Vec<StatItem>,
}

fn named_series(items: Vec<NamedTotal>) -> StatSeries {
    items
        .into_iter()
        .map(|item| StatItem::new(item.name.unwrap_or_default(), item.total))
        .collect()
}

/// Trimmed, de-duplicated, collation-sorted facet values
fn facet_values(raw: Vec<Option<String>>) -> Vec<String> {
    let mut values: Vec<String> = raw
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();

    sort_spanish(&mut values);
    values.dedup();
    values
}

/// Client for the dataset endpoints over any transport
#[derive(Clone)]
pub struct RueaApi {
    transport: Arc<dyn Transport>,
}

impl RueaApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Name of the underlying data source
    pub fn source_name(&self) -> &str {
        self.transport.source_name()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &QueryParams) -> Result<T, RequestError> {
        let value: Value = self.transport.get_json(path, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// One page of records
    pub async fn list(&self, request: &PageRequest) -> Result<RecordPage, RequestError> {
        let response: ListResponse = self.get(LIST_PATH, &request.to_params()).await?;
        Ok(response.into())
    }

    /// Server-computed facets for the given filters
    pub async fn facets(&self, filters: &FilterSet) -> Result<FacetSet, RequestError> {
        let mut response: FacetsResponse = self.get(FACETS_PATH, &filters.to_params()).await?;

        let mut facets = FacetSet::empty();
        for field in FilterField::ALL {
            facets.set(field, facet_values(response.take(field)));
        }
        Ok(facets)
    }

    /// Total and top places for the given filters
    pub async fn summary(&self, filters: &FilterSet) -> Result<Summary, RequestError> {
        let response: SummaryResponse = self.get(SUMMARY_PATH, &filters.to_params()).await?;

        Ok(Summary {
            total: response.total,
            top_corregimiento: named_series(response.top_corregimiento),
            top_vereda: named_series(response.top_vereda),
        })
    }

    /// Server-computed counts grouped by `by`, optionally limited to the
    /// `top` largest groups
    pub async fn stats(
        &self,
        by: FilterField,
        filters: &FilterSet,
        top: Option<usize>,
    ) -> Result<StatSeries, RequestError> {
        let mut params = filters.to_params();
        params.insert("by", by);
        params.insert_opt("top", top);

        let response: StatsResponse = self.get(STATS_PATH, &params).await?;
        Ok(StatSeries::new(response.items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemoryTransport;
    use serde_json::json;

    fn api_with(path: &str, body: Value) -> (RueaApi, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new(Vec::new()));
        transport.respond_with(path, body);
        (RueaApi::new(transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_list_accepts_both_shapes() {
        let (api, _) = api_with(LIST_PATH, json!({"total": 120, "limit": 2, "offset": 0, "items": [{"documento": 1}, {"documento": 2}]}));
        let page = api.list(&PageRequest::new(FilterSet::new())).await.unwrap();
        assert_eq!(page.total_count, 120);
        assert_eq!(page.items.len(), 2);

        let (api, _) = api_with(LIST_PATH, json!({"count": 1, "items": [{"documento": 1}]}));
        let page = api.list(&PageRequest::new(FilterSet::new())).await.unwrap();
        assert_eq!(page.total_count, 1);

        let (api, _) = api_with(LIST_PATH, json!({"items": [{"documento": 1}, {"documento": 2}, {"documento": 3}]}));
        let page = api.list(&PageRequest::new(FilterSet::new())).await.unwrap();
        assert_eq!(page.total_count, 3);
    }

    #[tokio::test]
    async fn test_list_rejects_garbage() {
        let (api, _) = api_with(LIST_PATH, json!({"rows": []}));
        let err = api.list(&PageRequest::new(FilterSet::new())).await.unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[tokio::test]
    async fn test_facets_are_cleaned() {
        let (api, _) = api_with(
            FACETS_PATH,
            json!({"corregimiento": ["santa elena", null, "altavista", " ", "altavista"], "sexo": ["m", "f"]}),
        );
        let facets = api.facets(&FilterSet::new()).await.unwrap();

        assert_eq!(facets.get(FilterField::Corregimiento), &["altavista", "santa elena"]);
        assert_eq!(facets.get(FilterField::Sexo), &["f", "m"]);
        assert!(facets.get(FilterField::Vereda).is_empty());
    }

    #[tokio::test]
    async fn test_summary_decodes_named_totals() {
        let (api, _) = api_with(
            SUMMARY_PATH,
            json!({"total": 42, "top_corregimiento": [{"name": "altavista", "total": 30}], "top_vereda": [{"name": null, "total": 2}]}),
        );
        let summary = api.summary(&FilterSet::new()).await.unwrap();

        assert_eq!(summary.total, 42);
        assert_eq!(summary.top_corregimiento.items(), &[StatItem::new("altavista", 30)]);
        assert_eq!(summary.top_vereda.items(), &[StatItem::new("", 2)]);
    }

    #[tokio::test]
    async fn test_stats_sends_grouping_params() {
        let (api, transport) = api_with(STATS_PATH, json!({"items": [{"name": "cafe", "value": 7}]}));
        let filters = FilterSet::new().with(FilterField::Sexo, "f");
        let series = api.stats(FilterField::LineaProductiva, &filters, Some(10)).await.unwrap();

        assert_eq!(series.items(), &[StatItem::new("cafe", 7)]);
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, STATS_PATH);
        assert_eq!(calls[0].params.get("by"), Some("linea_productiva"));
        assert_eq!(calls[0].params.get("top"), Some("10"));
        assert_eq!(calls[0].params.get("sexo"), Some("f"));
    }
}
