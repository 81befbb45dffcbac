//! In-memory transport serving the dataset endpoints from a row vector

use std::cmp::Ordering;
use std::time::Duration;

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use ruea_core::record::raw_text;
use ruea_core::{
    spanish_cmp, FilterField, QueryParams, Record, SeriesOrder, SortDirection, MAX_PAGE_SIZE,
};

use super::Transport;
use crate::aggregate::count_by_norm;
use crate::api::{FACETS_PATH, LIST_PATH, STATS_PATH, SUMMARY_PATH};
use crate::normalize::Normalizer;
use crate::RequestError;

const SUMMARY_TOP: usize = 5;

/// A request received by a `MemoryTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub path: String,
    pub params: QueryParams,
}

/// Transport answering from rows held in memory.
///
/// Behaves like the real API for the list, facet, summary and stats
/// endpoints. Individual endpoints can be made to fail or to return a canned
/// body, and every call is recorded.
pub struct MemoryTransport {
    rows: Vec<Record>,
    latency: Option<Duration>,
    stats_enabled: bool,
    failures: Mutex<AHashMap<String, RequestError>>,
    canned: Mutex<AHashMap<String, Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MemoryTransport {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            latency: None,
            stats_enabled: true,
            failures: Mutex::new(AHashMap::new()),
            canned: Mutex::new(AHashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delay every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer the stats endpoint with 404, like servers that do not have it
    pub fn without_stats(mut self) -> Self {
        self.stats_enabled = false;
        self
    }

    /// Make every call to `path` fail with `error`
    pub fn fail(&self, path: &str, error: RequestError) {
        self.failures.lock().insert(path.to_string(), error);
    }

    /// Answer every call to `path` with `body`
    pub fn respond_with(&self, path: &str, body: Value) {
        self.canned.lock().insert(path.to_string(), body);
    }

    /// Remove failures and canned bodies
    pub fn reset(&self) {
        self.failures.lock().clear();
        self.canned.lock().clear();
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls received for `path`
    pub fn call_count(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.path == path).count()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    fn matching_rows(&self, params: &QueryParams, skip: Option<FilterField>) -> Vec<&Record> {
        let filters: Vec<(FilterField, String)> = FilterField::ALL
            .into_iter()
            .filter(|field| Some(*field) != skip)
            .filter_map(|field| params.get(field.as_str()).map(|value| (field, value.to_string())))
            .collect();

        self.rows
            .iter()
            .filter(|row| filters.iter().all(|(field, wanted)| matches_filter(row, *field, wanted)))
            .collect()
    }

    fn list(&self, params: &QueryParams) -> Result<Value, RequestError> {
        let limit = parse_param(params, "limit", 50)?;
        let offset = parse_param(params, "offset", 0)?;
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(unprocessable(format!("limit must be between 1 and {}", MAX_PAGE_SIZE)));
        }

        let mut rows = self.matching_rows(params, None);
        let order_by = params.get("order_by").unwrap_or("documento");
        let direction = match params.get("order_dir") {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        rows.sort_by(|a, b| compare_rows(a, b, order_by, direction));

        let total = rows.len();
        let items: Vec<Value> = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| Value::Object(row.clone()))
            .collect();

        Ok(json!({ "total": total, "limit": limit, "offset": offset, "items": items }))
    }

    fn facets(&self, params: &QueryParams) -> Value {
        let mut body = serde_json::Map::new();

        for field in FilterField::ALL {
            let rows: Vec<Record> = self
                .matching_rows(params, Some(field))
                .into_iter()
                .cloned()
                .collect();
            let series = count_by_norm(&rows, field.as_str(), Normalizer::for_field(field))
                .into_view(None, SeriesOrder::ByName);
            let values: Vec<Value> = series.into_items().into_iter().map(|item| Value::String(item.name)).collect();
            body.insert(field.as_str().to_string(), Value::Array(values));
        }

        Value::Object(body)
    }

    fn summary(&self, params: &QueryParams) -> Value {
        let rows: Vec<Record> = self.matching_rows(params, None).into_iter().cloned().collect();

        let top = |field: FilterField| -> Vec<Value> {
            count_by_norm(&rows, field.as_str(), Normalizer::for_field(field))
                .into_view(Some(SUMMARY_TOP), SeriesOrder::ByCount)
                .into_items()
                .into_iter()
                .map(|item| json!({ "name": item.name, "total": item.value }))
                .collect()
        };

        json!({
            "total": rows.len(),
            "top_corregimiento": top(FilterField::Corregimiento),
            "top_vereda": top(FilterField::Vereda),
        })
    }

    fn stats(&self, params: &QueryParams) -> Result<Value, RequestError> {
        if !self.stats_enabled {
            return Err(RequestError::Status {
                status: 404,
                detail: Some("Not Found".to_string()),
            });
        }

        let by: FilterField = params
            .get("by")
            .ok_or_else(|| unprocessable("missing 'by'".to_string()))?
            .parse()
            .map_err(unprocessable)?;
        let top = params
            .get("top")
            .map(|top| top.parse::<usize>().map_err(|e| unprocessable(e.to_string())))
            .transpose()?;

        let rows: Vec<Record> = self.matching_rows(params, None).into_iter().cloned().collect();
        let series = count_by_norm(&rows, by.as_str(), Normalizer::for_field(by)).into_view(top, SeriesOrder::ByCount);

        Ok(json!({ "items": series }))
    }
}

fn unprocessable(detail: String) -> RequestError {
    RequestError::Status {
        status: 422,
        detail: Some(detail),
    }
}

fn parse_param(params: &QueryParams, key: &str, default: usize) -> Result<usize, RequestError> {
    match params.get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| unprocessable(format!("'{}' must be a non-negative integer", key))),
        None => Ok(default),
    }
}

/// Filter semantics of the server: places match on normalized text, either
/// exactly or as a substring; other fields compare case-insensitively.
fn matches_filter(row: &Record, field: FilterField, wanted: &str) -> bool {
    let value = raw_text(row, field.as_str());

    match field {
        FilterField::Corregimiento | FilterField::Vereda => {
            let normalizer = Normalizer::for_field(field);
            let wanted = normalizer.apply(wanted);
            normalizer.apply(&value).contains(&wanted)
        }
        _ => value.trim().to_lowercase() == wanted.trim().to_lowercase(),
    }
}

/// Order two rows by a column, nulls last in either direction
fn compare_rows(a: &Record, b: &Record, column: &str, direction: SortDirection) -> Ordering {
    let (a, b) = (a.get(column), b.get(column));
    let is_null = |v: Option<&Value>| matches!(v, None | Some(Value::Null));

    match (is_null(a), is_null(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ordering = match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => spanish_cmp(&value_text(x), &value_text(y)),
        _ => Ordering::Equal,
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get_json(&self, path: &str, params: &QueryParams) -> Result<Value, RequestError> {
        self.calls.lock().push(RecordedCall {
            path: path.to_string(),
            params: params.clone(),
        });

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self.failures.lock().get(path) {
            return Err(error.clone());
        }
        if let Some(body) = self.canned.lock().get(path) {
            return Ok(body.clone());
        }

        match path {
            LIST_PATH => self.list(params),
            FACETS_PATH => Ok(self.facets(params)),
            SUMMARY_PATH => Ok(self.summary(params)),
            STATS_PATH => self.stats(params),
            _ => Err(RequestError::Status {
                status: 404,
                detail: Some("Not Found".to_string()),
            }),
        }
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}
