//! Paging through the list endpoint to materialize a capped row set

use ruea_core::{FilterSet, PageRequest, Record, SortSpec, MAX_PAGE_SIZE};

use crate::api::RueaApi;
use crate::RequestError;

/// Bounds of an exhaustive fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Rows per request, clamped to the server ceiling
    pub page_size: usize,
    /// Stop once this many rows have been collected
    pub max_rows: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_rows: 20_000,
        }
    }
}

impl FetchLimits {
    pub fn new(page_size: usize, max_rows: usize) -> Self {
        Self { page_size, max_rows }
    }
}

/// Fetch every row matching `filters`, up to `limits.max_rows`.
///
/// Pages are requested in `documento` order at increasing offsets. The scan
/// ends on the first page shorter than requested, and no request is issued
/// once the cap is reached, so with a large result set the rows returned are
/// only a prefix of the data.
pub async fn fetch_all(
    api: &RueaApi,
    filters: &FilterSet,
    limits: FetchLimits,
) -> Result<Vec<Record>, RequestError> {
    let page_size = limits.page_size.clamp(1, MAX_PAGE_SIZE);
    let mut rows: Vec<Record> = Vec::new();

    while rows.len() < limits.max_rows {
        let wanted = page_size.min(limits.max_rows - rows.len());
        let request = PageRequest::new(filters.clone())
            .sorted(SortSpec::default())
            .window(wanted, rows.len());

        let page = api.list(&request).await?;
        let received = page.items.len();
        tracing::debug!(offset = request.offset, wanted, received, "Fetched page");

        rows.extend(page.items.into_iter().take(wanted));
        if received < wanted {
            return Ok(rows);
        }
    }

    tracing::warn!(
        max_rows = limits.max_rows,
        "Row cap reached; client-side aggregates are a lower bound"
    );
    Ok(rows)
}
