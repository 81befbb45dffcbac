//! Table state management

use crate::filters::{FilterSet, PageRequest, SortSpec};
use crate::pagination::Pager;
use crate::query::QueryParams;

/// Filters, sort and window of the main data table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableState {
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub pager: Pager,
}

impl TableState {
    /// Create a table state with the given page size
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: FilterSet::new(),
            sort: SortSpec::default(),
            pager: Pager::new(page_size),
        }
    }

    /// The list request for the current state
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.filters.clone())
            .sorted(self.sort.clone())
            .window(self.pager.limit, self.pager.offset)
    }

    /// Replace the filters; a change goes back to the first page.
    /// Returns whether the filters changed.
    pub fn set_filters(&mut self, filters: FilterSet) -> bool {
        if self.filters == filters {
            return false;
        }
        self.filters = filters;
        self.pager.reset();
        true
    }

    /// Header click on `column`
    pub fn sort_by(&mut self, column: &str) {
        self.sort.toggle(column);
        self.pager.reset();
    }

    /// Change the page size
    pub fn set_page_size(&mut self, limit: usize) {
        self.pager.set_limit(limit);
    }

    /// Parameters for bulk downloads: filters and order, no window
    pub fn download_params(&self) -> QueryParams {
        let mut params = self.filters.to_params();
        params.extend(&self.sort.to_params());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterField, SortDirection};

    #[test]
    fn test_filter_change_resets_offset() {
        let mut state = TableState::new(50);
        state.pager.next(500);
        assert_eq!(state.request().offset, 50);

        assert!(state.set_filters(FilterSet::new().with(FilterField::Sexo, "f")));
        assert_eq!(state.request().offset, 0);

        state.pager.next(500);
        assert!(!state.set_filters(FilterSet::new().with(FilterField::Sexo, "f")));
        assert_eq!(state.request().offset, 50);
    }

    #[test]
    fn test_sort_resets_offset() {
        let mut state = TableState::new(25);
        state.pager.next(100);
        state.sort_by("documento");

        let request = state.request();
        assert_eq!(request.sort.direction, SortDirection::Desc);
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn test_download_params_have_no_window() {
        let mut state = TableState::new(25);
        state.set_filters(FilterSet::new().with(FilterField::Vereda, "el plan"));
        let params = state.download_params();

        assert_eq!(params.get("vereda"), Some("el plan"));
        assert_eq!(params.get("order_by"), Some("documento"));
        assert!(!params.contains("limit"));
        assert!(!params.contains("offset"));
    }
}
