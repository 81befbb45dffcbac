//! Core functionality for the RUEA dashboard
//!
//! This crate provides the request-scoped domain types (filters, sorting,
//! pagination, records, facets and stat series) together with the small
//! amount of shared state the dashboard needs to stay consistent while
//! requests are in flight.

pub mod collation;
pub mod events;
pub mod facets;
pub mod filters;
pub mod pagination;
pub mod query;
pub mod record;
pub mod state;
pub mod stats;
pub mod sync;

// Re-export commonly used types
pub use collation::{spanish_cmp, strip_diacritics};
pub use events::{EventBus, Event, EventHandler, handler_from_fn};
pub use facets::FacetSet;
pub use filters::{FilterField, FilterSet, SortDirection, SortSpec, PageRequest, MAX_PAGE_SIZE};
pub use pagination::{Pager, PAGE_SIZE_OPTIONS, DEFAULT_PAGE_SIZE};
pub use query::QueryParams;
pub use record::{Record, RecordPage, field_text};
pub use state::TableState;
pub use stats::{StatItem, StatSeries, SeriesOrder};
pub use sync::{LoadSlot, LoadState, RequestGuard, RequestToken};
