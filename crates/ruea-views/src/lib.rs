//! Dashboard pages and the widgets they are built from

mod space_view;
mod viewport;
pub mod export;
pub mod filters_panel;
pub mod general_view;
pub mod plots;
pub mod stats;
pub mod stats_view;
pub mod tables;

pub use export::{ExportButtons, ExportOutcome};
pub use filters_panel::FiltersPanel;
pub use general_view::GeneralView;
pub use space_view::{SpaceView, SpaceViewId};
pub use stats::SummaryStatsView;
pub use stats_view::StatsView;
pub use tables::{discover_columns, format_cell, TableConfig, TableView};
pub use viewport::Viewport;

use std::sync::Arc;

use parking_lot::RwLock;
use ruea_core::events::events::FiltersChanged;
use ruea_core::{EventBus, FilterSet};
use ruea_data::{DashboardConfig, HttpTransport, Loader, RueaApi};

/// Context passed to views during rendering
#[derive(Clone)]
pub struct ViewerContext {
    /// Typed access to the API, whatever transport backs it
    pub api: RueaApi,

    /// Runs loads off the UI thread
    pub loader: Loader,

    pub config: Arc<DashboardConfig>,

    /// Filters shared by every page
    filters: Arc<RwLock<FilterSet>>,

    /// Set when talking to a real server; enables server-side downloads
    pub http: Option<Arc<HttpTransport>>,

    /// Tokio runtime handle
    pub runtime_handle: tokio::runtime::Handle,
}

impl ViewerContext {
    pub fn new(api: RueaApi, loader: Loader, config: Arc<DashboardConfig>) -> Self {
        let runtime_handle = loader.runtime().clone();
        Self {
            api,
            loader,
            config,
            filters: Arc::new(RwLock::new(FilterSet::new())),
            http: None,
            runtime_handle,
        }
    }

    pub fn with_http(mut self, http: Arc<HttpTransport>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn events(&self) -> &Arc<EventBus> {
        self.loader.events()
    }

    /// Current filters
    pub fn filters(&self) -> FilterSet {
        self.filters.read().clone()
    }

    /// Replace the shared filters, announcing the change.
    /// Returns whether anything changed.
    pub fn set_filters(&self, origin: &str, filters: FilterSet) -> bool {
        {
            let mut current = self.filters.write();
            if *current == filters {
                return false;
            }
            *current = filters.clone();
        }

        tracing::debug!(view = origin, active = filters.len(), "Filters changed");
        self.events().publish(FiltersChanged {
            view: origin.to_string(),
            filters,
        });
        true
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use ruea_core::Record;
    use ruea_data::MemoryTransport;
    use serde_json::json;

    pub fn rows() -> Vec<Record> {
        [
            json!({"documento": 1, "cedula": "71", "corregimiento": "Santa Elena", "vereda": "El Plan", "linea_productiva": "Flores", "sexo": "F"}),
            json!({"documento": 2, "cedula": "72", "corregimiento": "Santa Elena", "vereda": "Mazo", "linea_productiva": "Café", "sexo": "M"}),
            json!({"documento": 3, "cedula": "73", "corregimiento": "Altavista", "vereda": "Vereda El Corazón", "linea_productiva": "cafe", "sexo": "F"}),
        ]
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect()
    }

    pub fn context(transport: Arc<MemoryTransport>) -> ViewerContext {
        let loader = Loader::new(tokio::runtime::Handle::current(), Arc::new(EventBus::new()));
        ViewerContext::new(RueaApi::new(transport), loader, Arc::new(DashboardConfig::default()))
    }
}
