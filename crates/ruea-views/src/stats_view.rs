//! "Estadísticas" page: grouped counts of the filtered rows

use std::sync::Arc;

use egui::Ui;
use serde_json::{json, Value};

use ruea_core::{FilterField, FilterSet, LoadSlot, StatSeries};
use ruea_data::{DashboardConfig, StatsBatch, StatsRequest, StatsResolver};
use ruea_ui::{error_banner, fallback_note, loading_indicator};

use crate::plots::{BarChartConfig, BarChartView, LinePlotView};
use crate::{SpaceView, SpaceViewId, ViewerContext};

pub const STATS_VIEW_ID: SpaceViewId = "estadisticas";

/// Groupings drawn by the page: veredas by count (top `top_veredas`), lines
/// of production by count, corregimientos by name
pub fn page_requests(top_veredas: usize) -> [StatsRequest; 3] {
    [
        StatsRequest::new(FilterField::Vereda).top(top_veredas),
        StatsRequest::new(FilterField::LineaProductiva),
        StatsRequest::new(FilterField::Corregimiento).by_name(),
    ]
}

/// Banner text for a batch that could not be loaded
pub fn error_text(error: &str) -> String {
    format!("Error cargando estadísticas: {}", error)
}

pub struct StatsView {
    title: String,
    top_veredas: usize,
    batch: Arc<LoadSlot<StatsBatch>>,
    requested: Option<FilterSet>,

    veredas: BarChartView,
    lineas: BarChartView,
    corregimientos: LinePlotView,
}

impl StatsView {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            title: "Estadísticas".to_string(),
            top_veredas: config.top_veredas,
            batch: Arc::new(LoadSlot::default()),
            requested: None,
            veredas: BarChartView::new("veredas", format!("Top {} Veredas", config.top_veredas)),
            lineas: BarChartView::new("lineas", "Distribución por Línea Productiva").with_config(BarChartConfig {
                legend_limit: Some(12),
                ..BarChartConfig::default()
            }),
            corregimientos: LinePlotView::new("corregimientos", "Registros por Corregimiento"),
        }
    }

    fn series(batch: &StatsBatch, field: FilterField) -> StatSeries {
        batch.get(field).cloned().unwrap_or_default()
    }
}

impl SpaceView for StatsView {
    fn id(&self) -> SpaceViewId {
        STATS_VIEW_ID
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "StatsView"
    }

    fn refresh(&mut self, ctx: &ViewerContext) {
        let filters = ctx.filters();
        if self.requested.as_ref() == Some(&filters) {
            return;
        }

        let resolver = StatsResolver::new(ctx.api.clone()).with_limits(ctx.config.fetch_limits());
        let requests = page_requests(self.top_veredas);
        let batch_filters = filters.clone();
        ctx.loader.load("Estadísticas", &self.batch, async move {
            resolver.resolve(&batch_filters, &requests).await
        });
        self.requested = Some(filters);
    }

    fn ui(&mut self, _ctx: &ViewerContext, ui: &mut Ui) {
        let state = self.batch.snapshot();

        ui.horizontal(|ui| {
            ui.heading(&self.title);
            if state.data.source.is_fallback() {
                fallback_note(ui, state.data.reason.as_deref().unwrap_or_default());
            }
        });
        ui.add_space(4.0);

        if let Some(error) = &state.error {
            error_banner(ui, &error_text(error));
        }
        if state.loading && state.data.series.is_empty() {
            loading_indicator(ui);
        }

        let batch = &state.data;
        ui.columns(2, |columns| {
            self.veredas.show(&mut columns[0], &Self::series(batch, FilterField::Vereda));
            self.lineas.show(&mut columns[1], &Self::series(batch, FilterField::LineaProductiva));
        });
        ui.add_space(12.0);
        self.corregimientos.show(ui, &Self::series(batch, FilterField::Corregimiento));
    }

    fn save_config(&self) -> Value {
        json!({ "top_veredas": self.top_veredas })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(top) = config.get("top_veredas").and_then(Value::as_u64).filter(|top| *top > 0) {
            self.top_veredas = top as usize;
            self.veredas = BarChartView::new("veredas", format!("Top {} Veredas", self.top_veredas));
            self.requested = None;
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use ruea_core::{SeriesOrder, StatItem};
    use ruea_data::api::{LIST_PATH, STATS_PATH};
    use ruea_data::{MemoryTransport, RequestError, ResolutionSource};

    async fn settle<T>(slot: &LoadSlot<T>) {
        while slot.is_loading() {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_page_requests() {
        let [veredas, lineas, corregimientos] = page_requests(10);
        assert_eq!((veredas.field, veredas.top, veredas.order), (FilterField::Vereda, Some(10), SeriesOrder::ByCount));
        assert_eq!((lineas.field, lineas.top), (FilterField::LineaProductiva, None));
        assert_eq!(corregimientos.order, SeriesOrder::ByName);
    }

    #[test]
    fn test_error_text_keeps_the_cause() {
        assert_eq!(
            error_text("stats: HTTP 503 - mantenimiento"),
            "Error cargando estadísticas: stats: HTTP 503 - mantenimiento"
        );
    }

    #[tokio::test]
    async fn test_failed_fallback_keeps_the_server_message() {
        let transport = Arc::new(MemoryTransport::new(test_support::rows()).without_stats());
        transport.fail(
            LIST_PATH,
            RequestError::Status {
                status: 503,
                detail: Some("mantenimiento".to_string()),
            },
        );
        let ctx = test_support::context(transport.clone());
        let mut view = StatsView::new(&ctx.config);

        view.refresh(&ctx);
        settle(&view.batch).await;

        let state = view.batch.snapshot();
        assert_eq!(state.data.source, ResolutionSource::Degraded);
        let error = state.error.unwrap();
        assert!(error_text(&error).contains("HTTP 503 - mantenimiento"), "{}", error);
    }

    #[tokio::test]
    async fn test_missing_stats_endpoint_uses_one_scan() {
        let transport = Arc::new(MemoryTransport::new(test_support::rows()).without_stats());
        let ctx = test_support::context(transport.clone());
        let mut view = StatsView::new(&ctx.config);

        view.refresh(&ctx);
        view.refresh(&ctx);
        settle(&view.batch).await;

        assert_eq!(transport.call_count(STATS_PATH), 3);
        assert_eq!(transport.call_count(LIST_PATH), 1);

        let batch = view.batch.data();
        assert_eq!(batch.source, ResolutionSource::Fallback);
        assert_eq!(
            StatsView::series(&batch, FilterField::LineaProductiva).items(),
            &[StatItem::new("cafe", 2), StatItem::new("flores", 1)]
        );
        assert_eq!(
            StatsView::series(&batch, FilterField::Corregimiento).items(),
            &[StatItem::new("altavista", 1), StatItem::new("santa elena", 2)]
        );
    }

    #[tokio::test]
    async fn test_server_stats_are_used_when_available() {
        let transport = Arc::new(MemoryTransport::new(test_support::rows()));
        let ctx = test_support::context(transport.clone());
        let mut view = StatsView::new(&ctx.config);

        view.refresh(&ctx);
        settle(&view.batch).await;

        let batch = view.batch.data();
        assert_eq!(batch.source, ResolutionSource::Server);
        assert_eq!(transport.call_count(LIST_PATH), 0);
        assert_eq!(
            StatsView::series(&batch, FilterField::Vereda).items(),
            &[StatItem::new("el plan", 1), StatItem::new("mazo", 1), StatItem::new("el corazon", 1)]
        );
    }

    #[tokio::test]
    async fn test_top_veredas_setting() {
        let ctx = test_support::context(Arc::new(MemoryTransport::new(Vec::new())));
        let mut view = StatsView::new(&ctx.config);

        view.load_config(json!({"top_veredas": 5}));
        assert_eq!(view.veredas.title(), "Top 5 Veredas");
        assert_eq!(view.save_config(), json!({"top_veredas": 5}));

        view.load_config(json!({"top_veredas": 0}));
        assert_eq!(view.top_veredas, 5);
    }
}
