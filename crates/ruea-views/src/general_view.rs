//! "General" page: headline figures and the paginated results table

use std::sync::Arc;

use egui::{RichText, Ui};
use serde_json::{json, Value};

use ruea_core::{FilterSet, LoadSlot, PageRequest, RecordPage, SortSpec, TableState};
use ruea_data::{DashboardConfig, Summary, SummaryResolver};
use ruea_ui::{error_banner, kpi_card, loading_indicator};

use crate::export::ExportButtons;
use crate::stats::SummaryStatsView;
use crate::tables::{format_number, TableView};
use crate::{SpaceView, SpaceViewId, ViewerContext};

pub const GENERAL_VIEW_ID: SpaceViewId = "general";

/// `Mostrando {n} de {total} registros`
pub fn showing_text(shown: usize, total: usize) -> String {
    format!(
        "Mostrando {} de {} registros",
        format_number(&(shown as u64).into()),
        format_number(&(total as u64).into())
    )
}

pub struct GeneralView {
    title: String,
    table: TableState,
    page_size_options: Vec<usize>,

    page: Arc<LoadSlot<RecordPage>>,
    requested: Option<PageRequest>,

    summary: Arc<LoadSlot<Summary>>,
    summary_for: Option<FilterSet>,

    table_view: TableView,
    summary_view: SummaryStatsView,
    exports: ExportButtons,
}

impl GeneralView {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            title: "General".to_string(),
            table: TableState::new(config.default_page_size),
            page_size_options: config.page_size_options.clone(),
            page: Arc::new(LoadSlot::default()),
            requested: None,
            summary: Arc::new(LoadSlot::default()),
            summary_for: None,
            table_view: TableView::new(),
            summary_view: SummaryStatsView::new(),
            exports: ExportButtons::new(),
        }
    }

    pub fn table_state(&self) -> &TableState {
        &self.table
    }

    fn kpis(&self, ui: &mut Ui, page: &RecordPage) {
        ui.horizontal_wrapped(|ui| {
            kpi_card(ui, "Registros", &format_number(&(page.total_count as u64).into()));
            kpi_card(ui, "Por página", &self.table.pager.limit.to_string());
            kpi_card(ui, "Página", &self.table.pager.page_number().to_string());
        });
    }

    fn summary_section(&self, ui: &mut Ui) {
        let state = self.summary.snapshot();
        egui::CollapsingHeader::new("Resumen")
            .default_open(true)
            .show(ui, |ui| {
                if let Some(error) = &state.error {
                    error_banner(ui, error);
                } else if state.loading && state.data.total == 0 {
                    loading_indicator(ui);
                } else {
                    self.summary_view.ui(ui, &state.data);
                }
            });
    }

    fn footer(&mut self, ui: &mut Ui, page: &RecordPage) {
        let total = self.table.pager.effective_total(page.total_count, page.items.len());

        ui.horizontal(|ui| {
            ui.label(showing_text(page.items.len(), page.total_count.max(page.items.len())));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut limit = self.table.pager.limit;
                egui::ComboBox::from_id_source("page_size")
                    .selected_text(format!("{} / pág", limit))
                    .show_ui(ui, |ui| {
                        for &size in &self.page_size_options {
                            ui.selectable_value(&mut limit, size, format!("{} / pág", size));
                        }
                    });
                if limit != self.table.pager.limit {
                    self.table.set_page_size(limit);
                }

                if ui
                    .add_enabled(self.table.pager.can_next(total), egui::Button::new("Siguiente →"))
                    .clicked()
                {
                    self.table.pager.next(total);
                }
                if ui
                    .add_enabled(self.table.pager.can_prev(), egui::Button::new("← Anterior"))
                    .clicked()
                {
                    self.table.pager.prev();
                }
            });
        });
    }
}

impl SpaceView for GeneralView {
    fn id(&self) -> SpaceViewId {
        GENERAL_VIEW_ID
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "GeneralView"
    }

    fn refresh(&mut self, ctx: &ViewerContext) {
        let filters = ctx.filters();
        self.table.set_filters(filters.clone());

        let request = self.table.request();
        if self.requested.as_ref() != Some(&request) {
            let api = ctx.api.clone();
            let list_request = request.clone();
            ctx.loader
                .load("General", &self.page, async move { api.list(&list_request).await });
            self.requested = Some(request);
        }

        if self.summary_for.as_ref() != Some(&filters) {
            let resolver = SummaryResolver::new(ctx.api.clone())
                .with_limits(ctx.config.fetch_limits())
                .with_top(ctx.config.summary_top);
            let summary_filters = filters.clone();
            ctx.loader
                .load("Resumen", &self.summary, async move { resolver.resolve(&summary_filters).await });
            self.summary_for = Some(filters);
        }
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let state = self.page.snapshot();

        ui.heading(&self.title);
        ui.add_space(4.0);
        self.kpis(ui, &state.data);
        ui.add_space(8.0);
        self.summary_section(ui);
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label(RichText::new("Resultados").strong().size(16.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let filters = self.table.filters.clone();
                let sort = self.table.sort.clone();
                self.exports.ui(ui, ctx, &filters, &sort);
            });
        });
        ui.separator();

        if let Some(error) = &state.error {
            error_banner(ui, error);
        } else if state.loading && state.data.is_empty() {
            loading_indicator(ui);
        } else if state.data.is_empty() {
            ruea_ui::empty_state(ui, "Sin resultados");
        } else {
            let first_row = self.table.pager.offset + 1;
            if let Some(column) = self.table_view.show(ui, &state.data.items, &self.table.sort, first_row) {
                self.table.sort_by(&column);
            }
        }

        ui.separator();
        self.footer(ui, &state.data);
    }

    fn save_config(&self) -> Value {
        json!({
            "page_size": self.table.pager.limit,
            "sort": self.table.sort,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(size) = config.get("page_size").and_then(Value::as_u64) {
            if self.page_size_options.contains(&(size as usize)) {
                self.table.set_page_size(size as usize);
            }
        }
        if let Some(sort) = config
            .get("sort")
            .and_then(|sort| serde_json::from_value::<SortSpec>(sort.clone()).ok())
        {
            self.table.sort = sort;
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
    use ruea_core::{FilterField, SortDirection};
    use ruea_data::api::{LIST_PATH, SUMMARY_PATH};
    use ruea_data::MemoryTransport;

    async fn settle<T>(slot: &LoadSlot<T>) {
        while slot.is_loading() {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_showing_text() {
        assert_eq!(showing_text(50, 1234), "Mostrando 50 de 1.234 registros");
    }

    #[tokio::test]
    async fn test_refresh_requests_each_state_once() {
        let transport = Arc::new(MemoryTransport::new(test_support::rows()));
        let ctx = test_support::context(transport.clone());
        let mut view = GeneralView::new(&ctx.config);

        view.refresh(&ctx);
        view.refresh(&ctx);
        settle(&view.page).await;
        settle(&view.summary).await;

        assert_eq!(transport.call_count(LIST_PATH), 1);
        assert_eq!(transport.call_count(SUMMARY_PATH), 1);
        assert_eq!(view.page.data().items.len(), 3);
        assert_eq!(view.summary.data().total, 3);

        view.table.sort_by("vereda");
        view.refresh(&ctx);
        settle(&view.page).await;
        assert_eq!(transport.call_count(LIST_PATH), 2);
        assert_eq!(transport.call_count(SUMMARY_PATH), 1);

        let last = transport.calls().pop().unwrap();
        assert_eq!(last.params.get("order_by"), Some("vereda"));
        assert_eq!(last.params.get("offset"), Some("0"));
    }

    #[tokio::test]
    async fn test_filter_change_returns_to_first_page() {
        let transport = Arc::new(MemoryTransport::new(test_support::rows()));
        let ctx = test_support::context(transport.clone());
        let mut view = GeneralView::new(&ctx.config);
        view.table.set_page_size(25);
        view.table.pager.offset = 25;

        ctx.set_filters("test", FilterSet::new().with(FilterField::Sexo, "F"));
        view.refresh(&ctx);
        settle(&view.page).await;

        assert_eq!(view.table_state().pager.offset, 0);
        assert_eq!(view.page.data().items.len(), 2);
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let ctx = test_support::context(Arc::new(MemoryTransport::new(Vec::new())));
        let mut view = GeneralView::new(&ctx.config);
        view.table.set_page_size(100);
        view.table.sort = SortSpec::new("vereda", SortDirection::Desc);

        let saved = view.save_config();
        let mut restored = GeneralView::new(&ctx.config);
        restored.load_config(saved);

        assert_eq!(restored.table_state().pager.limit, 100);
        assert_eq!(restored.table_state().sort, SortSpec::new("vereda", SortDirection::Desc));

        restored.load_config(json!({"page_size": 7}));
        assert_eq!(restored.table_state().pager.limit, 100);
    }
}
