//! Filter choices for the categorical fields

use std::sync::Arc;

use egui::{RichText, Ui};

use ruea_core::{FacetSet, FilterField, FilterSet, LoadSlot};
use ruea_data::FacetResolver;
use ruea_ui::{theme, WidgetId};

use crate::ViewerContext;

const ALL_LABEL: &str = "— Todas —";

/// Choices offered for `field`. The current selection stays selectable even
/// when the facets no longer list it.
pub fn options_for(facets: &FacetSet, filters: &FilterSet, field: FilterField) -> Vec<String> {
    let mut options = facets.get(field).to_vec();
    if let Some(selected) = filters.get(field) {
        if !options.iter().any(|option| option == selected) {
            options.insert(0, selected.to_string());
        }
    }
    options
}

/// Filters after the user picks `choice` for `field` (`None` is "all"), or
/// `None` when nothing changes
pub fn apply_choice(filters: &FilterSet, field: FilterField, choice: Option<String>) -> Option<FilterSet> {
    let mut next = filters.clone();
    next.select(field, choice).then_some(next)
}

/// Side panel with one selector per filter field
pub struct FiltersPanel {
    facets: Arc<LoadSlot<FacetSet>>,
    requested: Option<FilterSet>,
}

impl Default for FiltersPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FiltersPanel {
    pub fn new() -> Self {
        Self {
            facets: Arc::new(LoadSlot::default()),
            requested: None,
        }
    }

    /// Reload the facets when the filters changed since the last load
    pub fn refresh(&mut self, ctx: &ViewerContext) {
        let filters = ctx.filters();
        if self.requested.as_ref() == Some(&filters) {
            return;
        }

        let resolver = FacetResolver::new(ctx.api.clone()).with_limits(ctx.config.facet_limits());
        let request = filters.clone();
        ctx.loader
            .load("Filtros", &self.facets, async move { resolver.resolve(&request).await });
        self.requested = Some(filters);
    }

    pub fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let filters = ctx.filters();
        let state = self.facets.snapshot();
        let mut next = None;

        ui.horizontal(|ui| {
            ui.heading("Filtros");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(!filters.is_empty(), egui::Button::new("Limpiar")).clicked() {
                    next = Some(FilterSet::new());
                }
            });
        });
        ui.separator();

        for field in FilterField::ALL {
            let options = options_for(&state.data, &filters, field);
            let selected = filters.get(field);

            ui.label(RichText::new(field.label()).small().strong());
            ui.add_enabled_ui(!options.is_empty() || state.loading, |ui| {
                egui::ComboBox::from_id_source(WidgetId::new("filter").with(field).id())
                    .selected_text(selected.unwrap_or(ALL_LABEL))
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(selected.is_none(), ALL_LABEL).clicked() {
                            next = apply_choice(&filters, field, None).or(next.take());
                        }
                        if state.loading && options.is_empty() {
                            ui.label(RichText::new("Cargando…").weak());
                        }
                        for option in &options {
                            if ui.selectable_label(selected == Some(option.as_str()), option).clicked() {
                                next = apply_choice(&filters, field, Some(option.clone())).or(next.take());
                            }
                        }
                    });
            });
            ui.add_space(4.0);
        }

        if state.loading {
            ruea_ui::loading_indicator(ui);
        }
        if state.error.is_some() {
            ui.label(
                RichText::new("No se pudieron cargar las facetas")
                    .small()
                    .color(theme::error_color()),
            )
            .on_hover_text(state.error.as_deref().unwrap_or_default());
        }

        if let Some(filters) = next {
            ctx.set_filters("Filtros", filters);
        }
    }
}
