//! Viewport - the filters panel beside the active page

use egui::Ui;
use serde_json::{Map, Value};

use crate::{FiltersPanel, SpaceView, ViewerContext};

/// Holds the pages and the filters panel they share
pub struct Viewport {
    space_views: Vec<Box<dyn SpaceView>>,
    filters: FiltersPanel,
    pub show_filters: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            space_views: Vec::new(),
            filters: FiltersPanel::new(),
            show_filters: true,
        }
    }

    pub fn add_space_view(&mut self, view: Box<dyn SpaceView>) {
        tracing::debug!(view = view.id(), "Page added");
        self.space_views.push(view);
    }

    pub fn titles(&self) -> Vec<String> {
        self.space_views.iter().map(|view| view.title().to_string()).collect()
    }

    pub fn space_view(&self, index: usize) -> Option<&dyn SpaceView> {
        self.space_views.get(index).map(|view| view.as_ref())
    }

    pub fn len(&self) -> usize {
        self.space_views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.space_views.is_empty()
    }

    /// Start the loads of the filters panel and the page at `active`
    pub fn refresh(&mut self, ctx: &ViewerContext, active: usize) {
        self.filters.refresh(ctx);
        if let Some(view) = self.space_views.get_mut(active) {
            view.refresh(ctx);
        }
    }

    /// Draw the filters panel and the page at `active`
    pub fn ui(&mut self, ui: &mut Ui, ctx: &ViewerContext, active: usize) {
        self.refresh(ctx, active);

        if self.show_filters {
            egui::SidePanel::left("filters_panel")
                .resizable(true)
                .default_width(240.0)
                .show_inside(ui, |ui| self.filters.ui(ctx, ui));
        }

        match self.space_views.get_mut(active) {
            Some(view) => {
                egui::ScrollArea::vertical()
                    .id_source(view.id())
                    .auto_shrink([false, false])
                    .show(ui, |ui| view.ui(ctx, ui));
            }
            None => {
                ruea_ui::empty_state(ui, "Sin páginas");
            }
        }
    }

    /// Settings of every page, keyed by page id
    pub fn save_layout(&self) -> Value {
        let mut layout = Map::new();
        for view in &self.space_views {
            let config = view.save_config();
            if !config.is_null() {
                layout.insert(view.id().to_string(), config);
            }
        }
        Value::Object(layout)
    }

    pub fn load_layout(&mut self, layout: &Value) {
        for view in &mut self.space_views {
            if let Some(config) = layout.get(view.id()) {
                view.load_config(config.clone());
            }
        }
    }
}
