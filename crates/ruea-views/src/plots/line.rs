//! Line plot implementation

use egui::{RichText, Ui};
use egui_plot::{Line, Plot, PlotPoints, Points};

use ruea_core::StatSeries;
use ruea_ui::{theme, WidgetId};

use super::legend_labels;

/// Configuration for line plot view
#[derive(Debug, Clone)]
pub struct LinePlotConfig {
    pub line_width: f32,

    /// Whether to mark every item with a point
    pub show_points: bool,

    pub point_radius: f32,

    /// Legend entries before the list is cut
    pub legend_limit: Option<usize>,

    pub show_grid: bool,

    pub height: f32,
}

impl Default for LinePlotConfig {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            show_points: true,
            point_radius: 3.0,
            legend_limit: Some(15),
            show_grid: true,
            height: 260.0,
        }
    }
}

/// Items of a series joined in order
pub struct LinePlotView {
    id: String,
    title: String,
    pub config: LinePlotConfig,
}

impl LinePlotView {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            config: LinePlotConfig::default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn show(&self, ui: &mut Ui, series: &StatSeries) {
        ui.label(RichText::new(&self.title).strong());

        if series.is_empty() {
            ui.allocate_ui(egui::vec2(ui.available_width(), self.config.height), |ui| {
                ruea_ui::empty_state(ui, "Sin datos");
            });
            return;
        }

        let points: Vec<[f64; 2]> = series
            .iter()
            .enumerate()
            .map(|(i, item)| [i as f64, item.value as f64])
            .collect();
        let color = theme::accent_color();

        Plot::new(WidgetId::new("line").with(&self.id).id())
            .height(self.config.height)
            .show_grid(self.config.show_grid)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::new(points.clone()))
                        .color(color)
                        .width(self.config.line_width)
                        .name(&self.title),
                );
                if self.config.show_points {
                    plot_ui.points(Points::new(points).color(color).radius(self.config.point_radius));
                }

                // name of the item nearest to the pointer
                if let Some(pointer) = plot_ui.pointer_coordinate() {
                    let index = pointer.x.round();
                    if index >= 0.0 {
                        if let Some(item) = series.items().get(index as usize) {
                            plot_ui.points(
                                Points::new(vec![[index, item.value as f64]])
                                    .color(color)
                                    .radius(self.config.point_radius * 2.0)
                                    .name(format!("{} ({})", item.name, item.value)),
                            );
                        }
                    }
                }
            });

        ui.horizontal_wrapped(|ui| {
            for label in legend_labels(series, self.config.legend_limit) {
                ui.label(RichText::new(label).small().weak());
                ui.separator();
            }
        });
    }
}
