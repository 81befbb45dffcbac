//! Bar chart implementation

use egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use ruea_core::StatSeries;
use ruea_ui::{series_color, WidgetId};

use super::legend_labels;

/// Bar chart configuration
#[derive(Debug, Clone)]
pub struct BarChartConfig {
    /// Whether to show legend
    pub show_legend: bool,

    /// Legend entries before the list is cut
    pub legend_limit: Option<usize>,

    /// Whether to show grid
    pub show_grid: bool,

    /// Bar width factor (0.0 to 1.0)
    pub bar_width: f32,

    pub height: f32,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            legend_limit: None,
            show_grid: true,
            bar_width: 0.7,
            height: 260.0,
        }
    }
}

/// One bar per item of a series, each in its palette color
pub struct BarChartView {
    id: String,
    title: String,
    pub config: BarChartConfig,
}

impl BarChartView {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            config: BarChartConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BarChartConfig) -> Self {
        self.config = config;
        self
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

        let bars: Vec<Bar> = series
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Bar::new(i as f64, item.value as f64)
                    .width(self.config.bar_width as f64)
                    .name(&item.name)
                    .fill(series_color(i))
            })
            .collect();

        Plot::new(WidgetId::new("bar").with(&self.id).id())
            .height(self.config.height)
            .show_grid(self.config.show_grid)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(&self.title));
            });

        if self.config.show_legend {
            ui.horizontal_wrapped(|ui| {
                for (i, label) in legend_labels(series, self.config.legend_limit).iter().enumerate() {
                    ruea_ui::legend_entry(ui, series_color(i), label);
                }
            });
        }
    }
}
