//! Small widgets shared by the dashboard pages
//!
//! Also home of `WidgetId`, which keeps the ids of widgets created in loops
//! (one combo box per filter, one chart per grouping) from colliding.

use egui::{Color32, Id, RichText, Ui};
use std::fmt::Display;

use crate::theme;

/// Widget ID builder that joins several components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetId {
    components: Vec<String>,
}

impl WidgetId {
    pub fn new(base: impl Display) -> Self {
        Self {
            components: vec![base.to_string()],
        }
    }

    pub fn with(mut self, component: impl Display) -> Self {
        self.components.push(component.to_string());
        self
    }

    pub fn build(&self) -> String {
        self.components.join("_")
    }

    pub fn id(&self) -> Id {
        Id::new(self.build())
    }
}

/// Framed error message
pub fn error_banner(ui: &mut Ui, message: &str) {
    egui::Frame::none()
        .fill(theme::error_color().linear_multiply(0.15))
        .stroke(egui::Stroke::new(1.0, theme::error_color()))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new(crate::icons::WARNING).color(theme::error_color()));
                ui.label(message);
            });
        });
}

/// Weak note that the figures shown were computed client-side
pub fn fallback_note(ui: &mut Ui, reason: &str) {
    ui.label(
        RichText::new(format!("{} Calculado localmente", crate::icons::INFO))
            .small()
            .color(theme::warning_color()),
    )
    .on_hover_text(reason);
}

/// Headline figure with a caption
pub fn kpi_card(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style())
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(16.0, 10.0))
        .show(ui, |ui| {
            ui.set_min_width(140.0);
            ui.vertical(|ui| {
                ui.label(RichText::new(label).small().weak());
                ui.label(RichText::new(value).heading().strong());
            });
        });
}

pub fn loading_indicator(ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label("Cargando…");
    });
}

/// Placeholder shown where there is nothing to display
pub fn empty_state(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(RichText::new(text).weak());
    });
}

/// Colored square followed by a label, as used in chart legends
pub fn legend_entry(ui: &mut Ui, color: Color32, text: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 2.0, color);
        ui.label(RichText::new(text).small());
    });
}
