//! Summary statistics view implementation

use egui::{RichText, Ui};

use ruea_core::StatSeries;
use ruea_data::Summary;
use ruea_ui::WidgetId;

use crate::tables::format_number;

/// Total and the leading places of the filtered rows
#[derive(Debug, Clone, Default)]
pub struct SummaryStatsView {
    pub show_rankings: bool,
}

impl SummaryStatsView {
    pub fn new() -> Self {
        Self { show_rankings: true }
    }

    pub fn ui(&self, ui: &mut Ui, summary: &Summary) {
        if !self.show_rankings {
            return;
        }

        ui.columns(2, |columns| {
            ranking(&mut columns[0], "Top corregimientos", &summary.top_corregimiento);
            ranking(&mut columns[1], "Top veredas", &summary.top_vereda);
        });
    }
}

/// Share of `value` within `total`, for the ranking bars
pub fn share(value: u64, total: u64) -> f32 {
    if total == 0 {
        0.0
    } else {
        (value as f64 / total as f64) as f32
    }
}

fn ranking(ui: &mut Ui, title: &str, series: &StatSeries) {
    ui.label(RichText::new(title).strong());

    if series.is_empty() {
        ui.label(RichText::new("Sin datos").weak());
        return;
    }

    let max = series.max_value();
    egui::Grid::new(WidgetId::new("ranking").with(title).id())
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for item in series.iter() {
                ui.label(&item.name);
                ui.add(
                    egui::ProgressBar::new(share(item.value, max))
                        .desired_width(160.0)
                        .text(format_number(&item.value.into())),
                );
                ui.end_row();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share() {
        assert_eq!(share(5, 10), 0.5);
        assert_eq!(share(10, 10), 1.0);
        assert_eq!(share(3, 0), 0.0);
    }
}
