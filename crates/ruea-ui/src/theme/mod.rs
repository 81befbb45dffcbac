use egui::{Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Colors assigned to chart series, in order
pub const SERIES_COLORS: [Color32; 9] = [
    Color32::from_rgb(0x00, 0x57, 0xB8),
    Color32::from_rgb(0x0B, 0xB3, 0xB3),
    Color32::from_rgb(0xFF, 0x7A, 0x00),
    Color32::from_rgb(0x6E, 0x7B, 0xF2),
    Color32::from_rgb(0x8A, 0xC9, 0x26),
    Color32::from_rgb(0xFF, 0x59, 0x5E),
    Color32::from_rgb(0x19, 0x82, 0xC4),
    Color32::from_rgb(0x6A, 0x4C, 0x93),
    Color32::from_rgb(0xFF, 0xD1, 0x66),
];

/// Color of the `index`-th series; the palette repeats
pub fn series_color(index: usize) -> Color32 {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Theme configuration, persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub dark_mode: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "RUEA".to_string(),
            dark_mode: false,
        }
    }
}

/// Apply the dashboard theme
pub fn apply_theme(ctx: &Context, theme: &Theme) {
    let mut style = Style::default();
    let mut visuals = if theme.dark_mode { Visuals::dark() } else { Visuals::light() };

    let accent = accent_color();
    let (panel_bg, widget_bg, hover, border, text) = if theme.dark_mode {
        (
            Color32::from_rgb(31, 31, 31),
            Color32::from_rgb(40, 40, 40),
            Color32::from_rgb(52, 52, 52),
            Color32::from_rgb(70, 70, 70),
            Color32::from_rgb(220, 220, 220),
        )
    } else {
        (
            Color32::from_rgb(246, 248, 251),
            Color32::WHITE,
            Color32::from_rgb(232, 239, 248),
            Color32::from_rgb(210, 216, 224),
            Color32::from_rgb(33, 37, 41),
        )
    };

    visuals.window_fill = panel_bg;
    visuals.panel_fill = panel_bg;
    visuals.faint_bg_color = if theme.dark_mode {
        Color32::from_rgb(36, 36, 36)
    } else {
        Color32::from_rgb(240, 244, 250)
    };

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
    ] {
        widget.bg_fill = widget_bg;
        widget.weak_bg_fill = widget_bg;
        widget.bg_stroke = Stroke::new(1.0, border);
        widget.fg_stroke = Stroke::new(1.0, text);
        widget.rounding = Rounding::same(6.0);
    }
    visuals.widgets.hovered.bg_fill = hover;
    visuals.widgets.hovered.weak_bg_fill = hover;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, accent);

    visuals.widgets.active.bg_stroke = Stroke::new(1.0, accent);
    visuals.widgets.active.rounding = Rounding::same(6.0);

    visuals.selection.bg_fill = accent.linear_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, accent);
    visuals.hyperlink_color = accent;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 4.0);
    style.spacing.menu_margin = egui::Margin::same(8.0);

    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(11.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(20.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace));
    style.text_styles = font_sizes;

    style.visuals = visuals;
    ctx.set_style(style);

    tracing::debug!(theme = %theme.name, dark = theme.dark_mode, "Theme applied");
}

pub fn accent_color() -> Color32 {
    SERIES_COLORS[0]
}

pub fn error_color() -> Color32 {
    Color32::from_rgb(0xD6, 0x33, 0x39)
}

pub fn warning_color() -> Color32 {
    Color32::from_rgb(0xE0, 0x8E, 0x0B)
}

pub fn success_color() -> Color32 {
    Color32::from_rgb(0x2E, 0x9E, 0x5B)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_colors_repeat() {
        assert_eq!(series_color(0), Color32::from_rgb(0, 87, 184));
        assert_eq!(series_color(9), series_color(0));
        assert_eq!(series_color(11), SERIES_COLORS[2]);
    }

    #[test]
    fn test_theme_defaults_to_light() {
        let theme = Theme::default();
        assert!(!theme.dark_mode);
        assert_eq!(theme.name, "RUEA");
    }
}
