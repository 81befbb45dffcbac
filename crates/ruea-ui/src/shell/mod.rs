use egui::{CentralPanel, Context, RichText, TopBottomPanel, Ui};

use crate::theme::{self, Theme};
use crate::{StatusFeed, StatusKind};

/// Which bars the shell draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellConfig {
    pub show_menu_bar: bool,
    pub show_status_bar: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            show_menu_bar: true,
            show_status_bar: true,
        }
    }
}

/// Window frame around the dashboard pages: menu bar with one tab per page,
/// a status bar with the latest status line, and the central area
pub struct AppShell {
    pub config: ShellConfig,
    pub theme: Theme,
    tabs: Vec<String>,
    active: usize,
    theme_dirty: bool,
}

impl AppShell {
    pub fn new(tabs: Vec<String>, theme: Theme) -> Self {
        Self {
            config: ShellConfig::default(),
            theme,
            tabs,
            active: 0,
            theme_dirty: true,
        }
    }

    pub fn active_tab(&self) -> usize {
        self.active
    }

    /// Switch pages; out of range indices are ignored
    pub fn select_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.active = index;
        }
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    /// Draw the shell; `page` draws the active page into the central area
    pub fn show(&mut self, ctx: &Context, status: &StatusFeed, source: &str, page: impl FnOnce(&mut Ui, usize)) {
        if self.theme_dirty {
            theme::apply_theme(ctx, &self.theme);
            self.theme_dirty = false;
        }

        if self.config.show_menu_bar {
            self.menu_bar(ctx);
        }
        if self.config.show_status_bar {
            status_bar(ctx, status, source);
        }

        let active = self.active;
        CentralPanel::default().show(ctx, |ui| page(ui, active));
    }

    fn menu_bar(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Archivo", |ui| {
                    if ui.button("Salir").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Ver", |ui| {
                    if ui.checkbox(&mut self.theme.dark_mode, "Modo oscuro").clicked() {
                        self.theme_dirty = true;
                        ui.close_menu();
                    }
                    ui.checkbox(&mut self.config.show_status_bar, "Barra de estado");
                });

                ui.separator();

                for (index, tab) in self.tabs.iter().enumerate() {
                    let label = RichText::new(tab).strong();
                    if ui.selectable_label(self.active == index, label).clicked() && self.active != index {
                        tracing::debug!(page = %tab, "Page selected");
                        self.active = index;
                    }
                }
            });
        });
    }
}

/// Bottom bar: latest status line on the left, data source on the right
pub fn status_bar(ctx: &Context, status: &StatusFeed, source: &str) {
    TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            match status.latest() {
                Some(line) => {
                    let color = match line.kind {
                        StatusKind::Info => ui.visuals().weak_text_color(),
                        StatusKind::Warning => theme::warning_color(),
                        StatusKind::Error => theme::error_color(),
                    };
                    ui.label(RichText::new(line.timestamp.format("%H:%M:%S").to_string()).small().weak());
                    ui.label(RichText::new(&line.text).small().color(color))
                        .on_hover_ui(|ui| {
                            for older in status.recent().iter().take(10) {
                                ui.label(format!("{}  {}", older.timestamp.format("%H:%M:%S"), older.text));
                            }
                        });
                }
                None => {
                    ui.label(RichText::new("Listo").small().weak());
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(format!("Fuente: {}", source)).small().weak());
            });
        });
    });
}
