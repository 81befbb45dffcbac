//! User interface components for the RUEA dashboard
//!
//! This crate provides the theme, the application shell (menu bar with page
//! tabs and a status bar) and the small widgets the pages share.

pub mod shell;
pub mod theme;
pub mod widgets;

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

pub use shell::{AppShell, ShellConfig};
pub use theme::{apply_theme, series_color, Theme, SERIES_COLORS};
pub use widgets::{
    empty_state, error_banner, fallback_note, kpi_card, legend_entry, loading_indicator, WidgetId,
};

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

/// One line of the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

/// Recent status lines, written from any thread and read by the shell
#[derive(Clone)]
pub struct StatusFeed {
    lines: Arc<Mutex<VecDeque<StatusLine>>>,
    capacity: usize,
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new(50)
    }
}

impl StatusFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, kind: StatusKind, text: impl Into<String>) {
        let mut lines = self.lines.lock();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(StatusLine {
            kind,
            text: text.into(),
            timestamp: Local::now(),
        });
    }

    pub fn latest(&self) -> Option<StatusLine> {
        self.lines.lock().back().cloned()
    }

    /// Lines from newest to oldest
    pub fn recent(&self) -> Vec<StatusLine> {
        self.lines.lock().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

pub fn icon_button(ui: &mut egui::Ui, icon: &str, text: &str, tooltip: &str) -> egui::Response {
    ui.add(egui::Button::new(format!("{} {}", icon, text)))
        .on_hover_text(tooltip)
}

pub mod icons {
    pub const TABLE: &str = "📋";
    pub const CHART: &str = "📊";
    pub const DOWNLOAD: &str = "⬇";
    pub const SAVE: &str = "💾";
    pub const CLEAR: &str = "✖";
    pub const REFRESH: &str = "🔄";
    pub const WARNING: &str = "⚠";
    pub const INFO: &str = "ℹ";
}
