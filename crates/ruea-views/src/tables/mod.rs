//! Table view implementation

use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};
use serde_json::{Number, Value};

use ruea_core::{Record, SortSpec};

/// Columns shown first, in this order, when the rows carry them
pub const PREFERRED_COLUMNS: [&str; 7] = [
    "documento",
    "cedula",
    "corregimiento",
    "vereda",
    "linea_productiva",
    "escolaridad",
    "sexo",
];

/// Columns of a page: the preferred ones present in the first row, then the
/// remaining keys of the first row in their order. Without rows the preferred
/// list is used as is.
pub fn discover_columns(items: &[Record]) -> Vec<String> {
    let Some(first) = items.first() else {
        return PREFERRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    };

    let mut columns: Vec<String> = PREFERRED_COLUMNS
        .iter()
        .filter(|c| first.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    columns.extend(
        first
            .keys()
            .filter(|key| !PREFERRED_COLUMNS.contains(&key.as_str()))
            .cloned(),
    );
    columns
}

/// Display text of a cell
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "Sí".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Colombian number format: `.` groups thousands, `,` separates at most three
/// decimals
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return group_thousands(&i.unsigned_abs().to_string(), i < 0);
    }
    if let Some(u) = n.as_u64() {
        return group_thousands(&u.to_string(), false);
    }

    let f = n.as_f64().unwrap_or_default();
    let text = format!("{:.3}", f.abs());
    let text = text.trim_end_matches('0').trim_end_matches('.');
    let negative = f < 0.0 && text != "0";

    match text.split_once('.') {
        Some((int, frac)) => format!("{},{}", group_thousands(int, negative), frac),
        None => group_thousands(text, negative),
    }
}

fn group_thousands(digits: &str, negative: bool) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Configuration for table views
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub show_row_numbers: bool,
    pub resizable_columns: bool,
    pub striped_rows: bool,
    pub max_height: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: true,
            resizable_columns: true,
            striped_rows: true,
            max_height: 520.0,
        }
    }
}

/// Page of records with sortable headers
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub config: TableConfig,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `items`; returns the column whose header was clicked.
    ///
    /// `first_row` is the one-based number of the first row, shown in the
    /// row number column.
    pub fn show(&self, ui: &mut Ui, items: &[Record], sort: &SortSpec, first_row: usize) -> Option<String> {
        let columns = discover_columns(items);
        let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.6;
        let mut clicked = None;

        let mut builder = TableBuilder::new(ui)
            .striped(self.config.striped_rows)
            .resizable(self.config.resizable_columns)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .max_scroll_height(self.config.max_height)
            .min_scrolled_height(0.0)
            .vscroll(true);

        if self.config.show_row_numbers {
            builder = builder.column(Column::initial(48.0).at_least(36.0));
        }
        for _ in &columns {
            builder = builder.column(Column::initial(140.0).at_least(60.0).at_most(420.0).clip(true));
        }

        builder
            .header(24.0, |mut header| {
                if self.config.show_row_numbers {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                }
                for column in &columns {
                    header.col(|ui| {
                        let label = if sort.field == *column {
                            format!("{} {}", column, sort.direction.arrow())
                        } else {
                            column.clone()
                        };
                        let response = ui
                            .add(egui::Button::new(RichText::new(label).strong()).frame(false))
                            .on_hover_text(format!("Ordenar por {}", column));
                        if response.clicked() {
                            clicked = Some(column.clone());
                        }
                    });
                }
            })
            .body(|body| {
                body.rows(text_height, items.len(), |row_index, mut row| {
                    let record = &items[row_index];
                    if self.config.show_row_numbers {
                        row.col(|ui| {
                            ui.label(RichText::new((first_row + row_index).to_string()).weak());
                        });
                    }
                    for column in &columns {
                        row.col(|ui| {
                            let text = record.get(column).map(format_cell).unwrap_or_default();
                            ui.label(text);
                        });
                    }
                });
            });

        if let Some(column) = &clicked {
            tracing::debug!(column = %column, "Sort requested");
        }
        clicked
    }
}
