//! Opaque dataset records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row: field name to scalar value. The schema is not fixed; columns
/// are discovered from the rows themselves.
pub type Record = serde_json::Map<String, Value>;

/// One page of a list response in canonical form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    /// Total number of matching rows as reported by the server
    pub total_count: usize,
    pub items: Vec<Record>,
}

impl RecordPage {
    pub fn new(total_count: usize, items: Vec<Record>) -> Self {
        Self { total_count, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Textual value of a field, trimmed.
///
/// Null, missing, and non-scalar values yield `None`, as do values that are
/// empty after trimming.
pub fn field_text(record: &Record, key: &str) -> Option<String> {
    let text = match record.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    (!text.is_empty()).then_some(text)
}

/// Raw textual value of a field for normalization; missing and null become `""`
pub fn raw_text(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
