//! Filter, sort and page request types

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::query::QueryParams;

/// Page-size ceiling enforced by the list endpoint
pub const MAX_PAGE_SIZE: usize = 1000;

/// Stable key used whenever rows must be paged without overlap
pub const STABLE_SORT_KEY: &str = "documento";

/// Categorical fields the dataset can be filtered and grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Corregimiento,
    Vereda,
    LineaProductiva,
    Escolaridad,
    Sexo,
}

impl FilterField {
    /// All fields, in display order
    pub const ALL: [FilterField; 5] = [
        FilterField::Corregimiento,
        FilterField::Vereda,
        FilterField::LineaProductiva,
        FilterField::Escolaridad,
        FilterField::Sexo,
    ];

    /// Wire name used in query parameters and record keys
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Corregimiento => "corregimiento",
            FilterField::Vereda => "vereda",
            FilterField::LineaProductiva => "linea_productiva",
            FilterField::Escolaridad => "escolaridad",
            FilterField::Sexo => "sexo",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Corregimiento => "Corregimiento",
            FilterField::Vereda => "Vereda",
            FilterField::LineaProductiva => "Línea productiva",
            FilterField::Escolaridad => "Escolaridad",
            FilterField::Sexo => "Sexo",
        }
    }

    /// Fields whose selection becomes meaningless when this field changes
    pub fn dependents(&self) -> &'static [FilterField] {
        match self {
            FilterField::Corregimiento => &[FilterField::Vereda],
            _ => &[],
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown filter field '{}'", s))
    }
}

/// Active categorical filters.
///
/// Blank values are never stored, so an absent field and a field set to an
/// empty or whitespace-only string are the same filter set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSet {
    values: BTreeMap<FilterField, String>,
}

impl FilterSet {
    /// Create an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Set or clear a single field without touching dependent fields
    pub fn set(&mut self, field: FilterField, value: Option<String>) {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => {
                self.values.insert(field, v.to_string());
            }
            _ => {
                self.values.remove(&field);
            }
        }
    }

    /// Apply a user selection.
    ///
    /// When the value of a parent field actually changes, its dependents
    /// (vereda for corregimiento) are cleared. Returns whether anything changed.
    pub fn select(&mut self, field: FilterField, value: Option<String>) -> bool {
        let before = self.clone();
        self.set(field, value);

        if self.get(field) != before.get(field) {
            for dependent in field.dependents() {
                self.values.remove(dependent);
            }
        }

        *self != before
    }

    /// Get the value of a field
    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Clear a single field
    pub fn clear(&mut self, field: FilterField) {
        self.values.remove(&field);
    }

    /// Clear every field
    pub fn clear_all(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate over the active filters in field order
    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Serialize the active filters as query parameters
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for (field, value) in self.iter() {
            params.insert(field.as_str(), value);
        }
        params
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Header indicator for an actively sorted column
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Sort specification for list requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: STABLE_SORT_KEY.to_string(),
            direction: SortDirection::Asc,
        }
    }
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Header click behaviour: the active column flips direction, any other
    /// column becomes the active one in ascending order
    pub fn toggle(&mut self, column: &str) {
        if self.field == column {
            self.direction = self.direction.toggled();
        } else {
            self.field = column.to_string();
            self.direction = SortDirection::Asc;
        }
    }

    /// Serialize as `order_by` / `order_dir` parameters
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with("order_by", &self.field)
            .with("order_dir", self.direction.as_str())
    }
}

/// A complete list request: filters, sort and window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    /// Create a request for the first page with the default sort
    pub fn new(filters: FilterSet) -> Self {
        Self {
            filters,
            sort: SortSpec::default(),
            limit: crate::pagination::DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }

    /// Set the sort specification
    pub fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Set the window; the limit is clamped to the server page-size ceiling
    pub fn window(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit.min(MAX_PAGE_SIZE);
        self.offset = offset;
        self
    }

    /// Serialize the whole request as query parameters
    pub fn to_params(&self) -> QueryParams {
        let mut params = self.filters.to_params();
        params.extend(&self.sort.to_params());
        params.insert("limit", self.limit);
        params.insert("offset", self.offset);
        params
    }
}
