//! Distinct values available for each categorical filter

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filters::FilterField;

/// Facet values per categorical field, each list ordered and unique
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSet {
    values: BTreeMap<FilterField, Vec<String>>,
}

impl FacetSet {
    /// A facet set with an empty list for every field
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the values of one field
    pub fn set(&mut self, field: FilterField, values: Vec<String>) {
        self.values.insert(field, values);
    }

    /// Builder-style setter
    pub fn with(mut self, field: FilterField, values: Vec<String>) -> Self {
        self.set(field, values);
        self
    }

    /// Values of a field; fields never set are empty
    pub fn get(&self, field: FilterField) -> &[String] {
        self.values.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when every field's list is empty
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }

    /// Total number of values across fields
    pub fn value_count(&self) -> usize {
        self.values.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_when_all_lists_empty() {
        let mut facets = FacetSet::empty();
        assert!(facets.is_empty());

        facets.set(FilterField::Sexo, Vec::new());
        assert!(facets.is_empty());

        facets.set(FilterField::Vereda, vec!["el plan".into()]);
        assert!(!facets.is_empty());
        assert_eq!(facets.get(FilterField::Vereda), ["el plan".to_string()]);
        assert!(facets.get(FilterField::Corregimiento).is_empty());
        assert_eq!(facets.value_count(), 1);
    }
}
