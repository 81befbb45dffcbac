//! Stat series: ordered (category, count) pairs driving charts and tables

use serde::{Deserialize, Serialize};

use crate::collation::spanish_cmp;

/// A single category count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatItem {
    pub name: String,
    pub value: u64,
}

impl StatItem {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Final ordering a consumer wants for a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeriesOrder {
    /// Descending count, ties in first-seen order
    #[default]
    ByCount,
    /// Alphabetical by name using Spanish collation
    ByName,
}

/// Ordered sequence of stat items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatSeries {
    items: Vec<StatItem>,
}

impl StatSeries {
    pub fn new(items: Vec<StatItem>) -> Self {
        Self { items }
    }

    /// Build a series from counts in first-occurrence order, sorted by
    /// descending count. The sort is stable, so equal counts keep the order in
    /// which their keys were first seen.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut series = Self::new(
            counts
                .into_iter()
                .map(|(name, value)| StatItem { name, value })
                .collect(),
        );
        series.sort_by_count();
        series
    }

    /// Stable sort by descending count
    pub fn sort_by_count(&mut self) {
        self.items.sort_by(|a, b| b.value.cmp(&a.value));
    }

    /// Stable sort by name using Spanish collation
    pub fn sort_by_name(&mut self) {
        self.items.sort_by(|a, b| spanish_cmp(&a.name, &b.name));
    }

    /// Apply the requested final view: optional top-K then ordering.
    ///
    /// Top-K is always taken from the count order, so a name-ordered view of
    /// the top entries shows the biggest categories, not the first names.
    pub fn into_view(mut self, top: Option<usize>, order: SeriesOrder) -> Self {
        if let Some(top) = top {
            self.sort_by_count();
            self.items.truncate(top);
        }
        if order == SeriesOrder::ByName {
            self.sort_by_name();
        }
        self
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn items(&self) -> &[StatItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<StatItem> {
        self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.items.iter().map(|item| item.value).sum()
    }

    /// Largest count, used to scale charts
    pub fn max_value(&self) -> u64 {
        self.items.iter().map(|item| item.value).max().unwrap_or(0)
    }
}

impl FromIterator<StatItem> for StatSeries {
    fn from_iter<T: IntoIterator<Item = StatItem>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(&str, u64)]) -> StatSeries {
        pairs.iter().map(|(n, v)| StatItem::new(*n, *v)).collect()
    }

    #[test]
    fn test_from_counts_is_stable() {
        let counts = vec![
            ("b".to_string(), 1),
            ("a".to_string(), 3),
            ("c".to_string(), 1),
        ];
        let counted = StatSeries::from_counts(counts);
        assert_eq!(counted, series(&[("a", 3), ("b", 1), ("c", 1)]));
    }

    #[test]
    fn test_top_then_name_order() {
        let base = series(&[("zeta", 9), ("alfa", 1), ("ñandú", 5), ("beta", 7)]);

        let top = base.clone().into_view(Some(2), SeriesOrder::ByCount);
        assert_eq!(top, series(&[("zeta", 9), ("beta", 7)]));

        let named = base.clone().into_view(Some(3), SeriesOrder::ByName);
        assert_eq!(named, series(&[("beta", 7), ("ñandú", 5), ("zeta", 9)]));

        let all = base.into_view(None, SeriesOrder::ByName);
        assert_eq!(all.items()[0].name, "alfa");
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_totals() {
        let s = series(&[("a", 2), ("b", 5)]);
        assert_eq!(s.total(), 7);
        assert_eq!(s.max_value(), 5);
        assert_eq!(StatSeries::default().max_value(), 0);
    }
}
