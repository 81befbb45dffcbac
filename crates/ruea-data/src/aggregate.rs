//! Client-side grouped counts

use indexmap::IndexMap;
use ruea_core::record::raw_text;
use ruea_core::{Record, StatSeries};

use crate::normalize::Normalizer;

/// Count rows per normalized value of `key`.
///
/// Rows whose value normalizes to an empty string are skipped. The result is
/// sorted by descending count; equal counts keep the order in which their key
/// was first seen.
pub fn count_by_norm(rows: &[Record], key: &str, normalizer: Normalizer) -> StatSeries {
    let mut counts: IndexMap<String, u64> = IndexMap::new();

    for row in rows {
        let name = normalizer.apply(&raw_text(row, key));
        if name.is_empty() {
            continue;
        }
        *counts.entry(name).or_insert(0) += 1;
    }

    StatSeries::from_counts(counts)
}
