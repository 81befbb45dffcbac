//! Charts of grouped counts

pub mod bar;
pub mod line;

pub use bar::{BarChartConfig, BarChartView};
pub use line::{LinePlotConfig, LinePlotView};

use ruea_core::StatSeries;

/// Legend text for a series: `name (value)` per item, at most `limit`
/// entries, followed by `…` when items were left out
pub fn legend_labels(series: &StatSeries, limit: Option<usize>) -> Vec<String> {
    let shown = limit.unwrap_or(series.len()).min(series.len());
    let mut labels: Vec<String> = series
        .iter()
        .take(shown)
        .map(|item| format!("{} ({})", item.name, item.value))
        .collect();
    if shown < series.len() {
        labels.push("…".to_string());
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruea_core::StatItem;

    fn series(n: usize) -> StatSeries {
        StatSeries::new((0..n).map(|i| StatItem::new(format!("v{}", i), i as u64 + 1)).collect())
    }

    #[test]
    fn test_legend_is_cut_with_ellipsis() {
        let labels = legend_labels(&series(17), Some(15));
        assert_eq!(labels.len(), 16);
        assert_eq!(labels[0], "v0 (1)");
        assert_eq!(labels[14], "v14 (15)");
        assert_eq!(labels[15], "…");
    }

    #[test]
    fn test_short_legend_has_no_ellipsis() {
        assert_eq!(legend_labels(&series(2), Some(15)), vec!["v0 (1)", "v1 (2)"]);
        assert_eq!(legend_labels(&series(3), None).len(), 3);
        assert!(legend_labels(&StatSeries::default(), Some(15)).is_empty());
    }
}
