//! # Column Widths
//!
//! How a table's horizontal space is split between logical columns.

use serde::{Deserialize, Serialize};

/// Column width policy.
///
/// In JSON: `null` (or missing) is [`ColumnWidths::Even`], a number is
/// [`ColumnWidths::Uniform`], an array is [`ColumnWidths::Weights`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnWidths {
    /// Each row divides the table width evenly by its own column count.
    #[default]
    Even,
    /// Every logical column is exactly this wide. No scaling to the table width.
    Uniform(f64),
    /// Proportional weights, scaled so that all of them together fill the
    /// table width. An empty list behaves like `Even`.
    Weights(Vec<f64>),
}

impl ColumnWidths {
    /// Width of a cell starting at `col` and spanning `span` logical columns.
    ///
    /// `column_count` is the column count of the row the cell belongs to.
    /// Returns `None` when explicit weights don't reach `col + span`.
    pub fn resolve(&self, total_width: f64, column_count: usize, col: usize, span: usize) -> Option<f64> {
        match self {
            ColumnWidths::Weights(weights) if !weights.is_empty() => {
                let end = col.checked_add(span)?;
                if end > weights.len() {
                    return None;
                }
                let scale = total_width / weights.iter().sum::<f64>();
                Some(scale * weights[col..end].iter().sum::<f64>())
            }
            ColumnWidths::Uniform(w) => Some(w * span as f64),
            ColumnWidths::Even | ColumnWidths::Weights(_) => {
                if column_count == 0 {
                    return Some(0.0);
                }
                Some(total_width / column_count as f64 * span as f64)
            }
        }
    }

    /// Number of columns covered by explicit weights, if any.
    pub fn covered_columns(&self) -> Option<usize> {
        match self {
            ColumnWidths::Weights(weights) if !weights.is_empty() => Some(weights.len()),
            _ => None,
        }
    }

    /// Weights must be finite, non-negative and not all zero; a uniform
    /// width must be positive.
    pub fn is_valid(&self) -> bool {
        match self {
            ColumnWidths::Even => true,
            ColumnWidths::Uniform(w) => w.is_finite() && *w > 0.0,
            ColumnWidths::Weights(weights) => {
                weights.is_empty()
                    || (weights.iter().all(|w| w.is_finite() && *w >= 0.0)
                        && weights.iter().sum::<f64>() > 0.0)
            }
        }
    }
}

impl From<Vec<f64>> for ColumnWidths {
    fn from(weights: Vec<f64>) -> Self {
        if weights.is_empty() {
            ColumnWidths::Even
        } else {
            ColumnWidths::Weights(weights)
        }
    }
}

impl From<f64> for ColumnWidths {
    fn from(width: f64) -> Self {
        ColumnWidths::Uniform(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_scale_to_total() {
        let cw = ColumnWidths::from(vec![40.0, 30.0, 60.0, 60.0]);
        assert_eq!(cw.resolve(190.0, 4, 0, 1), Some(40.0));
        assert_eq!(cw.resolve(190.0, 4, 1, 1), Some(30.0));
        assert_eq!(cw.resolve(190.0, 4, 2, 2), Some(120.0));

        let widths: Vec<f64> = (0..4).filter_map(|c| cw.resolve(95.0, 4, c, 1)).collect();
        assert_eq!(widths, vec![20.0, 15.0, 30.0, 30.0]);
    }

    #[test]
    fn weights_out_of_range() {
        let cw = ColumnWidths::from(vec![1.0, 1.0]);
        assert_eq!(cw.resolve(100.0, 3, 1, 2), None);
        assert_eq!(cw.resolve(100.0, 3, 2, 1), None);
        assert_eq!(cw.resolve(100.0, 2, 0, usize::MAX), None);
    }

    #[test]
    fn uniform_ignores_total() {
        let cw = ColumnWidths::Uniform(25.0);
        assert_eq!(cw.resolve(190.0, 4, 0, 1), Some(25.0));
        assert_eq!(cw.resolve(190.0, 4, 1, 3), Some(75.0));
    }

    #[test]
    fn even_uses_row_column_count() {
        let cw = ColumnWidths::Even;
        assert_eq!(cw.resolve(120.0, 4, 0, 1), Some(30.0));
        assert_eq!(cw.resolve(120.0, 3, 0, 1), Some(40.0));
        assert_eq!(cw.resolve(120.0, 3, 1, 2), Some(80.0));
        assert_eq!(ColumnWidths::from(Vec::new()), ColumnWidths::Even);
    }

    #[test]
    fn validity() {
        assert!(ColumnWidths::Even.is_valid());
        assert!(!ColumnWidths::Uniform(0.0).is_valid());
        assert!(!ColumnWidths::Weights(vec![0.0, 0.0]).is_valid());
        assert!(!ColumnWidths::Weights(vec![1.0, -1.0]).is_valid());
        assert!(!ColumnWidths::Weights(vec![1.0, f64::NAN]).is_valid());
        assert!(ColumnWidths::Weights(vec![0.0, 2.0]).is_valid());
    }

    #[test]
    fn deserializes_all_shapes() {
        let even: ColumnWidths = serde_json::from_str("null").unwrap();
        let uniform: ColumnWidths = serde_json::from_str("12.5").unwrap();
        let weights: ColumnWidths = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(even, ColumnWidths::Even);
        assert_eq!(uniform, ColumnWidths::Uniform(12.5));
        assert_eq!(weights, ColumnWidths::Weights(vec![1.0, 2.0, 3.0]));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_spans_partition_width(
                weights in prop::collection::vec(0.5f64..100.0, 1..12),
                width in 10.0f64..1000.0,
                cut in any::<prop::sample::Index>(),
            ) {
                let cw = ColumnWidths::from(weights.clone());
                let n = weights.len();
                // Two cells: [0, k) and [k, n).
                let k = cut.index(n + 1);
                let mut total = 0.0;
                if k > 0 {
                    total += cw.resolve(width, n, 0, k).unwrap();
                }
                if k < n {
                    total += cw.resolve(width, n, k, n - k).unwrap();
                }
                prop_assert!((total - width).abs() < 1e-6 * width.max(1.0));
            }

            #[test]
            fn prop_resolution_is_idempotent(
                weights in prop::collection::vec(0.5f64..100.0, 1..12),
                width in 10.0f64..1000.0,
                col in 0usize..12,
                span in 1usize..4,
            ) {
                let cw = ColumnWidths::from(weights);
                prop_assert_eq!(cw.resolve(width, 12, col, span), cw.resolve(width, 12, col, span));
            }
        }
    }
}
