//! # Row Height
//!
//! A row is as tall as its wordiest cell needs. Every cell gets the same
//! height, so a cell with fewer lines spreads them out: its per-line height
//! is the row height divided by its own line count.

/// Measured geometry for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    /// Starting logical column of the cell.
    pub column: usize,
    pub lines: Vec<String>,
    /// Height of each line of this cell.
    pub line_height: f64,
}

impl CellMetrics {
    pub fn line_count(&self) -> usize {
        self.lines.len().max(1)
    }
}

/// Measured geometry for a whole row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMetrics {
    pub height: f64,
    pub cells: Vec<CellMetrics>,
}

/// Row height for cells needing `line_counts` lines each.
///
/// An empty row (or a row of empty cells) is one line tall.
pub fn row_height(base_line_height: f64, line_counts: &[usize]) -> f64 {
    let max_lines = line_counts.iter().copied().max().unwrap_or(1).max(1);
    base_line_height * max_lines as f64
}

/// Per-line height of each cell once the row height is fixed.
pub fn per_line_heights(row_height: f64, line_counts: &[usize]) -> Vec<f64> {
    line_counts
        .iter()
        .map(|&n| row_height / n.max(1) as f64)
        .collect()
}

/// Combine measured cell widths and wrapped lines into row metrics.
pub fn equalize(base_line_height: f64, cells: Vec<(usize, f64, Vec<String>)>) -> RowMetrics {
    let counts: Vec<usize> = cells.iter().map(|(_, _, lines)| lines.len().max(1)).collect();
    let height = row_height(base_line_height, &counts);
    let per_line = per_line_heights(height, &counts);

    let cells = cells
        .into_iter()
        .zip(per_line)
        .map(|((column, width, mut lines), line_height)| {
            if lines.is_empty() {
                lines.push(String::new());
            }
            CellMetrics {
                width,
                column,
                lines,
                line_height,
            }
        })
        .collect();

    RowMetrics { height, cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {}", i)).collect()
    }

    #[test]
    fn tallest_cell_sets_height() {
        assert_eq!(row_height(5.0, &[1, 3, 2]), 15.0);
        assert_eq!(row_height(5.0, &[]), 5.0);
        assert_eq!(row_height(5.0, &[0, 0]), 5.0);
    }

    #[test]
    fn lines_spread_over_the_row() {
        assert_eq!(per_line_heights(15.0, &[1, 3, 2]), vec![15.0, 5.0, 7.5]);
    }

    #[test]
    fn equalize_fills_every_cell() {
        let row = equalize(
            4.0,
            vec![(0, 30.0, lines(1)), (1, 20.0, lines(4)), (2, 10.0, vec![])],
        );
        assert_eq!(row.height, 16.0);
        let widths: Vec<f64> = row.cells.iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![30.0, 20.0, 10.0]);
        for cell in &row.cells {
            assert!((cell.line_height * cell.line_count() as f64 - row.height).abs() < 1e-9);
        }
        assert_eq!(row.cells[2].lines, vec![String::new()]);
        assert_eq!(row.cells[1].column, 1);
    }
}
