//! # Table Model
//!
//! Cells and rows, plus the JSON document that describes a set of tables
//! to render. The JSON layer is a thin, serde-friendly mirror of
//! [`crate::layout::Table`]; [`TableSpec::to_table`] turns one into the other.

use crate::error::{ConfigError, TableError};
use crate::layout::{ColumnWidths, Regroup, Table};
use crate::style::{Align, Border, Color, FontFace};
use crate::surface::Edges;
use serde::{Deserialize, Serialize};

/// A single unit of table content: already formatted text and a colspan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CellRepr")]
pub struct Cell {
    pub text: String,
    /// Number of logical columns this cell occupies.
    pub colspan: usize,
}

/// Cells may be written as a bare string or as `{ "text": .., "colspan": .. }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Text(String),
    Full {
        text: String,
        #[serde(default = "one")]
        colspan: usize,
    },
}

fn one() -> usize {
    1
}

impl From<CellRepr> for Cell {
    fn from(repr: CellRepr) -> Self {
        match repr {
            CellRepr::Text(text) => Cell::new(text),
            CellRepr::Full { text, colspan } => Cell { text, colspan },
        }
    }
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: 1,
        }
    }

    pub fn spanning(text: impl Into<String>, colspan: usize) -> Self {
        Self {
            text: text.into(),
            colspan,
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::new(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::new(text)
    }
}

impl From<&String> for Cell {
    fn from(text: &String) -> Self {
        Cell::new(text.clone())
    }
}

/// An ordered sequence of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// Sum of the colspans of all cells, saturating at `usize::MAX`.
    pub fn column_count(&self) -> usize {
        self.cells
            .iter()
            .fold(0usize, |total, c| total.saturating_add(c.colspan))
    }

    /// Logical column of the first cell whose colspan pushes the column
    /// count past `usize::MAX`.
    pub fn colspan_overflow(&self) -> Option<usize> {
        let mut total = 0usize;
        for cell in &self.cells {
            match total.checked_add(cell.colspan) {
                Some(next) => total = next,
                None => return Some(total),
            }
        }
        None
    }

    /// Each cell with the logical column it starts at.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().scan(0usize, |col, cell| {
            let start = *col;
            *col = col.saturating_add(cell.colspan);
            Some((start, cell))
        })
    }
}

// ─── Document ───────────────────────────────────────────────────

/// A complete document: page setup plus the tables to lay out on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDocument {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// Length unit for page geometry and table dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pt,
    #[default]
    Mm,
    Cm,
    In,
}

impl Unit {
    /// Points per unit.
    pub fn scale(&self) -> f64 {
        match self {
            Unit::Pt => 1.0,
            Unit::Mm => 72.0 / 25.4,
            Unit::Cm => 72.0 / 2.54,
            Unit::In => 72.0,
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    /// Dimensions in points.
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Configuration for a page: size, orientation, units and margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub unit: Unit,
    /// Page margins, in `unit`.
    #[serde(default = "default_margin")]
    pub margin: Edges,
    /// Horizontal padding between a cell border and its text, in `unit`.
    #[serde(default = "default_cell_margin")]
    pub cell_margin: f64,
}

fn default_margin() -> Edges {
    Edges::uniform(10.0)
}

fn default_cell_margin() -> f64 {
    1.0
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            unit: Unit::Mm,
            margin: default_margin(),
            cell_margin: default_cell_margin(),
        }
    }
}

impl PageConfig {
    /// (width, height) in user units, orientation applied.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions();
        let k = self.unit.scale();
        match self.orientation {
            Orientation::Portrait => (w / k, h / k),
            Orientation::Landscape => (h / k, w / k),
        }
    }
}

/// One table of a [`TableDocument`]. Lengths are in the page unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    #[serde(default)]
    pub heading: Option<Row>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub col_widths: ColumnWidths,
    /// Total width. Defaults to the printable page width.
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub heading_line_height: Option<f64>,
    #[serde(default)]
    pub align: Vec<Align>,
    #[serde(default)]
    pub heading_align: Option<Align>,
    #[serde(default)]
    pub font: FontFace,
    #[serde(default)]
    pub heading_font: Option<FontFace>,
    #[serde(default)]
    pub fill_font: Option<FontFace>,
    #[serde(default = "default_true")]
    pub fill_alternate: bool,
    #[serde(default)]
    pub fill: bool,
    #[serde(default = "default_fill_color")]
    pub fill_color: Color,
    #[serde(default = "default_true")]
    pub heading_fill: bool,
    #[serde(default = "default_shade")]
    pub heading_fill_color: Color,
    #[serde(default)]
    pub border: Border,
    #[serde(default)]
    pub regroup: Option<RegroupSpec>,
    /// Vertical space left after the table.
    #[serde(default)]
    pub spacing: f64,
}

/// Group banners for a [`TableSpec`].
///
/// Keys come either from `groups` (one per data row) or from the text of
/// the cell at `groupColumn` (0-based cell index) in each data row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegroupSpec {
    #[serde(default)]
    pub groups: Option<Vec<String>>,
    #[serde(default)]
    pub group_column: Option<usize>,
    #[serde(default)]
    pub font: Option<FontFace>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub align: Option<Align>,
    #[serde(default = "default_true")]
    pub fill: bool,
    #[serde(default = "default_shade")]
    pub fill_color: Color,
    #[serde(default)]
    pub underline: bool,
    #[serde(default = "default_true")]
    pub repeat_on_break: bool,
}

fn default_line_height() -> f64 {
    5.0
}

fn default_true() -> bool {
    true
}

fn default_fill_color() -> Color {
    Color::STRIPE
}

fn default_shade() -> Color {
    Color::SHADE
}

impl TableSpec {
    /// Build an engine table. `printable_width` is used when no width is set.
    pub fn to_table(&self, printable_width: f64) -> Result<Table, TableError> {
        let mut table = Table::new(self.width.unwrap_or(printable_width));
        table.heading = self.heading.clone();
        table.rows = self.rows.clone();
        table.col_widths = self.col_widths.clone();
        table.line_height = self.line_height;
        table.heading_line_height = self.heading_line_height;
        table.align = self.align.clone();
        table.heading_align = self.heading_align;
        table.font = self.font.clone();
        table.heading_font = self
            .heading_font
            .clone()
            .unwrap_or_else(|| self.font.clone().bold());
        table.fill_font = self.fill_font.clone();
        table.fill_alternate = self.fill_alternate;
        table.fill = self.fill;
        table.fill_color = self.fill_color;
        table.heading_fill = self.heading_fill;
        table.heading_fill_color = self.heading_fill_color;
        table.border = self.border;

        if let Some(spec) = &self.regroup {
            let keys = spec.keys(&self.rows, self.heading.is_some())?;
            let mut regroup = Regroup::new(move |j| keys.get(j).cloned().unwrap_or_default());
            regroup.font = spec
                .font
                .clone()
                .unwrap_or_else(|| self.font.clone().bold());
            regroup.height = spec.height.unwrap_or(self.line_height);
            regroup.align = spec.align.unwrap_or(Align::Center);
            regroup.fill = spec.fill;
            regroup.fill_color = spec.fill_color;
            regroup.underline = spec.underline;
            regroup.repeat_on_break = spec.repeat_on_break;
            table.regroup = Some(regroup);
        }

        Ok(table)
    }
}

impl RegroupSpec {
    /// One group key per data row.
    fn keys(&self, rows: &[Row], has_heading: bool) -> Result<Vec<String>, ConfigError> {
        if let Some(groups) = &self.groups {
            if groups.len() != rows.len() {
                return Err(ConfigError::MissingGroups {
                    rows: rows.len(),
                    groups: groups.len(),
                });
            }
            return Ok(groups.clone());
        }

        let column = self.group_column.unwrap_or(0);
        let first_row = 1 + usize::from(has_heading);
        rows.iter()
            .enumerate()
            .map(|(j, row)| {
                row.cells
                    .get(column)
                    .map(|cell| cell.text.clone())
                    .ok_or(ConfigError::GroupColumnOutOfRange {
                        row: first_row + j,
                        column: column + 1,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_sums_colspans() {
        let row = Row::new(vec![Cell::new("a"), Cell::spanning("b", 3), Cell::new("c")]);
        assert_eq!(row.column_count(), 5);
        let starts: Vec<usize> = row.columns().map(|(c, _)| c).collect();
        assert_eq!(starts, vec![0, 1, 4]);
    }

    #[test]
    fn huge_colspans_do_not_overflow() {
        let row = Row::new(vec![Cell::spanning("a", usize::MAX), Cell::new("b")]);
        assert_eq!(row.column_count(), usize::MAX);
        assert_eq!(row.colspan_overflow(), Some(usize::MAX));
        let starts: Vec<usize> = row.columns().map(|(c, _)| c).collect();
        assert_eq!(starts, vec![0, usize::MAX]);
        assert_eq!(Row::new(["a", "b"]).colspan_overflow(), None);
    }

    #[test]
    fn strings_become_single_cells() {
        let row = Row::new(["Date", "Heure"]);
        assert_eq!(row.cells[1], Cell::new("Heure"));
        assert_eq!(row.cells[1].colspan, 1);
    }

    #[test]
    fn cells_deserialize_from_both_shapes() {
        let row: Row = serde_json::from_str(r#"["a", {"text": "b", "colspan": 2}, {"text": "c"}]"#).unwrap();
        assert_eq!(row.cells, vec![Cell::new("a"), Cell::spanning("b", 2), Cell::new("c")]);
    }

    #[test]
    fn page_config_defaults_to_a4_mm() {
        let config = PageConfig::default();
        let (w, h) = config.dimensions();
        assert!((w - 210.0).abs() < 0.01);
        assert!((h - 297.0).abs() < 0.01);

        let landscape = PageConfig {
            orientation: Orientation::Landscape,
            ..PageConfig::default()
        };
        let (w, _) = landscape.dimensions();
        assert!((w - 297.0).abs() < 0.01);
    }

    #[test]
    fn minimal_document_parses() {
        let doc: TableDocument = serde_json::from_str(
            r#"{ "tables": [ { "heading": ["Nom"], "rows": [["Marie"], ["Pierre"]] } ] }"#,
        )
        .unwrap();
        let spec = &doc.tables[0];
        assert_eq!(spec.rows.len(), 2);
        assert_eq!(spec.line_height, 5.0);
        assert!(spec.fill_alternate);
        assert_eq!(spec.col_widths, ColumnWidths::Even);
    }

    #[test]
    fn group_column_keys() {
        let spec: RegroupSpec = serde_json::from_str(r#"{ "groupColumn": 1 }"#).unwrap();
        let rows = vec![Row::new(["Marie", "CM1"]), Row::new(["Paul", "CM2"])];
        assert_eq!(spec.keys(&rows, true).unwrap(), vec!["CM1", "CM2"]);

        let short = vec![Row::new(["Marie", "CM1"]), Row::new(["Paul"])];
        assert_eq!(
            spec.keys(&short, true).unwrap_err(),
            ConfigError::GroupColumnOutOfRange { row: 3, column: 2 }
        );
    }

    #[test]
    fn explicit_groups_must_match_rows() {
        let spec: RegroupSpec = serde_json::from_str(r#"{ "groups": ["A"] }"#).unwrap();
        let rows = vec![Row::new(["x"]), Row::new(["y"])];
        assert_eq!(
            spec.keys(&rows, false).unwrap_err(),
            ConfigError::MissingGroups { rows: 2, groups: 1 }
        );
    }
}
