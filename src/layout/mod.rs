//! # Table Layout Engine
//!
//! Flows table rows into pages. The page boundary is checked before every
//! row, never after the fact:
//!
//! 1. on a group change, a full-width banner is inserted before the row,
//!    and the banner and the row are checked together so the banner is
//!    never stranded at the bottom of a page;
//! 2. if the row (or banner + row) would cross the bottom margin, a new page
//!    is opened and the heading is repeated, followed by the active banner
//!    when the break falls in the middle of a group;
//! 3. every cell is wrapped on the surface, and the row takes the height of
//!    its wordiest cell;
//! 4. cells are drawn left to right as bordered, filled text blocks.
//!
//! The whole table is validated before the first draw call.

pub mod height;
pub mod page_break;
pub mod width;

pub use height::{CellMetrics, RowMetrics};
pub use page_break::BreakDecision;
pub use width::ColumnWidths;

use std::fmt;

use tracing::{debug, debug_span, trace};

use crate::error::{ConfigError, TableError};
use crate::model::{Cell, Row};
use crate::style::{Align, Border, Color, FontFace};
use crate::surface::{Block, DrawingSurface, NextPosition, Point};

/// Identifies a row of a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowId {
    Heading,
    /// Zero-based index into [`Table::rows`].
    Data(usize),
}

type GroupKey = Box<dyn Fn(usize) -> String>;

/// Group banner policy.
///
/// `key(j)` names the group of data row `j`; whenever it differs from the
/// previous row's key a banner showing the new key is drawn before row `j`.
pub struct Regroup {
    key: GroupKey,
    pub font: FontFace,
    /// Base line height of the banner.
    pub height: f64,
    pub align: Align,
    pub fill: bool,
    pub fill_color: Color,
    /// Draw a rule along the bottom of the banner.
    pub underline: bool,
    /// Repeat the active banner under the heading after a mid-group break.
    pub repeat_on_break: bool,
}

impl Regroup {
    pub fn new(key: impl Fn(usize) -> String + 'static) -> Self {
        Self {
            key: Box::new(key),
            font: FontFace::default().bold(),
            height: 5.0,
            align: Align::Center,
            fill: true,
            fill_color: Color::SHADE,
            underline: false,
            repeat_on_break: true,
        }
    }

    pub fn key(&self, row: usize) -> String {
        (self.key)(row)
    }
}

impl fmt::Debug for Regroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Regroup")
            .field("font", &self.font)
            .field("height", &self.height)
            .field("align", &self.align)
            .field("fill", &self.fill)
            .field("underline", &self.underline)
            .field("repeat_on_break", &self.repeat_on_break)
            .finish_non_exhaustive()
    }
}

/// What a call to [`Table::render`] drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Pages the table touched, including the one it started on.
    pub pages: usize,
    pub page_breaks: usize,
    /// Heading draws, first one included.
    pub headings: usize,
    /// Banners drawn for a group change.
    pub banners: usize,
    /// Banners reprinted after a mid-group page break.
    pub banner_repeats: usize,
    pub rows: usize,
}

/// A table bound for one rendering pass.
#[derive(Debug)]
pub struct Table {
    pub heading: Option<Row>,
    pub rows: Vec<Row>,
    pub col_widths: ColumnWidths,
    /// Total horizontal space.
    pub width: f64,
    pub line_height: f64,
    /// Base line height of the heading; `line_height` when unset.
    pub heading_line_height: Option<f64>,
    /// Empty: left aligned. One entry: every column. Otherwise per column.
    pub align: Vec<Align>,
    pub heading_align: Option<Align>,
    pub font: FontFace,
    pub heading_font: FontFace,
    /// Font for filled data rows; `font` when unset.
    pub fill_font: Option<FontFace>,
    /// Stripe every other data row, starting unfilled.
    pub fill_alternate: bool,
    /// Fill state of every data row when not alternating.
    pub fill: bool,
    pub fill_color: Color,
    pub heading_fill: bool,
    pub heading_fill_color: Color,
    pub border: Border,
    pub regroup: Option<Regroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Heading,
    Banner,
    Data { filled: bool },
}

struct RenderState {
    origin_x: f64,
    /// The engine opened this page and nothing but repeated headings is on it.
    fresh_page: bool,
    current_group: Option<String>,
    stripe: bool,
    report: RenderReport,
}

impl Table {
    pub fn new(width: f64) -> Self {
        Self {
            heading: None,
            rows: Vec::new(),
            col_widths: ColumnWidths::Even,
            width,
            line_height: 5.0,
            heading_line_height: None,
            align: Vec::new(),
            heading_align: None,
            font: FontFace::default(),
            heading_font: FontFace::default().bold(),
            fill_font: None,
            fill_alternate: true,
            fill: false,
            fill_color: Color::STRIPE,
            heading_fill: true,
            heading_fill_color: Color::SHADE,
            border: Border::ALL,
            regroup: None,
        }
    }

    /// A table spanning the printable width of `surface`.
    pub fn fitting(surface: &impl DrawingSurface) -> Self {
        Self::new(surface.page_metrics().printable_width())
    }

    /// Set the heading row and return it.
    pub fn heading_row<I, C>(&mut self, cells: I) -> &mut Row
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.heading.insert(Row::new(cells))
    }

    /// Append a data row and return it.
    pub fn row<I, C>(&mut self, cells: I) -> &mut Row
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.rows.push(Row::new(cells));
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    pub fn get_row(&self, id: RowId) -> Option<&Row> {
        match id {
            RowId::Heading => self.heading.as_ref(),
            RowId::Data(j) => self.rows.get(j),
        }
    }

    /// 1-indexed position of a row, the heading counting as row 1.
    pub fn row_number(&self, id: RowId) -> usize {
        match id {
            RowId::Heading => 1,
            RowId::Data(j) => j + 1 + usize::from(self.heading.is_some()),
        }
    }

    /// Width of the cell of row `id` starting at logical column `col` and
    /// spanning `colspan` columns.
    pub fn resolve_width(&self, id: RowId, col: usize, colspan: usize) -> Result<f64, TableError> {
        let column_count = self.get_row(id).map(Row::column_count).unwrap_or(0);
        self.col_widths
            .resolve(self.width, column_count, col, colspan)
            .ok_or_else(|| {
                ConfigError::ColumnOutOfRange {
                    row: self.row_number(id),
                    column: col.saturating_add(1),
                    span: colspan,
                    available: self.col_widths.covered_columns().unwrap_or(0),
                }
                .into()
            })
    }

    /// Wrap every cell of a row on `surface` and equalize its height.
    pub fn measure_row(
        &self,
        surface: &impl DrawingSurface,
        id: RowId,
    ) -> Result<RowMetrics, TableError> {
        let font = match id {
            RowId::Heading => &self.heading_font,
            RowId::Data(_) => self.data_font(self.data_filled(false)),
        };
        self.measure_with(surface, id, font)
    }

    /// Lay the whole table out on `surface`, starting at its cursor.
    pub fn render(&self, surface: &mut impl DrawingSurface) -> Result<RenderReport, TableError> {
        let _span = debug_span!("render_table", rows = self.rows.len()).entered();
        self.validate()?;

        let mut state = RenderState {
            origin_x: surface.cursor().x,
            fresh_page: false,
            current_group: None,
            stripe: false,
            report: RenderReport {
                pages: 1,
                ..RenderReport::default()
            },
        };

        if self.heading.is_some() {
            let metrics = self.measure_row(&*surface, RowId::Heading)?;
            let decision = page_break::decide_break(
                |h| surface.will_overflow(h),
                None,
                metrics.height,
                state.fresh_page,
            );
            if decision == BreakDecision::NewPage {
                debug!("heading does not fit, starting table on a new page");
                self.start_page(surface, &mut state)?;
            }
            self.draw_row(surface, &mut state, RowKind::Heading, &metrics)?;
            state.report.headings += 1;
        }

        for j in 0..self.rows.len() {
            self.display_row(surface, &mut state, j)?;
        }

        debug!(
            pages = state.report.pages,
            breaks = state.report.page_breaks,
            banners = state.report.banners,
            "table rendered"
        );
        Ok(state.report)
    }

    fn display_row(
        &self,
        surface: &mut impl DrawingSurface,
        state: &mut RenderState,
        j: usize,
    ) -> Result<(), TableError> {
        let filled = self.data_filled(state.stripe);
        let mut banner = None;
        if let Some(regroup) = &self.regroup {
            let key = regroup.key(j);
            if state.current_group.as_deref() != Some(key.as_str()) {
                banner = Some(self.measure_banner(&*surface, regroup, &key)?);
                state.current_group = Some(key);
            }
        }

        // A banner resets the stripes, so the row is measured with the
        // fill state it will actually be drawn in.
        let filled = if banner.is_some() {
            self.data_filled(false)
        } else {
            filled
        };
        let metrics = self.measure_data_row(&*surface, j, filled)?;

        let decision = page_break::decide_break(
            |h| surface.will_overflow(h),
            banner.as_ref().map(|b| b.height),
            metrics.height,
            state.fresh_page,
        );
        if decision == BreakDecision::NewPage {
            debug!(row = self.row_number(RowId::Data(j)), "page break");
            self.start_page(surface, state)?;
            self.repeat_heading(surface, state, banner.is_none())?;
        }

        if let Some(banner) = &banner {
            debug!(group = state.current_group.as_deref().unwrap_or_default(), "regroup banner");
            self.draw_banner(surface, state, banner)?;
            state.report.banners += 1;
            state.stripe = false;
        }

        let kind = RowKind::Data {
            filled: self.data_filled(state.stripe),
        };
        trace!(row = self.row_number(RowId::Data(j)), height = metrics.height, "row");
        self.draw_row(surface, state, kind, &metrics)?;
        state.report.rows += 1;
        state.fresh_page = false;
        if self.fill_alternate {
            state.stripe = !state.stripe;
        }
        Ok(())
    }

    /// Open a new page and put the cursor back at the table's left edge.
    fn start_page(
        &self,
        surface: &mut impl DrawingSurface,
        state: &mut RenderState,
    ) -> Result<(), TableError> {
        surface.new_page()?;
        let y = surface.cursor().y;
        surface.set_cursor(Point::new(state.origin_x, y));
        state.fresh_page = true;
        state.report.pages += 1;
        state.report.page_breaks += 1;
        Ok(())
    }

    /// Redraw the heading at the top of a continuation page, and the active
    /// banner too when `with_banner` is set and the policy asks for it.
    fn repeat_heading(
        &self,
        surface: &mut impl DrawingSurface,
        state: &mut RenderState,
        with_banner: bool,
    ) -> Result<(), TableError> {
        if self.heading.is_some() {
            let metrics = self.measure_row(&*surface, RowId::Heading)?;
            self.draw_row(surface, state, RowKind::Heading, &metrics)?;
            state.report.headings += 1;
        }

        if !with_banner {
            return Ok(());
        }
        if let (Some(regroup), Some(key)) = (&self.regroup, state.current_group.as_deref()) {
            if regroup.repeat_on_break {
                let banner = self.measure_banner(&*surface, regroup, key)?;
                self.draw_banner(surface, state, &banner)?;
                state.report.banner_repeats += 1;
            }
        }
        Ok(())
    }

    fn measure_data_row(
        &self,
        surface: &impl DrawingSurface,
        j: usize,
        filled: bool,
    ) -> Result<RowMetrics, TableError> {
        self.measure_with(surface, RowId::Data(j), self.data_font(filled))
    }

    fn measure_with(
        &self,
        surface: &impl DrawingSurface,
        id: RowId,
        font: &FontFace,
    ) -> Result<RowMetrics, TableError> {
        let base = self.base_line_height(id);
        let Some(row) = self.get_row(id) else {
            return Ok(height::equalize(base, Vec::new()));
        };
        let mut cells = Vec::with_capacity(row.cells.len());
        for (col, cell) in row.columns() {
            let width = self.resolve_width(id, col, cell.colspan)?;
            let lines = surface.measure_wrap(&cell.text, width, font)?;
            cells.push((col, width, lines));
        }
        Ok(height::equalize(base, cells))
    }

    fn measure_banner(
        &self,
        surface: &impl DrawingSurface,
        regroup: &Regroup,
        key: &str,
    ) -> Result<RowMetrics, TableError> {
        let lines = surface.measure_wrap(key, self.width, &regroup.font)?;
        Ok(height::equalize(regroup.height, vec![(0, self.width, lines)]))
    }

    fn draw_banner(
        &self,
        surface: &mut impl DrawingSurface,
        state: &mut RenderState,
        banner: &RowMetrics,
    ) -> Result<(), TableError> {
        self.draw_row(surface, state, RowKind::Banner, banner)?;
        if let Some(regroup) = &self.regroup {
            if regroup.underline {
                let y = surface.cursor().y;
                surface.draw_line(
                    Point::new(state.origin_x, y),
                    Point::new(state.origin_x + self.width, y),
                )?;
            }
        }
        Ok(())
    }

    fn draw_row(
        &self,
        surface: &mut impl DrawingSurface,
        state: &mut RenderState,
        kind: RowKind,
        metrics: &RowMetrics,
    ) -> Result<(), TableError> {
        if metrics.cells.is_empty() {
            // A row without cells is a blank spacer.
            let y = surface.cursor().y + metrics.height;
            surface.set_cursor(Point::new(state.origin_x, y));
            return Ok(());
        }

        let (font, fill) = match kind {
            RowKind::Heading => (
                &self.heading_font,
                self.heading_fill.then_some(self.heading_fill_color),
            ),
            RowKind::Banner => match &self.regroup {
                Some(regroup) => (&regroup.font, regroup.fill.then_some(regroup.fill_color)),
                None => (&self.font, None),
            },
            RowKind::Data { filled } => (self.data_font(filled), filled.then_some(self.fill_color)),
        };

        let last = metrics.cells.len() - 1;
        for (i, cell) in metrics.cells.iter().enumerate() {
            let block = Block {
                width: cell.width,
                height: metrics.height,
                line_height: cell.line_height,
                lines: &cell.lines,
                border: self.border,
                fill,
                align: self.cell_align(kind, cell.column),
                font,
            };
            let next = if i == last {
                NextPosition::NextLine
            } else {
                NextPosition::Right
            };
            surface.draw_block(&block, next)?;
        }

        let y = surface.cursor().y;
        surface.set_cursor(Point::new(state.origin_x, y));
        Ok(())
    }

    fn base_line_height(&self, id: RowId) -> f64 {
        match id {
            RowId::Heading => self.heading_line_height.unwrap_or(self.line_height),
            RowId::Data(_) => self.line_height,
        }
    }

    fn data_filled(&self, stripe: bool) -> bool {
        if self.fill_alternate {
            stripe
        } else {
            self.fill
        }
    }

    fn data_font(&self, filled: bool) -> &FontFace {
        match (&self.fill_font, filled) {
            (Some(font), true) => font,
            _ => &self.font,
        }
    }

    fn cell_align(&self, kind: RowKind, column: usize) -> Align {
        match kind {
            RowKind::Banner => self
                .regroup
                .as_ref()
                .map(|r| r.align)
                .unwrap_or_default(),
            RowKind::Heading => self
                .heading_align
                .unwrap_or_else(|| self.column_align(column)),
            RowKind::Data { .. } => self.column_align(column),
        }
    }

    fn column_align(&self, column: usize) -> Align {
        match self.align.as_slice() {
            [] => Align::Left,
            [only] => *only,
            many => many.get(column).copied().unwrap_or_default(),
        }
    }

    /// Check every setting and every row before anything is drawn.
    pub fn validate(&self) -> Result<(), TableError> {
        positive("width", self.width)?;
        positive("line_height", self.line_height)?;
        if let Some(h) = self.heading_line_height {
            positive("heading_line_height", h)?;
        }
        if let Some(regroup) = &self.regroup {
            positive("regroup height", regroup.height)?;
        }
        if !self.col_widths.is_valid() {
            return Err(ConfigError::InvalidWeights.into());
        }

        let ids = self
            .heading
            .iter()
            .map(|_| RowId::Heading)
            .chain((0..self.rows.len()).map(RowId::Data));
        for id in ids {
            self.validate_row(id)?;
        }
        Ok(())
    }

    fn validate_row(&self, id: RowId) -> Result<(), TableError> {
        let Some(row) = self.get_row(id) else {
            return Ok(());
        };
        if let Some(col) = row.colspan_overflow() {
            return Err(ConfigError::ColspanOverflow {
                row: self.row_number(id),
                column: col.saturating_add(1),
            }
            .into());
        }
        let heading_overrides = id == RowId::Heading && self.heading_align.is_some();
        for (col, cell) in row.columns() {
            if cell.colspan == 0 {
                return Err(ConfigError::ZeroColspan {
                    row: self.row_number(id),
                    column: col.saturating_add(1),
                }
                .into());
            }
            self.resolve_width(id, col, cell.colspan)?;
            if self.align.len() > 1 && col >= self.align.len() && !heading_overrides {
                return Err(ConfigError::AlignmentOutOfRange {
                    row: self.row_number(id),
                    column: col.saturating_add(1),
                    available: self.align.len(),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
