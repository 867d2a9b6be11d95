//! # Drawing Surface
//!
//! The narrow capability set the table engine draws through. A surface owns
//! a cursor, knows its page geometry, can open a new page, can dry-run wrap
//! text and can paint bordered text blocks and lines. Any renderer (PDF, a
//! test recorder, something else) plugs in by implementing [`DrawingSurface`].
//!
//! All lengths are in the surface's own user unit.

pub mod recording;

pub use recording::{OverflowProbe, RecordingSurface, SurfaceOp};

use crate::error::SurfaceError;
use crate::style::{Align, Border, Color, FontFace};
use serde::{Deserialize, Serialize};

/// A position on the current page, origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Edge values (top, right, bottom, left) used for page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Page dimensions and margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub width: f64,
    pub height: f64,
    pub margins: Edges,
}

impl PageMetrics {
    /// Horizontal space between the left and right margins.
    pub fn printable_width(&self) -> f64 {
        self.width - self.margins.horizontal()
    }

    /// Vertical space between the top and bottom margins.
    pub fn printable_height(&self) -> f64 {
        self.height - self.margins.vertical()
    }

    /// The y coordinate past which content crosses the bottom margin.
    pub fn break_threshold(&self) -> f64 {
        self.height - self.margins.bottom
    }
}

/// Where the cursor goes after a block is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPosition {
    /// Top-right corner of the block, ready for the next cell.
    Right,
    /// Left margin, just below the block.
    NextLine,
}

/// One bordered, optionally filled rectangle with wrapped text inside.
#[derive(Debug, Clone)]
pub struct Block<'a> {
    pub width: f64,
    pub height: f64,
    /// Height given to each text line. `height / lines.len()` for table cells.
    pub line_height: f64,
    /// Text already wrapped to fit `width`.
    pub lines: &'a [String],
    pub border: Border,
    pub fill: Option<Color>,
    pub align: Align,
    pub font: &'a FontFace,
}

/// The operations the table engine needs from a renderer.
pub trait DrawingSurface {
    fn cursor(&self) -> Point;

    fn set_cursor(&mut self, position: Point);

    fn page_metrics(&self) -> PageMetrics;

    /// True if a block of `height` drawn at the cursor would cross the
    /// bottom margin.
    fn will_overflow(&self, height: f64) -> bool {
        self.cursor().y + height > self.page_metrics().break_threshold()
    }

    /// Start a fresh page and move the cursor to the top-left margin.
    fn new_page(&mut self) -> Result<(), SurfaceError>;

    /// Dry-run wrap `text` into the lines it would occupy at `width`.
    fn measure_wrap(
        &self,
        text: &str,
        width: f64,
        font: &FontFace,
    ) -> Result<Vec<String>, SurfaceError>;

    fn draw_block(&mut self, block: &Block<'_>, next: NextPosition) -> Result<(), SurfaceError>;

    fn draw_line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError>;
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for &mut S {
    fn cursor(&self) -> Point {
        (**self).cursor()
    }

    fn set_cursor(&mut self, position: Point) {
        (**self).set_cursor(position)
    }

    fn page_metrics(&self) -> PageMetrics {
        (**self).page_metrics()
    }

    fn will_overflow(&self, height: f64) -> bool {
        (**self).will_overflow(height)
    }

    fn new_page(&mut self) -> Result<(), SurfaceError> {
        (**self).new_page()
    }

    fn measure_wrap(
        &self,
        text: &str,
        width: f64,
        font: &FontFace,
    ) -> Result<Vec<String>, SurfaceError> {
        (**self).measure_wrap(text, width, font)
    }

    fn draw_block(&mut self, block: &Block<'_>, next: NextPosition) -> Result<(), SurfaceError> {
        (**self).draw_block(block, next)
    }

    fn draw_line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError> {
        (**self).draw_line(from, to)
    }
}
