//! An in-memory surface that records every drawing call.
//!
//! Intended for tests and examples, not for producing output.
//!
//! Text is measured as if every character had the same advance width, so
//! wrap results are easy to predict in tests. Page breaks follow the page
//! geometry unless an overflow rule overrides them.

use std::cell::Cell;
use std::fmt;

use super::{Block, DrawingSurface, Edges, NextPosition, PageMetrics, Point};
use crate::error::SurfaceError;
use crate::style::{Align, Border, Color, FontFace};

/// What the surface knows when asked about an overflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowProbe {
    /// Zero-based index of the current page.
    pub page: usize,
    /// Zero-based count of `will_overflow` calls so far.
    pub call: usize,
    pub y: f64,
    pub height: f64,
}

/// A block as it was drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBlock {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub line_height: f64,
    pub lines: Vec<String>,
    pub border: Border,
    pub fill: Option<Color>,
    pub align: Align,
    pub font: FontFace,
}

impl RecordedBlock {
    /// The block's lines joined with spaces.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    NewPage { page: usize },
    Block(RecordedBlock),
    Line { page: usize, from: Point, to: Point },
}

type OverflowRule = Box<dyn Fn(&OverflowProbe) -> bool>;

pub struct RecordingSurface {
    metrics: PageMetrics,
    char_width: f64,
    cursor: Point,
    page: usize,
    ops: Vec<SurfaceOp>,
    overflow_rule: Option<OverflowRule>,
    probes: Cell<usize>,
}

impl fmt::Debug for RecordingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSurface")
            .field("metrics", &self.metrics)
            .field("char_width", &self.char_width)
            .field("cursor", &self.cursor)
            .field("page", &self.page)
            .field("ops", &self.ops.len())
            .finish()
    }
}

impl RecordingSurface {
    pub fn new(metrics: PageMetrics) -> Self {
        Self {
            metrics,
            char_width: 2.0,
            cursor: Point::new(metrics.margins.left, metrics.margins.top),
            page: 0,
            ops: Vec::new(),
            overflow_rule: None,
            probes: Cell::new(0),
        }
    }

    /// A4 portrait in millimetres with 10 mm margins (190 mm printable width).
    pub fn a4() -> Self {
        Self::new(PageMetrics {
            width: 210.0,
            height: 297.0,
            margins: Edges::uniform(10.0),
        })
    }

    /// Width every character takes when wrapping.
    pub fn with_char_width(mut self, char_width: f64) -> Self {
        self.char_width = char_width;
        self
    }

    /// Replace the geometric overflow check with `rule`.
    pub fn with_overflow_rule(mut self, rule: impl Fn(&OverflowProbe) -> bool + 'static) -> Self {
        self.overflow_rule = Some(Box::new(rule));
        self
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn blocks(&self) -> impl Iterator<Item = &RecordedBlock> {
        self.ops.iter().filter_map(|op| match op {
            SurfaceOp::Block(b) => Some(b),
            _ => None,
        })
    }

    pub fn blocks_on_page(&self, page: usize) -> Vec<&RecordedBlock> {
        self.blocks().filter(|b| b.page == page).collect()
    }

    /// Number of pages touched so far (at least one).
    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    pub fn new_page_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::NewPage { .. }))
            .count()
    }

    /// Distinct row start positions on a page, grouped by (y, height).
    pub fn rows_on_page(&self, page: usize) -> Vec<Vec<&RecordedBlock>> {
        let mut rows: Vec<Vec<&RecordedBlock>> = Vec::new();
        for block in self.blocks_on_page(page) {
            match rows.last_mut() {
                Some(row) if (row[0].y - block.y).abs() < 1e-9 => row.push(block),
                _ => rows.push(vec![block]),
            }
        }
        rows
    }

    fn wrap(&self, text: &str, capacity: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let mut word: Vec<char> = word.chars().collect();
                loop {
                    let used = current.chars().count();
                    let needed = if used == 0 { word.len() } else { used + 1 + word.len() };
                    if needed <= capacity {
                        if used > 0 {
                            current.push(' ');
                        }
                        current.extend(word.iter());
                        break;
                    }
                    if used > 0 {
                        lines.push(std::mem::take(&mut current));
                        continue;
                    }
                    // Word longer than a whole line.
                    let rest = word.split_off(capacity);
                    lines.push(word.iter().collect());
                    word = rest;
                    if word.is_empty() {
                        break;
                    }
                }
            }
            lines.push(current);
        }
        lines
    }
}

impl DrawingSurface for RecordingSurface {
    fn cursor(&self) -> Point {
        self.cursor
    }

    fn set_cursor(&mut self, position: Point) {
        self.cursor = position;
    }

    fn page_metrics(&self) -> PageMetrics {
        self.metrics
    }

    fn will_overflow(&self, height: f64) -> bool {
        let call = self.probes.get();
        self.probes.set(call + 1);
        match &self.overflow_rule {
            Some(rule) => rule(&OverflowProbe {
                page: self.page,
                call,
                y: self.cursor.y,
                height,
            }),
            None => self.cursor.y + height > self.metrics.break_threshold(),
        }
    }

    fn new_page(&mut self) -> Result<(), SurfaceError> {
        self.page += 1;
        self.cursor = Point::new(self.metrics.margins.left, self.metrics.margins.top);
        self.ops.push(SurfaceOp::NewPage { page: self.page });
        Ok(())
    }

    fn measure_wrap(
        &self,
        text: &str,
        width: f64,
        _font: &FontFace,
    ) -> Result<Vec<String>, SurfaceError> {
        if !(width > 0.0) || !(self.char_width > 0.0) {
            return Err(SurfaceError::Measurement {
                width,
                reason: "width must be positive".to_string(),
            });
        }
        let capacity = (width / self.char_width + 1e-9).floor() as usize;
        if capacity == 0 {
            return Err(SurfaceError::Measurement {
                width,
                reason: "narrower than a single character".to_string(),
            });
        }
        Ok(self.wrap(text, capacity))
    }

    fn draw_block(&mut self, block: &Block<'_>, next: NextPosition) -> Result<(), SurfaceError> {
        self.ops.push(SurfaceOp::Block(RecordedBlock {
            page: self.page,
            x: self.cursor.x,
            y: self.cursor.y,
            width: block.width,
            height: block.height,
            line_height: block.line_height,
            lines: block.lines.to_vec(),
            border: block.border,
            fill: block.fill,
            align: block.align,
            font: block.font.clone(),
        }));
        match next {
            NextPosition::Right => self.cursor.x += block.width,
            NextPosition::NextLine => {
                self.cursor.x = self.metrics.margins.left;
                self.cursor.y += block.height;
            }
        }
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError> {
        self.ops.push(SurfaceOp::Line {
            page: self.page,
            from,
            to,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_words() {
        let s = RecordingSurface::a4();
        let font = FontFace::default();
        // 20 mm at 2 mm per char = 10 chars per line.
        let lines = s.measure_wrap("Messe de la Toussaint", 20.0, &font).unwrap();
        assert_eq!(lines, vec!["Messe de", "la", "Toussaint"]);
    }

    #[test]
    fn splits_long_words() {
        let s = RecordingSurface::a4();
        let lines = s
            .measure_wrap("abcdefghijkl", 10.0, &FontFace::default())
            .unwrap();
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn empty_text_is_one_line() {
        let s = RecordingSurface::a4();
        let lines = s.measure_wrap("", 10.0, &FontFace::default()).unwrap();
        assert_eq!(lines, vec![String::new()]);
    }

    #[test]
    fn zero_width_is_a_measurement_error() {
        let s = RecordingSurface::a4();
        let err = s.measure_wrap("x", 0.0, &FontFace::default()).unwrap_err();
        assert!(matches!(err, SurfaceError::Measurement { .. }));
        let err = s.measure_wrap("x", 1.0, &FontFace::default()).unwrap_err();
        assert!(matches!(err, SurfaceError::Measurement { .. }));
    }

    #[test]
    fn geometric_overflow() {
        let mut s = RecordingSurface::a4();
        assert!(!s.will_overflow(277.0));
        assert!(s.will_overflow(277.5));
        s.set_cursor(Point::new(10.0, 280.0));
        assert!(s.will_overflow(8.0));
        s.new_page().unwrap();
        assert_eq!(s.cursor(), Point::new(10.0, 10.0));
        assert_eq!(s.page_count(), 2);
    }

    #[test]
    fn overflow_rule_sees_call_index() {
        let s = RecordingSurface::a4().with_overflow_rule(|p| p.call >= 1);
        assert!(!s.will_overflow(1.0));
        assert!(s.will_overflow(1.0));
    }
}
