//! # PDF Surface
//!
//! A [`DrawingSurface`] that paints straight into PDF content streams and
//! serializes them with [`PdfSurface::finish`].
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, pages, content streams
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Coordinates on the surface are in the page's user unit with the origin at
//! the top-left corner. They are converted to PDF points (origin bottom-left)
//! as the content stream is written. Only the standard base fonts are used,
//! with WinAnsiEncoding, so nothing is embedded.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::SurfaceError;
use crate::font::{FontContext, StandardFont};
use crate::model::{Metadata, PageConfig};
use crate::style::{Align, Border, Color, FontFace};
use crate::surface::{Block, DrawingSurface, NextPosition, PageMetrics, Point};
use crate::text::TextLayout;

/// Stroke width for borders and rules, in points (0.2 mm).
const LINE_WIDTH_PT: f64 = 0.567;

pub struct PdfSurface {
    metrics: PageMetrics,
    /// Points per user unit.
    k: f64,
    cell_margin: f64,
    cursor: Point,
    pages: Vec<Vec<u8>>,
    /// Fonts used so far; `/F{i}` names the i-th one.
    fonts: Vec<StandardFont>,
    font_context: FontContext,
    text_layout: TextLayout,
}

impl PdfSurface {
    /// A surface with one empty page open.
    pub fn new(config: &PageConfig) -> Self {
        let (width, height) = config.dimensions();
        let metrics = PageMetrics {
            width,
            height,
            margins: config.margin,
        };
        let mut surface = Self {
            metrics,
            k: config.unit.scale(),
            cell_margin: config.cell_margin,
            cursor: Point::new(metrics.margins.left, metrics.margins.top),
            pages: Vec::new(),
            fonts: Vec::new(),
            font_context: FontContext::new(),
            text_layout: TextLayout::new(),
        };
        surface.open_page();
        surface
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Register font aliases here before drawing.
    pub fn font_context_mut(&mut self) -> &mut FontContext {
        &mut self.font_context
    }

    fn open_page(&mut self) {
        let mut stream = Vec::new();
        let _ = write!(stream, "{:.3} w\n0 G\n", LINE_WIDTH_PT);
        self.pages.push(stream);
        self.cursor = Point::new(self.metrics.margins.left, self.metrics.margins.top);
    }

    fn stream(&mut self) -> &mut Vec<u8> {
        // `new` always opens a page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Index of `font` in the resource dictionary, registering it on first use.
    fn font_index(&mut self, font: StandardFont) -> usize {
        match self.fonts.iter().position(|&f| f == font) {
            Some(i) => i,
            None => {
                self.fonts.push(font);
                self.fonts.len() - 1
            }
        }
    }

    /// Text width in user units.
    fn text_width(&self, text: &str, face: &FontFace) -> f64 {
        self.text_layout.measure_width(&self.font_context, text, face) / self.k
    }

    fn px(&self, x: f64) -> f64 {
        x * self.k
    }

    /// PDF y coordinate of the user-space y.
    fn py(&self, y: f64) -> f64 {
        (self.metrics.height - y) * self.k
    }

    fn write_fill(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        let (px, py, pw, ph) = (self.px(x), self.py(y + h), w * self.k, h * self.k);
        let _ = write!(
            self.stream(),
            "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
            color.r, color.g, color.b, px, py, pw, ph
        );
    }

    fn write_border(&mut self, x: f64, y: f64, w: f64, h: f64, border: Border) {
        if border.is_none() {
            return;
        }
        let (x0, x1) = (self.px(x), self.px(x + w));
        let (y0, y1) = (self.py(y), self.py(y + h));
        if border.is_all() {
            let _ = write!(
                self.stream(),
                "{:.2} {:.2} {:.2} {:.2} re\nS\n",
                x0,
                y1,
                x1 - x0,
                y0 - y1
            );
            return;
        }

        let mut path = String::new();
        if border.top {
            let _ = write!(path, "{:.2} {:.2} m\n{:.2} {:.2} l\n", x0, y0, x1, y0);
        }
        if border.bottom {
            let _ = write!(path, "{:.2} {:.2} m\n{:.2} {:.2} l\n", x0, y1, x1, y1);
        }
        if border.left {
            let _ = write!(path, "{:.2} {:.2} m\n{:.2} {:.2} l\n", x0, y0, x0, y1);
        }
        if border.right {
            let _ = write!(path, "{:.2} {:.2} m\n{:.2} {:.2} l\n", x1, y0, x1, y1);
        }
        path.push_str("S\n");
        self.stream().extend_from_slice(path.as_bytes());
    }

    fn write_lines(&mut self, x: f64, y: f64, block: &Block<'_>) {
        let font = self.font_context.resolve(block.font);
        let index = self.font_index(font);
        let size = block.font.size;
        let font_height = size / self.k;

        for (i, line) in block.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let text_width = self.text_width(line, block.font);
            let tx = match block.align {
                Align::Left => x + self.cell_margin,
                Align::Center => x + (block.width - text_width) / 2.0,
                Align::Right => x + block.width - self.cell_margin - text_width,
            };
            // Baseline vertically centred in the line's slot.
            let ty = y + block.line_height * (i as f64 + 0.5) + 0.3 * font_height;
            let (px, py) = (self.px(tx), self.py(ty));
            let encoded = encode_text(line);
            let stream = self.stream();
            let _ = write!(
                stream,
                "BT\n0 g\n/F{} {:.2} Tf\n{:.2} {:.2} Td\n(",
                index, size, px, py
            );
            stream.extend_from_slice(&encoded);
            stream.extend_from_slice(b") Tj\nET\n");
        }
    }

    /// Serialize every page into a complete PDF file.
    pub fn finish(self, metadata: &Metadata) -> Vec<u8> {
        let mut objects: Vec<Vec<u8>> = vec![Vec::new(), Vec::new(), Vec::new()];
        // 0 = placeholder, 1 = Catalog, 2 = Pages, then fonts, then pages.

        let mut font_ids = Vec::with_capacity(self.fonts.len());
        for font in &self.fonts {
            font_ids.push(objects.len());
            objects.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                )
                .into_bytes(),
            );
        }
        let font_resources = font_ids
            .iter()
            .enumerate()
            .map(|(i, id)| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let (page_w, page_h) = (self.metrics.width * self.k, self.metrics.height * self.k);
        let mut page_ids = Vec::with_capacity(self.pages.len());
        for content in &self.pages {
            let compressed = compress_to_vec_zlib(content, 6);
            let content_id = objects.len();
            let mut data = Vec::new();
            let _ = write!(
                data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            data.extend_from_slice(&compressed);
            data.extend_from_slice(b"\nendstream");
            objects.push(data);

            let page_id = objects.len();
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                    page_w, page_h, content_id, font_resources
                )
                .into_bytes(),
            );
            page_ids.push(page_id);
        }

        objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_ids.len()
        )
        .into_bytes();

        let info_id = objects.len();
        objects.push(info_dictionary(metadata));

        serialize(&objects, info_id)
    }
}

impl DrawingSurface for PdfSurface {
    fn cursor(&self) -> Point {
        self.cursor
    }

    fn set_cursor(&mut self, position: Point) {
        self.cursor = position;
    }

    fn page_metrics(&self) -> PageMetrics {
        self.metrics
    }

    fn new_page(&mut self) -> Result<(), SurfaceError> {
        self.open_page();
        Ok(())
    }

    fn measure_wrap(
        &self,
        text: &str,
        width: f64,
        font: &FontFace,
    ) -> Result<Vec<String>, SurfaceError> {
        let inner = width - 2.0 * self.cell_margin;
        if !(inner > 0.0) {
            return Err(SurfaceError::Measurement {
                width,
                reason: format!("no room for text inside a {} cell margin", self.cell_margin),
            });
        }
        Ok(self
            .text_layout
            .break_into_lines(&self.font_context, text, inner * self.k, font)
            .into_iter()
            .map(|line| line.text)
            .collect())
    }

    fn draw_block(&mut self, block: &Block<'_>, next: NextPosition) -> Result<(), SurfaceError> {
        if !(block.width.is_finite() && block.height.is_finite()) {
            return Err(SurfaceError::Drawing(format!(
                "block size {} x {} is not finite",
                block.width, block.height
            )));
        }
        let Point { x, y } = self.cursor;
        if let Some(color) = block.fill {
            if color.is_visible() {
                self.write_fill(x, y, block.width, block.height, color);
            }
        }
        self.write_border(x, y, block.width, block.height, block.border);
        self.write_lines(x, y, block);

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
        let (x0, y0, x1, y1) = (self.px(from.x), self.py(from.y), self.px(to.x), self.py(to.y));
        let _ = write!(
            self.stream(),
            "{:.2} {:.2} m\n{:.2} {:.2} l\nS\n",
            x0, y0, x1, y1
        );
        Ok(())
    }
}

fn info_dictionary(metadata: &Metadata) -> Vec<u8> {
    let mut info = String::from("<< ");
    if let Some(ref title) = metadata.title {
        let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
    }
    if let Some(ref author) = metadata.author {
        let _ = write!(info, "/Author ({}) ", escape_pdf_string(author));
    }
    if let Some(ref subject) = metadata.subject {
        let _ = write!(info, "/Subject ({}) ", escape_pdf_string(subject));
    }
    let creator = metadata.creator.as_deref().unwrap_or("pagetable");
    let _ = write!(
        info,
        "/Creator ({}) /Producer (pagetable {}) >>",
        escape_pdf_string(creator),
        env!("CARGO_PKG_VERSION")
    );
    info.into_bytes()
}

/// Serialize all objects into the final PDF byte stream.
fn serialize(objects: &[Vec<u8>], info_id: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{} 0 obj\n", i);
        output.extend_from_slice(obj);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len(),
        info_id,
        xref_offset
    );
    output
}

/// Escape special characters in a PDF string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Encode a line as an escaped WinAnsi string body. Unmappable characters
/// become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let byte = unicode_to_winansi(ch).unwrap_or(b'?');
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // Ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C), // OE ligature
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92), // Right single quote
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C), // oe ligature
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_encode_text_uses_winansi() {
        assert_eq!(encode_text("Noël"), vec![b'N', b'o', 0xEB, b'l']);
        assert_eq!(encode_text("a(b)"), b"a\\(b\\)".to_vec());
        assert_eq!(encode_text("\u{0153}uvre"), vec![0x9C, b'u', b'v', b'r', b'e']);
        assert_eq!(encode_text("\u{4E2D}"), b"?".to_vec());
    }

    #[test]
    fn test_empty_surface_produces_valid_pdf() {
        let surface = PdfSurface::new(&PageConfig::default());
        let bytes = surface.finish(&Metadata::default());
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"/Count 1"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let surface = PdfSurface::new(&PageConfig::default());
        let metadata = Metadata {
            title: Some("Horaires (Toussaint)".to_string()),
            author: Some("Paroisse".to_string()),
            subject: None,
            creator: None,
        };
        let bytes = surface.finish(&metadata);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Horaires \\(Toussaint\\))"));
        assert!(text.contains("/Author (Paroisse)"));
        assert!(text.contains("/Creator (pagetable)"));
    }

    #[test]
    fn test_page_geometry_in_user_units() {
        let surface = PdfSurface::new(&PageConfig::default());
        let m = surface.page_metrics();
        assert!((m.width - 210.0).abs() < 0.01);
        assert!((m.height - 297.0).abs() < 0.01);
        assert!((m.printable_width() - 190.0).abs() < 0.01);
        assert_eq!(surface.cursor(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_measure_wrap_respects_cell_margin() {
        let surface = PdfSurface::new(&PageConfig::default());
        let font = FontFace::default();
        let lines = surface.measure_wrap("Messe", 40.0, &font).unwrap();
        assert_eq!(lines, vec!["Messe"]);
        let err = surface.measure_wrap("Messe", 2.0, &font).unwrap_err();
        assert!(matches!(err, SurfaceError::Measurement { .. }));
    }

    #[test]
    fn test_narrow_cell_wraps() {
        let surface = PdfSurface::new(&PageConfig::default());
        let font = FontFace::default();
        let lines = surface
            .measure_wrap("Messe de la Toussaint en l'honneur de tous les saints", 30.0, &font)
            .unwrap();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(surface.text_width(line, &font) <= 28.0 + 1e-6, "{}", line);
        }
    }

    #[test]
    fn test_fonts_registered_once_per_face() {
        let mut surface = PdfSurface::new(&PageConfig::default());
        let regular = FontFace::default();
        let bold = FontFace::default().bold();
        let lines = vec!["a".to_string()];
        for font in [&regular, &bold, &regular] {
            let block = Block {
                width: 20.0,
                height: 5.0,
                line_height: 5.0,
                lines: &lines,
                border: Border::ALL,
                fill: None,
                align: Align::Left,
                font,
            };
            surface.draw_block(&block, NextPosition::Right).unwrap();
        }
        assert_eq!(surface.fonts.len(), 2);
        let bytes = surface.finish(&Metadata::default());
        assert!(contains(&bytes, b"/BaseFont /Helvetica-Bold"));
        assert!(contains(&bytes, b"/BaseFont /Helvetica "));
    }

    #[test]
    fn test_font_alias_reaches_pdf() {
        let mut surface = PdfSurface::new(&PageConfig::default());
        surface
            .font_context_mut()
            .registry_mut()
            .register_alias("Mono", 400, false, StandardFont::Courier);
        let lines = vec!["code".to_string()];
        let font = FontFace::new("Mono", 9.0);
        let block = Block {
            width: 30.0,
            height: 5.0,
            line_height: 5.0,
            lines: &lines,
            border: Border::ALL,
            fill: None,
            align: Align::Right,
            font: &font,
        };
        surface.draw_block(&block, NextPosition::NextLine).unwrap();
        let bytes = surface.finish(&Metadata::default());
        assert!(contains(&bytes, b"/BaseFont /Courier "));
    }

    #[test]
    fn test_new_page_adds_page() {
        let mut surface = PdfSurface::new(&PageConfig::default());
        surface.set_cursor(Point::new(10.0, 200.0));
        surface.new_page().unwrap();
        assert_eq!(surface.page_count(), 2);
        assert_eq!(surface.cursor(), Point::new(10.0, 10.0));
        let bytes = surface.finish(&Metadata::default());
        assert!(contains(&bytes, b"/Count 2"));
    }

    #[test]
    fn test_block_advances_cursor() {
        let mut surface = PdfSurface::new(&PageConfig::default());
        let lines = vec![String::new()];
        let font = FontFace::default();
        let block = Block {
            width: 40.0,
            height: 10.0,
            line_height: 10.0,
            lines: &lines,
            border: Border::NONE,
            fill: Some(Color::STRIPE),
            align: Align::Center,
            font: &font,
        };
        surface.draw_block(&block, NextPosition::Right).unwrap();
        assert_eq!(surface.cursor(), Point::new(50.0, 10.0));
        surface.draw_block(&block, NextPosition::NextLine).unwrap();
        assert_eq!(surface.cursor(), Point::new(10.0, 20.0));
    }
}
