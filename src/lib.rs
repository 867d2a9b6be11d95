//! # pagetable
//!
//! A paginated table layout engine.
//!
//! Rows flow *into* pages: before a row is drawn the engine asks the surface
//! whether it still fits. If it doesn't, a new page is opened and the heading
//! row is repeated on top. Cells wrap their text and every cell of a row
//! takes the height of the tallest one. Optional group banners are inserted
//! whenever the group key changes, and a banner never sits alone at the
//! bottom of a page.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Cells, rows, table document
//!       ↓
//!   [layout]   Widths, row heights, page breaks, banners
//!       ↓
//!   [surface]  DrawingSurface trait (cursor, wrap, blocks)
//!       ↓
//!   [pdf]      PdfSurface: serialize to PDF bytes
//! ```

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod surface;
pub mod text;

pub use error::{ConfigError, SurfaceError, TableError};
pub use layout::{ColumnWidths, Regroup, RenderReport, RowId, Table};
pub use model::{Cell, Row, TableDocument};
pub use pdf::PdfSurface;
pub use surface::{DrawingSurface, Point};

use tracing::debug;

/// Render every table of a document, one after the other, to PDF bytes.
pub fn render_document(document: &TableDocument) -> Result<Vec<u8>, TableError> {
    let mut surface = PdfSurface::new(&document.page);
    let printable_width = surface.page_metrics().printable_width();

    for (i, spec) in document.tables.iter().enumerate() {
        let table = spec.to_table(printable_width)?;
        let report = table.render(&mut surface)?;
        debug!(table = i, pages = report.pages, rows = report.rows, "table placed");

        if spec.spacing > 0.0 {
            let at = surface.cursor();
            surface.set_cursor(Point::new(at.x, at.y + spec.spacing));
        }
    }

    Ok(surface.finish(&document.metadata))
}

/// Render a document described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, TableError> {
    let document: TableDocument = serde_json::from_str(json)?;
    render_document(&document)
}
