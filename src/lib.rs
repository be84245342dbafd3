//! # Quire
//!
//! A declarative XML to paginated PDF rendering engine.
//!
//! Documents are authored as a small widget vocabulary (`document`, `page`,
//! `div`, `table`, `image`, `qr`) with box-model attributes. The engine
//! resolves the tree through a multi-pass layout: style inheritance,
//! intrinsic sizing, width distribution, text wrapping, height computation
//! and positioning, then paginates overflowing content. Tables split across
//! pages with repeated header rows, re-banded alternate colors, and running
//! carry-over totals.
//!
//! ## Architecture
//!
//! ```text
//! Input (XML)
//!       ↓
//!   [parser]   — widget tree: kinds, attributes, defaults
//!       ↓
//!   [layout]   — sizes, positions, pagination, absolute coordinates
//!       ↓
//!   [pdf]      — serialize to PDF bytes
//! ```
//!
//! ```no_run
//! let pdf = quire::render_xml("<document><page><div>Hello</div></page></document>")?;
//! std::fs::write("out.pdf", pdf)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod parser;
pub mod pdf;
pub mod style;
pub mod text;
pub mod xml;

pub use error::QuireError;

use font::ApproxFontMetrics;
use layout::Layouter;
use model::{Document, Widget, WidgetKind};
use pdf::PdfWriter;

/// Render an XML document string to PDF bytes.
///
/// This is the primary entry point: parse, lay out, serialize.
pub fn render_xml(input: &str) -> Result<Vec<u8>, QuireError> {
    Renderer::from_xml(input)?.write_pdf()
}

/// Holds a parsed and laid-out document, ready for serialization or
/// inspection.
pub struct Renderer {
    doc: Document,
}

impl Renderer {
    /// Parse and lay out an XML document.
    pub fn from_xml(input: &str) -> Result<Self, QuireError> {
        let mut doc = parser::parse_document(input)?;
        let metrics = ApproxFontMetrics;
        Layouter::new(&metrics).run(&mut doc)?;
        Ok(Self { doc })
    }

    /// The laid-out document tree with absolute coordinates.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serialize to PDF bytes.
    pub fn write_pdf(&self) -> Result<Vec<u8>, QuireError> {
        PdfWriter::new().write(&self.doc)
    }

    /// The laid-out tree as pretty-printed JSON, for inspection.
    pub fn layout_json(&self) -> Result<String, QuireError> {
        serde_json::to_string_pretty(&self.doc)
            .map_err(|e| QuireError::Render(format!("failed to serialize layout: {}", e)))
    }

    /// Find a widget by id, searching pages, headers and footers.
    pub fn get_by_id(&self, id: &str) -> Option<&Widget> {
        self.walk(|w| w.find_by_id(id))
    }

    /// Find the first widget of a kind, searching pages, headers and
    /// footers.
    pub fn get_by_kind(&self, kind: WidgetKind) -> Option<&Widget> {
        self.walk(|w| w.find_by_kind(kind))
    }

    fn walk<'a, F>(&'a self, f: F) -> Option<&'a Widget>
    where
        F: Fn(&'a Widget) -> Option<&'a Widget>,
    {
        for page in &self.doc.pages {
            if let Some(found) = f(&page.widget) {
                return Some(found);
            }
            if let Some(found) = page.header.as_ref().and_then(&f) {
                return Some(found);
            }
            if let Some(found) = page.footer.as_ref().and_then(&f) {
                return Some(found);
            }
        }
        None
    }
}
