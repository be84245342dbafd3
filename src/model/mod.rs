//! # Document Model
//!
//! The widget tree produced by the parser and consumed by the layout engine.
//!
//! There is deliberately no inheritance hierarchy: every node is a [`Widget`]
//! with a [`WidgetKind`] tag plus optional kind-specific fields kept flat on
//! the struct (image bytes and dimensions, table carry state). Downstream
//! passes branch on the kind. The same box-model arithmetic applies to
//! every node, so a single struct is both simpler and faster to clone
//! during pagination.
//!
//! Declared geometry uses `0.0` as "auto/unset": a widget cannot be authored
//! at exactly its parent's origin via the `x`/`y` attributes. The computed
//! geometry lives in [`Computed`] as three concentric rectangles:
//!
//! ```text
//! outer  — includes margin
//! border — includes padding, excludes margin; paints background and border
//! inner  — the content area
//! ```

use serde::{Deserialize, Serialize};

use crate::style::{Border, BoxSpec, CellOption, Color};

/// Default page width in points (A4).
pub const A4_WIDTH: f64 = 595.0;
/// Default page height in points (A4).
pub const A4_HEIGHT: f64 = 842.0;

/// What kind of node a widget is. Layout and rendering branch on this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Document,
    Page,
    #[default]
    Div,
    Table,
    Row,
    Cell,
    Image,
    Qr,
}

/// Flow direction of a container's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Row,
    #[default]
    Column,
}

/// One rectangle of the computed box triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalcRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometry and style resolved by the layout passes.
///
/// Style fields are inherited top-down before any sizing happens, so every
/// widget can be measured without consulting its ancestors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Computed {
    pub outer: CalcRect,
    pub border: CalcRect,
    pub inner: CalcRect,
    pub font_family: String,
    pub font_size: f64,
    pub line_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    pub bold: bool,
    pub direction: Direction,
}

/// A column prototype declared via `<columns><column .../></columns>`.
///
/// Columns never appear in the laid-out tree themselves; they seed the
/// synthetic header row and mark the carry column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableColumn {
    #[serde(flatten)]
    pub widget: Widget,
    pub carry: bool,
}

/// A node in the document tree; the unit of layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Widget {
    pub kind: WidgetKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    // Declared geometry; zero means auto/unset.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<BoxSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<BoxSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    pub gap: f64,

    // Declared style.
    pub line_height: f64,
    pub line_space: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub font_family: String,
    pub font_size: f64,
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub hidden: bool,
    pub wrap: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub align: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<CellOption>,

    // Content.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_lines: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Widget>,

    // Table extensions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<TableColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry_last: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry_next: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry_header: Option<Box<Widget>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry_footer: Option<Box<Widget>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_color: Option<Color>,
    pub break_margin: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_padding: Option<BoxSpec>,
    pub is_header: bool,
    pub page_number: usize,

    // Image extensions.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub img_width: f64,
    pub img_height: f64,
    pub img_max_width: f64,
    pub img_max_height: f64,

    pub computed: Computed,
}

/// A page in the document. The header and footer live outside the normal
/// flow and render in page-fixed positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    #[serde(flatten)]
    pub widget: Widget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Widget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Widget>,
    pub reset_page_numbers: bool,
}

/// The root of a parsed and laid-out document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    #[serde(flatten)]
    pub widget: Widget,
    pub pages: Vec<Page>,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn margin_box(&self) -> BoxSpec {
        self.margin.unwrap_or_default()
    }

    pub fn padding_box(&self) -> BoxSpec {
        self.padding.unwrap_or_default()
    }

    // ── Box triple conversions ─────────────────────────────────────
    //
    // The triple is over-determined: any one rectangle plus padding and
    // margin fixes the other two. Each helper drives the derivation from a
    // different starting point. Inner sizes clamp at zero when padding
    // exceeds the available space.

    /// Derive inner and outer widths from the border width, seeding the
    /// border width from the declared width when still unset.
    pub fn apply_declared_width(&mut self) {
        if self.computed.border.width == 0.0 {
            self.computed.border.width = self.width;
        }
        let padding = self.padding_box();
        let margin = self.margin_box();
        self.computed.inner.width = (self.computed.border.width - padding.horizontal()).max(0.0);
        self.computed.outer.width = self.computed.border.width + margin.horizontal();
    }

    /// Derive inner and outer heights from the border height, seeding the
    /// border height from the declared height when still unset.
    pub fn apply_declared_height(&mut self) {
        if self.computed.border.height == 0.0 {
            self.computed.border.height = self.height;
        }
        let padding = self.padding_box();
        let margin = self.margin_box();
        self.computed.inner.height = (self.computed.border.height - padding.vertical()).max(0.0);
        self.computed.outer.height = self.computed.border.height + margin.vertical();
    }

    /// Derive border and inner widths from the outer width.
    pub fn recalc_from_outer_width(&mut self) {
        let padding = self.padding_box();
        let margin = self.margin_box();
        self.computed.border.width = self.computed.outer.width - margin.horizontal();
        self.computed.inner.width = (self.computed.border.width - padding.horizontal()).max(0.0);
    }

    /// Derive border and inner heights from the outer height.
    pub fn recalc_from_outer_height(&mut self) {
        let padding = self.padding_box();
        let margin = self.margin_box();
        self.computed.border.height = self.computed.outer.height - margin.vertical();
        self.computed.inner.height = (self.computed.border.height - padding.vertical()).max(0.0);
    }

    /// Derive border and outer heights from the inner height.
    pub fn recalc_from_inner_height(&mut self) {
        let padding = self.padding_box();
        let margin = self.margin_box();
        self.computed.border.height = self.computed.inner.height + padding.vertical();
        self.computed.outer.height = self.computed.border.height + margin.vertical();
    }

    /// Position the outer box and derive the border and inner positions.
    pub fn place_outer(&mut self, x: f64, y: f64) {
        self.computed.outer.x = x;
        self.computed.outer.y = y;
        self.sync_x_from_outer();
        self.sync_y_from_outer();
    }

    /// Re-derive border and inner x from the outer x.
    pub fn sync_x_from_outer(&mut self) {
        let padding = self.padding_box();
        let margin = self.margin_box();
        self.computed.border.x = self.computed.outer.x + margin.left;
        self.computed.inner.x = self.computed.border.x + padding.left;
    }

    /// Re-derive border and inner y from the outer y.
    pub fn sync_y_from_outer(&mut self) {
        let padding = self.padding_box();
        let margin = self.margin_box();
        self.computed.border.y = self.computed.outer.y + margin.top;
        self.computed.inner.y = self.computed.border.y + padding.top;
    }

    /// Depth-first lookup by widget id.
    pub fn find_by_id(&self, id: &str) -> Option<&Widget> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    /// Depth-first lookup by widget kind.
    pub fn find_by_kind(&self, kind: WidgetKind) -> Option<&Widget> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_kind(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(top: f64, right: f64, bottom: f64, left: f64) -> BoxSpec {
        BoxSpec {
            top,
            right,
            bottom,
            left,
        }
    }

    #[test]
    fn test_declared_width_round_trip() {
        let mut w = Widget::new(WidgetKind::Div);
        w.width = 100.0;
        w.padding = Some(boxed(0.0, 10.0, 0.0, 10.0));
        w.margin = Some(boxed(0.0, 5.0, 0.0, 5.0));
        w.apply_declared_width();

        assert_eq!(w.computed.border.width, 100.0);
        assert_eq!(w.computed.inner.width, 80.0);
        assert_eq!(w.computed.outer.width, 110.0);
    }

    #[test]
    fn test_inner_width_clamps_at_zero() {
        let mut w = Widget::new(WidgetKind::Div);
        w.width = 10.0;
        w.padding = Some(BoxSpec::uniform(20.0));
        w.apply_declared_width();
        assert_eq!(w.computed.inner.width, 0.0);
    }

    #[test]
    fn test_recalc_from_outer_width() {
        let mut w = Widget::new(WidgetKind::Div);
        w.padding = Some(BoxSpec::uniform(4.0));
        w.margin = Some(BoxSpec::uniform(6.0));
        w.computed.outer.width = 120.0;
        w.recalc_from_outer_width();
        assert_eq!(w.computed.border.width, 108.0);
        assert_eq!(w.computed.inner.width, 100.0);
    }

    #[test]
    fn test_recalc_from_inner_height() {
        let mut w = Widget::new(WidgetKind::Div);
        w.padding = Some(BoxSpec::uniform(3.0));
        w.margin = Some(BoxSpec::uniform(2.0));
        w.computed.inner.height = 50.0;
        w.recalc_from_inner_height();
        assert_eq!(w.computed.border.height, 56.0);
        assert_eq!(w.computed.outer.height, 60.0);
    }

    #[test]
    fn test_place_outer_derives_positions() {
        let mut w = Widget::new(WidgetKind::Div);
        w.padding = Some(boxed(2.0, 0.0, 0.0, 4.0));
        w.margin = Some(boxed(1.0, 0.0, 0.0, 3.0));
        w.place_outer(10.0, 20.0);
        assert_eq!(w.computed.outer.x, 10.0);
        assert_eq!(w.computed.border.x, 13.0);
        assert_eq!(w.computed.inner.x, 17.0);
        assert_eq!(w.computed.outer.y, 20.0);
        assert_eq!(w.computed.border.y, 21.0);
        assert_eq!(w.computed.inner.y, 23.0);
    }

    #[test]
    fn test_find_by_id() {
        let mut root = Widget::new(WidgetKind::Div);
        let mut child = Widget::new(WidgetKind::Table);
        child.id = "items".to_string();
        root.children.push(child);
        assert!(root.find_by_id("items").is_some());
        assert!(root.find_by_id("missing").is_none());
        assert_eq!(
            root.find_by_kind(WidgetKind::Table).map(|w| w.kind),
            Some(WidgetKind::Table)
        );
    }
}
