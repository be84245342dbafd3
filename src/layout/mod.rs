//! # Layout Engine
//!
//! The heart of quire: turns a parsed widget tree into absolutely
//! positioned boxes. The passes run in a fixed order, each one relying on
//! what the previous pass established:
//!
//! 1. **Computed style** — inherit font, color and boldness top-down so
//!    every widget can be measured in isolation.
//! 2. **Fixed sizes** — intrinsic sizes for text (measured line widths) and
//!    images (pixel dimensions, aspect-preserving scaling).
//! 3. **Widths** — distribute the parent's inner width along row/column
//!    flows; tables equalize their column widths afterwards.
//! 4. **Reflow** — wrap text now that widths are final.
//! 5. **Heights** — bottom-up, from text line counts and child stacks;
//!    tables equalize their row heights.
//! 6. **Positions** — relative cursor flow per container.
//!
//! Pagination ([`paginate`]) then splits overflowing pages, after which page
//! numbers are interpolated and all coordinates become absolute.
//!
//! Layout is a pure function of the input tree plus the injected
//! [`FontMetrics`]: running it twice produces identical output.

pub mod paginate;

use crate::error::QuireError;
use crate::font::{FontMetrics, BASE_MEASURE_SIZE};
use crate::image_loader;
use crate::model::{Computed, Direction, Document, Page, Widget, WidgetKind};
use crate::text;

/// Runs the layout passes over a document.
pub struct Layouter<'a> {
    metrics: &'a dyn FontMetrics,
}

impl<'a> Layouter<'a> {
    pub fn new(metrics: &'a dyn FontMetrics) -> Self {
        Self { metrics }
    }

    /// Lay out the whole document in place.
    pub fn run(&self, doc: &mut Document) -> Result<(), QuireError> {
        self.init_sizes(doc)?;
        self.set_positions(doc);
        paginate::split_pages(doc);
        self.set_page_numbers(doc);
        self.make_absolute(doc);
        Ok(())
    }

    // ── Pass 1+2+3+4+5: sizes ──────────────────────────────────────

    fn init_sizes(&self, doc: &mut Document) -> Result<(), QuireError> {
        init_computed(&mut doc.widget, None);
        let doc_computed = doc.widget.computed.clone();
        for page in &mut doc.pages {
            init_computed(&mut page.widget, Some(&doc_computed));
            self.init_page_size(page)?;
        }
        Ok(())
    }

    fn init_page_size(&self, page: &mut Page) -> Result<(), QuireError> {
        page.widget.apply_declared_width();
        page.widget.apply_declared_height();

        let page_computed = page.widget.computed.clone();
        let outer_width = page.widget.computed.outer.width;
        let inner_width = page.widget.computed.inner.width;

        // Headers and footers span the full page, not the content area.
        if let Some(header) = &mut page.header {
            init_computed(header, Some(&page_computed));
            self.init_widget_size(header, outer_width)?;
        }

        for child in &mut page.widget.children {
            self.init_widget_size(child, inner_width)?;
        }

        if let Some(footer) = &mut page.footer {
            init_computed(footer, Some(&page_computed));
            self.init_widget_size(footer, outer_width)?;
        }

        Ok(())
    }

    fn init_widget_size(&self, w: &mut Widget, inner_width: f64) -> Result<(), QuireError> {
        self.init_fixed_sizes(w);
        self.init_widths(w, inner_width)?;
        self.reflow_texts(w);
        self.init_heights(w);
        Ok(())
    }

    /// Bottom-up intrinsic sizes for text, images and table carry widgets.
    fn init_fixed_sizes(&self, w: &mut Widget) {
        match w.kind {
            WidgetKind::Image | WidgetKind::Qr => {
                self.init_image_size(w);
                w.apply_declared_width();
                return;
            }
            WidgetKind::Table => {
                let parent_computed = w.computed.clone();
                if let Some(header) = w.carry_header.as_deref_mut() {
                    init_computed(header, Some(&parent_computed));
                    self.init_value_size(header);
                }
                if let Some(footer) = w.carry_footer.as_deref_mut() {
                    init_computed(footer, Some(&parent_computed));
                    self.init_value_size(footer);
                }
            }
            _ => {
                if !w.value_lines.is_empty() {
                    self.init_value_size(w);
                }
            }
        }

        for child in &mut w.children {
            self.init_fixed_sizes(child);
        }
    }

    /// Intrinsic size of a text-bearing widget: the widest pre-split line
    /// at the baseline measuring size, one line-height per line.
    fn init_value_size(&self, w: &mut Widget) {
        if w.width == 0.0 {
            let mut max_width = 0.0f64;
            for line in &w.value_lines {
                let width = self
                    .metrics
                    .measure(&w.computed.font_family, BASE_MEASURE_SIZE, line);
                if width > max_width {
                    max_width = width;
                }
            }
            w.computed.border.width = max_width;
        } else {
            w.computed.border.width = w.width;
        }

        if w.computed.inner.height == 0.0 {
            w.computed.inner.height = w.value_lines.len() as f64 * w.computed.line_height;
        }

        w.apply_declared_width();
        w.recalc_from_inner_height();
    }

    fn init_image_size(&self, w: &mut Widget) {
        if w.img_width == 0.0 && w.width != 0.0 {
            w.img_width = w.width;
        }
        if w.img_height == 0.0 && w.computed.border.height != 0.0 {
            w.img_height = w.computed.border.height;
        }

        if w.img_width == 0.0 && w.img_height == 0.0 {
            if let Some((pw, ph)) = image_loader::intrinsic_dimensions(&w.bytes) {
                w.img_width = pw as f64;
                w.img_height = ph as f64;
            }
        } else if w.img_width != 0.0 && w.img_height == 0.0 {
            if let Some((pw, ph)) = image_loader::intrinsic_dimensions(&w.bytes) {
                if pw > 0 {
                    w.img_height = (w.img_width / pw as f64) * ph as f64;
                }
            }
        } else if w.img_height != 0.0 && w.img_width == 0.0 {
            if let Some((pw, ph)) = image_loader::intrinsic_dimensions(&w.bytes) {
                if ph > 0 {
                    w.img_width = (w.img_height / ph as f64) * pw as f64;
                }
            }
        }

        if w.img_width == 0.0 {
            w.img_width = 100.0;
        }
        if w.img_height == 0.0 {
            w.img_height = 100.0;
        }

        if w.img_max_height > 0.0 && w.img_height > w.img_max_height {
            let ratio = w.img_max_height / w.img_height;
            w.img_width *= ratio;
            w.img_height = w.img_max_height;
        }
        if w.img_max_width > 0.0 && w.img_width > w.img_max_width {
            let ratio = w.img_max_width / w.img_width;
            w.img_height *= ratio;
            w.img_width = w.img_max_width;
        }

        w.width = w.img_width;
        w.height = w.img_height;
        w.apply_declared_width();
        w.apply_declared_height();
    }

    /// Top-down width distribution.
    ///
    /// Auto-width widgets take the full parent width. In a row container the
    /// remaining width after declared children and gaps is split equally
    /// among the auto children; when the declared widths already meet or
    /// exceed the available width, everything is redistributed equally.
    fn init_widths(&self, w: &mut Widget, parent_width: f64) -> Result<(), QuireError> {
        if w.width == 0.0 {
            w.computed.outer.width = parent_width;
            w.recalc_from_outer_width();
        } else if w.computed.outer.width > parent_width {
            w.computed.outer.width = parent_width;
            w.recalc_from_outer_width();
        } else {
            w.apply_declared_width();
        }

        if w.children.is_empty() {
            return Ok(());
        }

        let inner_width = w.computed.inner.width;

        if w.computed.direction == Direction::Row {
            let mut sum_width: f64 = w.children.iter().map(|c| c.computed.outer.width).sum();
            let gap = w.gap * (w.children.len() - 1) as f64;
            if gap > 0.0 {
                sum_width += gap;
            }

            if sum_width < inner_width {
                let fixed_width: f64 = w
                    .children
                    .iter()
                    .filter(|c| c.width != 0.0)
                    .map(|c| c.computed.outer.width)
                    .sum();
                let auto_count = w.children.iter().filter(|c| c.width == 0.0).count();
                if auto_count > 0 {
                    let item_width = (inner_width - fixed_width - gap) / auto_count as f64;
                    for child in w.children.iter_mut().filter(|c| c.width == 0.0) {
                        self.init_widths(child, item_width)?;
                    }
                }
            } else {
                let item_width = (inner_width - gap) / w.children.len() as f64;
                for child in &mut w.children {
                    self.init_widths(child, item_width)?;
                }
            }
        } else {
            for child in &mut w.children {
                self.init_widths(child, inner_width)?;
            }
        }

        if w.kind == WidgetKind::Table {
            self.adjust_columns(w)?;
        }

        Ok(())
    }

    /// Equalize table column widths: each column takes the widest cell,
    /// then all columns scale so their sum matches the table's inner width.
    /// Cells re-wrap at their new widths.
    fn adjust_columns(&self, table: &mut Widget) -> Result<(), QuireError> {
        if table.children.is_empty() {
            return Ok(());
        }

        let column_count = table.children[0].children.len();
        let mut column_sizes = vec![0.0f64; column_count];

        for row in &table.children {
            for (i, size) in column_sizes.iter_mut().enumerate() {
                let cell = row.children.get(i).ok_or_else(|| {
                    QuireError::Layout(format!(
                        "invalid number of row cells, expected {}, got {}",
                        i + 1,
                        row.children.len()
                    ))
                })?;
                let cell_width = if cell.width != 0.0 {
                    cell.width
                } else {
                    outer_width_of(cell)
                };
                if cell_width > *size {
                    *size = cell_width;
                }
            }
        }

        let total: f64 = column_sizes.iter().sum();
        let ratio = table.computed.inner.width / total;
        if (ratio - 1.0).abs() < f64::EPSILON {
            return Ok(());
        }

        for size in &mut column_sizes {
            *size *= ratio;
        }

        for row in &mut table.children {
            for (i, cell) in row.children.iter_mut().enumerate().take(column_count) {
                cell.computed.outer.width = column_sizes[i];
                cell.recalc_from_outer_width();
                self.reflow_texts(cell);

                if !cell.align.is_empty() {
                    let align = cell.align.clone();
                    for item in &mut cell.children {
                        item.align = align.clone();
                    }
                }
            }
        }

        Ok(())
    }

    // ── Pass 4: text reflow ────────────────────────────────────────

    fn reflow_texts(&self, w: &mut Widget) {
        if !w.value_lines.is_empty() {
            self.wrap_text(w);
            return;
        }
        for child in &mut w.children {
            self.reflow_texts(child);
        }
    }

    fn wrap_text(&self, w: &mut Widget) {
        let buf = if !w.value.is_empty() {
            text::split_lines(
                self.metrics,
                &w.computed.font_family,
                &w.value,
                w.computed.font_size,
                w.computed.inner.width,
            )
        } else {
            Vec::new()
        };

        w.value_lines = if w.wrap {
            buf.into_iter().take(1).collect()
        } else {
            buf
        };

        if w.height == 0.0 {
            w.computed.inner.height = w.value_lines.len() as f64 * w.computed.line_height;
            w.recalc_from_inner_height();
        }
    }

    // ── Pass 5: heights ────────────────────────────────────────────

    fn init_heights(&self, w: &mut Widget) {
        for child in &mut w.children {
            self.init_heights(child);
        }

        if w.height == 0.0 {
            w.computed.outer.height = height_of(w);
            w.recalc_from_outer_height();
        } else {
            w.apply_declared_height();
        }

        if w.kind == WidgetKind::Table {
            self.adjust_rows_height(w);
        }
    }

    /// Equalize table row heights: every cell of a row takes the tallest
    /// cell's inner height, the row takes the tallest cell's outer height,
    /// the table the sum of its rows.
    fn adjust_rows_height(&self, table: &mut Widget) {
        let mut height = 0.0f64;

        for row in &mut table.children {
            let max_cell_height = items_inner_height(row);

            for cell in &mut row.children {
                cell.computed.inner.height = max_cell_height;
                cell.recalc_from_inner_height();
            }

            let row_height = row
                .children
                .iter()
                .map(|c| c.computed.outer.height)
                .fold(0.0, f64::max);
            row.computed.inner.height = row_height;
            row.recalc_from_inner_height();

            height += row_height;
        }

        table.computed.inner.height = height;
        table.recalc_from_inner_height();
    }

    // ── Pass 6: positions ──────────────────────────────────────────

    fn set_positions(&self, doc: &mut Document) {
        doc.widget.place_outer(0.0, 0.0);
        for page in &mut doc.pages {
            self.set_page_positions(page);
        }
    }

    fn set_page_positions(&self, page: &mut Page) {
        page.widget.place_outer(0.0, 0.0);

        if let Some(header) = &mut page.header {
            self.set_widget_position(header, 0.0, 0.0);
        }
        for child in &mut page.widget.children {
            self.set_widget_position(child, 0.0, 0.0);
        }
        if let Some(footer) = &mut page.footer {
            // Anchored to the page bottom during the absolute pass.
            self.set_widget_position(footer, 0.0, 0.0);
        }
    }

    /// Assign parent-inner-relative coordinates. A non-zero declared x/y is
    /// absolute within the parent's inner area; otherwise the flow cursor
    /// decides.
    fn set_widget_position(&self, w: &mut Widget, parent_x: f64, parent_y: f64) {
        let x = if w.x != 0.0 { w.x } else { parent_x };
        let y = if w.y != 0.0 { w.y } else { parent_y };
        w.place_outer(x, y);

        if w.children.is_empty() {
            return;
        }

        let gap = w.gap;
        let direction = w.computed.direction;
        let inner_width = w.computed.inner.width;
        let align_right = w.align == "right";

        let mut x = 0.0f64;
        let mut y = 0.0f64;

        if align_right && direction == Direction::Row {
            let mut width: f64 = w.children.iter().map(|c| c.computed.outer.width).sum();
            if gap > 0.0 {
                width += gap * (w.children.len() - 1) as f64;
            }
            x = inner_width - width;
        }

        for child in &mut w.children {
            if align_right && direction == Direction::Column {
                x = inner_width - child.computed.outer.width;
            }

            let child_x = if child.x != 0.0 { child.x } else { x };
            let child_y = if child.y != 0.0 { child.y } else { y };
            child.place_outer(child_x, child_y);

            let (outer_x, outer_y) = (child.computed.outer.x, child.computed.outer.y);
            self.set_widget_position(child, outer_x, outer_y);

            if direction == Direction::Column {
                y += child.computed.outer.height + gap;
            } else {
                x += child.computed.outer.width + gap;
            }
        }
    }

    // ── Page numbers ───────────────────────────────────────────────

    /// Partition output pages into reset groups and substitute `{page}` and
    /// `{pages}` in header and footer text.
    fn set_page_numbers(&self, doc: &mut Document) {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = Vec::new();

        for (i, page) in doc.pages.iter().enumerate() {
            if (page.reset_page_numbers || i == 0) && !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            current.push(i);
        }
        if !current.is_empty() {
            groups.push(current);
        }

        for group in groups {
            let total = group.len().to_string();
            for (i, &page_index) in group.iter().enumerate() {
                let number = (i + 1).to_string();
                let page = &mut doc.pages[page_index];
                if let Some(header) = &mut page.header {
                    interpolate_page_numbers(header, &number, &total);
                }
                if let Some(footer) = &mut page.footer {
                    interpolate_page_numbers(footer, &number, &total);
                }
            }
        }
    }

    // ── Absolute coordinates ───────────────────────────────────────

    fn make_absolute(&self, doc: &mut Document) {
        for page in &mut doc.pages {
            self.make_page_absolute(page);
        }
    }

    fn make_page_absolute(&self, page: &mut Page) {
        let x = page.widget.computed.inner.x;
        let y = page.widget.computed.inner.y;

        if let Some(header) = &mut page.header {
            make_widget_absolute(header, 0.0, 0.0);
        }

        for child in &mut page.widget.children {
            make_widget_absolute(child, x, y);
        }

        if let Some(footer) = &mut page.footer {
            let bottom =
                page.widget.computed.outer.height - footer.computed.outer.height - 1.0;
            make_widget_absolute(footer, 0.0, bottom);
        }
    }
}

/// Resolve the computed style for a widget and its subtree, inheriting from
/// the parent where not declared. Bold resolves the "Bold" font variant by
/// name suffix.
pub(crate) fn init_computed(w: &mut Widget, parent: Option<&Computed>) {
    w.computed = Computed::default();

    match parent {
        Some(p) => {
            w.computed.font_family = if !w.font_family.is_empty() {
                w.font_family.clone()
            } else {
                p.font_family.clone()
            };
            w.computed.font_size = if w.font_size != 0.0 {
                w.font_size
            } else {
                p.font_size
            };
            w.computed.line_height = if w.line_height != 0.0 {
                w.line_height
            } else {
                p.line_height
            };
            w.computed.color = w.color.or(p.color);
            w.computed.bold = w.bold || p.bold;
        }
        None => {
            w.computed.font_family = w.font_family.clone();
            w.computed.font_size = w.font_size;
            w.computed.line_height = w.line_height;
            w.computed.color = w.color;
            w.computed.bold = w.bold;
        }
    }

    if w.width != 0.0 {
        w.apply_declared_width();
    }
    if w.height != 0.0 {
        w.apply_declared_height();
    }

    w.computed.direction = w.direction.unwrap_or_default();

    if w.computed.bold && !w.computed.font_family.ends_with("Bold") {
        w.computed.font_family.push_str("Bold");
    }

    let parent_computed = w.computed.clone();
    for child in &mut w.children {
        init_computed(child, Some(&parent_computed));
    }
}

/// Outer width of a subtree: row containers sum children plus gaps, column
/// containers take the widest child.
fn outer_width_of(w: &Widget) -> f64 {
    if w.children.is_empty() {
        return w.computed.outer.width;
    }

    if w.computed.direction == Direction::Row {
        let mut width: f64 = w.children.iter().map(outer_width_of).sum();
        if w.gap > 0.0 {
            width += (w.children.len() - 1) as f64 * w.gap;
        }
        width
    } else {
        w.children.iter().map(outer_width_of).fold(0.0, f64::max)
    }
}

/// Outer height of a subtree. Containers contribute their content height
/// plus their own padding and margin; leaves their computed outer height.
fn height_of(w: &Widget) -> f64 {
    if w.children.is_empty() {
        return w.computed.outer.height;
    }

    let inner = if w.computed.direction == Direction::Column {
        let mut height: f64 = w.children.iter().map(height_of).sum();
        if w.gap > 0.0 {
            height += w.gap * (w.children.len() - 1) as f64;
        }
        height
    } else {
        w.children.iter().map(height_of).fold(0.0, f64::max)
    };

    let padding = w.padding_box();
    let margin = w.margin_box();
    inner + padding.vertical() + margin.vertical()
}

/// Combined inner height of a container's children: stacked for column
/// flow, the tallest child for row flow.
fn items_inner_height(w: &Widget) -> f64 {
    if w.computed.direction == Direction::Column {
        let mut height: f64 = w.children.iter().map(|c| c.computed.inner.height).sum();
        if w.gap > 0.0 && !w.children.is_empty() {
            height += w.gap * (w.children.len() - 1) as f64;
        }
        height
    } else {
        w.children
            .iter()
            .map(|c| c.computed.inner.height)
            .fold(0.0, f64::max)
    }
}

fn interpolate_page_numbers(w: &mut Widget, page: &str, pages: &str) {
    if !w.value_lines.is_empty() {
        for line in &mut w.value_lines {
            *line = line.replace("{page}", page).replace("{pages}", pages);
        }
        return;
    }
    for child in &mut w.children {
        interpolate_page_numbers(child, page, pages);
    }
}

fn make_widget_absolute(w: &mut Widget, parent_x: f64, parent_y: f64) {
    w.computed.outer.x += parent_x;
    w.computed.outer.y += parent_y;
    w.sync_x_from_outer();
    w.sync_y_from_outer();

    let (x, y) = (w.computed.inner.x, w.computed.inner.y);
    for child in &mut w.children {
        make_widget_absolute(child, x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::ApproxFontMetrics;
    use crate::parser;

    fn layout(input: &str) -> Document {
        let mut doc = parser::parse_document(input).unwrap();
        Layouter::new(&ApproxFontMetrics).run(&mut doc).unwrap();
        doc
    }

    #[test]
    fn test_style_inheritance() {
        let doc = layout(
            r##"<document fontSize="10" color="#123456">
                 <page><div><div id="inner">x</div></div></page>
               </document>"##,
        );
        let inner = doc.pages[0].widget.find_by_id("inner").unwrap();
        assert_eq!(inner.computed.font_size, 10.0);
        assert_eq!(inner.computed.font_family, "roboto");
        assert_eq!(
            inner.computed.color,
            crate::style::parse_color("#123456")
        );
    }

    #[test]
    fn test_bold_appends_font_suffix() {
        let doc = layout(r#"<div bold="true">x</div>"#);
        let div = &doc.pages[0].widget.children[0];
        assert!(div.computed.bold);
        assert_eq!(div.computed.font_family, "robotoBold");
    }

    #[test]
    fn test_bold_suffix_not_doubled() {
        let doc = layout(r#"<div fontFamily="interBold" bold="true">x</div>"#);
        assert_eq!(
            doc.pages[0].widget.children[0].computed.font_family,
            "interBold"
        );
    }

    #[test]
    fn test_direction_defaults_to_column() {
        let doc = layout("<div>x</div>");
        assert_eq!(
            doc.pages[0].widget.children[0].computed.direction,
            Direction::Column
        );
    }

    #[test]
    fn test_auto_child_takes_parent_inner_width() {
        let doc = layout("<div>Hello</div>");
        let div = &doc.pages[0].widget.children[0];
        assert_eq!(div.computed.outer.width, 595.0);
        assert_eq!(div.computed.inner.width, 595.0);
    }

    #[test]
    fn test_row_width_distribution_fixed_and_auto() {
        let doc = layout(
            r#"<page width="300" height="800">
                 <div id="row" direction="row">
                   <div id="fixed" width="100">a</div>
                   <div id="auto">b</div>
                 </div>
               </page>"#,
        );
        let page = &doc.pages[0];
        let fixed = page.widget.find_by_id("fixed").unwrap();
        let auto = page.widget.find_by_id("auto").unwrap();
        assert_eq!(fixed.computed.outer.width, 100.0);
        assert_eq!(auto.computed.outer.width, 200.0);
    }

    #[test]
    fn test_row_overfull_redistributes_equally() {
        let doc = layout(
            r#"<page width="300" height="800">
                 <div direction="row">
                   <div id="a" width="250">a</div>
                   <div id="b" width="250">b</div>
                 </div>
               </page>"#,
        );
        let a = doc.pages[0].widget.find_by_id("a").unwrap();
        let b = doc.pages[0].widget.find_by_id("b").unwrap();
        assert_eq!(a.computed.outer.width, 150.0);
        assert_eq!(b.computed.outer.width, 150.0);
    }

    #[test]
    fn test_text_height_from_line_count() {
        let doc = layout(r#"<div lineHeight="20">one\ntwo</div>"#.replace("\\n", "\n").as_str());
        let div = &doc.pages[0].widget.children[0];
        assert_eq!(div.value_lines.len(), 2);
        assert_eq!(div.computed.inner.height, 40.0);
    }

    #[test]
    fn test_column_heights_stack_with_gap() {
        let doc = layout(
            r#"<div gap="10">
                 <div height="30">a</div>
                 <div height="50">b</div>
               </div>"#,
        );
        let outer = &doc.pages[0].widget.children[0];
        assert_eq!(outer.computed.inner.height, 90.0);
    }

    #[test]
    fn test_row_height_is_max_child() {
        let doc = layout(
            r#"<div direction="row">
                 <div height="30">a</div>
                 <div height="50">b</div>
               </div>"#,
        );
        let outer = &doc.pages[0].widget.children[0];
        assert_eq!(outer.computed.inner.height, 50.0);
    }

    #[test]
    fn test_right_alignment_row() {
        let doc = layout(
            r#"<page width="300" height="800">
                 <div align="right" direction="row" gap="10">
                   <div id="a" width="50">a</div>
                   <div id="b" width="70">b</div>
                 </div>
               </page>"#,
        );
        let a = doc.pages[0].widget.find_by_id("a").unwrap();
        let b = doc.pages[0].widget.find_by_id("b").unwrap();
        assert_eq!(a.computed.outer.x, 170.0);
        assert_eq!(b.computed.outer.x, 230.0);
    }

    #[test]
    fn test_table_columns_scale_to_table_width() {
        let doc = layout(
            r#"<page width="400" height="800">
                 <table>
                   <row><cell>aa</cell><cell>bb</cell></row>
                   <row><cell>cc</cell><cell>dd</cell></row>
                 </table>
               </page>"#,
        );
        let table = &doc.pages[0].widget.children[0];
        let row = &table.children[0];
        let total: f64 = row.children.iter().map(|c| c.computed.outer.width).sum();
        assert!((total - 400.0).abs() < 1e-6);
    }

    #[test]
    fn test_table_row_cells_share_height() {
        let doc = layout(
            r#"<table>
                 <row><cell>one line</cell><cell>first
second
third</cell></row>
               </table>"#,
        );
        let row = &doc.pages[0].widget.children[0].children[0];
        let h0 = row.children[0].computed.inner.height;
        let h1 = row.children[1].computed.inner.height;
        assert_eq!(h0, h1);
        assert!(h0 > 0.0);
    }

    #[test]
    fn test_row_with_missing_cell_is_layout_error() {
        let mut doc = parser::parse_document(
            r#"<table>
                 <row><cell>a</cell><cell>b</cell></row>
                 <row><cell>only</cell></row>
               </table>"#,
        )
        .unwrap();
        let err = Layouter::new(&ApproxFontMetrics).run(&mut doc).unwrap_err();
        assert!(err.to_string().contains("row cells"));
    }

    #[test]
    fn test_image_fallback_dimensions() {
        let doc = layout("<image/>");
        let img = &doc.pages[0].widget.children[0];
        assert_eq!(img.img_width, 100.0);
        assert_eq!(img.img_height, 100.0);
        assert_eq!(img.computed.border.width, 100.0);
    }

    #[test]
    fn test_image_max_clamp_preserves_aspect() {
        let doc = layout(r#"<image imgWidth="200" imgHeight="100" imgMaxWidth="100"/>"#);
        let img = &doc.pages[0].widget.children[0];
        assert_eq!(img.img_width, 100.0);
        assert_eq!(img.img_height, 50.0);
    }

    #[test]
    fn test_box_triple_invariant_holds_everywhere() {
        let doc = layout(
            r#"<page>
                 <div padding="6" margin="4">outer
                   <div padding="2">inner text that wraps around a bit</div>
                 </div>
                 <table cellPadding="3">
                   <row><cell>a</cell><cell>b</cell></row>
                 </table>
               </page>"#,
        );
        fn check(w: &Widget) {
            let padding = w.padding_box();
            let margin = w.margin_box();
            assert!(
                (w.computed.outer.width - (w.computed.border.width + margin.horizontal())).abs()
                    < 1e-9
            );
            assert!(
                (w.computed.outer.height - (w.computed.border.height + margin.vertical())).abs()
                    < 1e-9
            );
            if w.computed.inner.width > 0.0 {
                assert!(
                    (w.computed.border.width
                        - (w.computed.inner.width + padding.horizontal()))
                    .abs()
                        < 1e-9
                );
            }
            assert!(w.computed.inner.width >= 0.0);
            assert!(w.computed.inner.height >= 0.0);
            for child in &w.children {
                check(child);
            }
        }
        for page in &doc.pages {
            for child in &page.widget.children {
                check(child);
            }
        }
    }

    #[test]
    fn test_page_number_interpolation_groups() {
        let doc = layout(
            r#"<document>
                 <page><footer>{page}/{pages}</footer><div>a</div></page>
                 <page resetPageNumbers="true"><footer>{page}/{pages}</footer><div>b</div></page>
                 <page><footer>{page}/{pages}</footer><div>c</div></page>
               </document>"#,
        );
        let footers: Vec<String> = doc
            .pages
            .iter()
            .map(|p| p.footer.as_ref().unwrap().value_lines[0].clone())
            .collect();
        assert_eq!(footers, vec!["1/1", "1/2", "2/2"]);
    }

    #[test]
    fn test_footer_anchored_to_page_bottom() {
        let doc = layout(r#"<page height="500"><footer height="20">f</footer><div>x</div></page>"#);
        let footer = doc.pages[0].footer.as_ref().unwrap();
        assert_eq!(footer.computed.outer.y, 500.0 - 20.0 - 1.0);
        assert_eq!(footer.computed.outer.x, 0.0);
    }

    #[test]
    fn test_deterministic_layout() {
        let input = r##"<document>
             <page><header>h {page}</header>
               <div direction="row"><div width="100">a</div><div>b</div></div>
               <table alternateColor="#eee">
                 <columns><column>A</column><column carry="true">B</column></columns>
                 <row><cell>x</cell><cell>1.5</cell></row>
                 <row><cell>y</cell><cell>2.5</cell></row>
               </table>
             </page>
           </document>"##;
        let a = serde_json::to_string(&layout(input)).unwrap();
        let b = serde_json::to_string(&layout(input)).unwrap();
        assert_eq!(a, b);
    }
}
