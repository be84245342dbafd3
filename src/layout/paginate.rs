//! # Pagination
//!
//! Splits each authored page into one or more output pages. Children flow
//! top to bottom in computed-y order; a child that does not fit moves to a
//! cloned page, except tables, which split row by row. Table splits repeat
//! the header row, recompute alternate-row banding, and accumulate the
//! carry column across clones.

use crate::model::{Document, Page, Widget, WidgetKind};
use crate::style::Color;

/// Replace the document's pages with their paginated expansion.
pub(crate) fn split_pages(doc: &mut Document) {
    let mut pages = Vec::new();
    for page in doc.pages.drain(..) {
        pages.extend(split_page(page));
    }
    doc.pages = pages;
}

fn split_page(mut page: Page) -> Vec<Page> {
    let mut children = std::mem::take(&mut page.widget.children);
    children.sort_by(|a, b| {
        a.computed
            .outer
            .y
            .partial_cmp(&b.computed.outer.y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let page_bottom = page.widget.computed.inner.height;
    let gap = page.widget.gap;

    let mut pages: Vec<Page> = Vec::new();
    let mut current_y = 0.0f64;

    for i in 0..children.len() {
        if pages.is_empty() || current_y >= page_bottom {
            current_y = 0.0;
            pages.push(copy_page(&page, true));
            reset_y(&mut children[i..], 0.0, gap);
        }

        let bottom = current_y + children[i].computed.outer.height;
        let is_table = children[i].kind == WidgetKind::Table;
        let current_has_children = pages
            .last()
            .is_some_and(|p| !p.widget.children.is_empty());

        // A widget that does not fit in the space left moves to the next
        // page. Tables split row by row instead.
        if current_has_children && !is_table && bottom > page_bottom {
            current_y = 0.0;
            pages.push(copy_page(&page, false));
            reset_y(&mut children[i..], 0.0, gap);
        }

        let w = std::mem::take(&mut children[i]);

        if is_table && current_y + w.computed.outer.height + w.break_margin > page_bottom {
            let (last_height, page_break) = split_table(w, current_y, &page, &mut pages);
            current_y = last_height;
            if gap > 0.0 {
                current_y += gap;
            }
            if page_break {
                reset_y(&mut children[i + 1..], current_y, gap);
            }
        } else {
            let outer_height = w.computed.outer.height;
            open_page(&mut pages).widget.children.push(w);
            current_y += outer_height;
            if gap > 0.0 {
                current_y += gap;
            }
        }
    }

    pages
}

/// Restack widgets that have no declared y from `current_y` downwards.
fn reset_y(widgets: &mut [Widget], current_y: f64, gap: f64) {
    let mut y = current_y;
    for w in widgets {
        if w.y == 0.0 {
            w.computed.outer.y = y;
            w.sync_y_from_outer();
            y += w.computed.outer.height + gap;
        }
    }
}

/// Split a table into per-page clones, filling each page greedily with
/// whole rows. Returns the outer height of the last clone and whether any
/// page break happened.
///
/// The first clone stays on the page the table was placed on; every later
/// clone goes on a fresh page with a clone of the header row prepended
/// (when the table declared columns). On a fresh page the fill always
/// consumes at least one data row, so a row taller than an entire page is
/// placed alone and the split terminates.
fn split_table(
    table: Widget,
    current_y_in: f64,
    source_page: &Page,
    pages: &mut Vec<Page>,
) -> (f64, bool) {
    let mut current_y = current_y_in;

    let margin = table.margin_box();
    let inner_height = source_page.widget.computed.inner.height - margin.vertical();

    let mut current_table = table;
    let header_row = if !current_table.columns.is_empty() && !current_table.children.is_empty() {
        Some(current_table.children[0].clone())
    } else {
        None
    };

    let mut rows = std::mem::take(&mut current_table.children);
    let prototype = current_table.clone();

    let mut page_break = false;
    let mut page_index = 0usize;
    let mut carry_last: Option<f64> = None;
    let last_height;

    loop {
        // Count the rows that fit in the space left on this page.
        let mut index = 0usize;
        for (i, row) in rows.iter().enumerate() {
            let row_bottom = current_y + row.computed.outer.y + row.computed.outer.height;
            if row_bottom > inner_height {
                break;
            }
            index = i + 1;
        }

        // Forward progress: a fresh page must take at least one data row
        // beyond any leading header, even when it overflows.
        if current_y == 0.0 && !rows.is_empty() {
            let leading_headers = rows.iter().take_while(|r| row_is_header(r)).count();
            let min_index = (leading_headers + 1).min(rows.len());
            if index < min_index {
                index = min_index;
            }
        }

        let mut current_rows: Vec<Widget> = rows.drain(..index).collect();
        set_alternate_color(&mut current_rows, prototype.alternate_color);

        current_table.page_number = page_index;
        let total_height: f64 = current_rows.iter().map(|r| r.computed.outer.height).sum();
        current_table.children = current_rows;
        current_table.computed.inner.height = total_height;
        current_table.recalc_from_inner_height();

        if let Some(column) = prototype.carry_column {
            current_table.carry_last = carry_last;
            let next = carry_last.unwrap_or(0.0) + column_sum(&current_table.children, column);
            current_table.carry_next = Some(next);
            carry_last = Some(next);
        }

        if rows.is_empty() {
            // The last clone has no next page to carry to.
            current_table.carry_next = None;
            last_height = current_table.computed.outer.height;
            open_page(pages).widget.children.push(current_table);
            break;
        }

        open_page(pages).widget.children.push(current_table);

        // Continue on a fresh page with the header row repeated.
        current_table = prototype.clone();
        if let Some(header) = &header_row {
            rows.insert(0, header.clone());
        }
        current_table.computed.outer.y = 0.0;
        current_table.sync_y_from_outer();
        let mut y = 0.0;
        for row in &mut rows {
            row.computed.outer.y = y;
            row.sync_y_from_outer();
            y += row.computed.outer.height;
        }

        pages.push(copy_page(source_page, false));
        page_index += 1;
        current_table.page_number = page_index;
        current_y = 0.0;
        page_break = true;
    }

    (last_height, page_break)
}

fn row_is_header(row: &Widget) -> bool {
    row.children.first().is_some_and(|c| c.is_header)
}

fn open_page(pages: &mut [Page]) -> &mut Page {
    pages.last_mut().expect("a page is always open here")
}

/// Recompute alternate-row banding for a clone: data rows at even indexes
/// (the header is index 0) take the alternate color on cells without an
/// explicit background; odd ones have theirs cleared. Banding stays
/// consistent no matter where the split fell.
fn set_alternate_color(rows: &mut [Widget], alternate: Option<Color>) {
    let Some(alternate) = alternate else {
        return;
    };

    for (i, row) in rows.iter_mut().enumerate().skip(1) {
        if i % 2 == 0 {
            for cell in &mut row.children {
                if cell.background_color.is_none() {
                    cell.background_color = Some(alternate);
                }
            }
        } else {
            for cell in &mut row.children {
                cell.background_color = None;
            }
        }
    }
}

/// Sum the numeric values of a column over the given rows, skipping header
/// cells. Only single-line cells participate.
fn column_sum(rows: &[Widget], column: usize) -> f64 {
    let mut total = 0.0;
    for row in rows {
        let Some(cell) = row.children.get(column) else {
            continue;
        };
        if cell.is_header {
            continue;
        }
        if cell.value_lines.len() == 1 {
            if let Ok(value) = cell.value_lines[0].trim().parse::<f64>() {
                total += value;
            }
        }
    }
    total
}

/// Clone a page shell for pagination: style and computed geometry carry
/// over, children start empty, the reset flag only on request.
fn copy_page(page: &Page, copy_reset: bool) -> Page {
    let mut copy = Page {
        widget: Widget::new(WidgetKind::Page),
        header: page.header.clone(),
        footer: page.footer.clone(),
        reset_page_numbers: copy_reset && page.reset_page_numbers,
    };

    copy.widget.font_family = page.widget.font_family.clone();
    copy.widget.font_size = page.widget.font_size;
    copy.widget.line_height = page.widget.line_height;
    copy.widget.line_space = page.widget.line_space;
    copy.widget.color = page.widget.color;
    copy.widget.background_color = page.widget.background_color;
    copy.widget.padding = page.widget.padding;
    copy.widget.gap = page.widget.gap;
    copy.widget.direction = page.widget.direction;
    copy.widget.bold = page.widget.bold;
    copy.widget.align = page.widget.align.clone();
    copy.widget.stroke_color = page.widget.stroke_color;
    copy.widget.computed = page.widget.computed.clone();

    copy
}
