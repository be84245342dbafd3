//! # Widget Tree Parser
//!
//! Walks the XML element tree and produces a typed [`Document`]. This stage
//! owns all attribute semantics: defaults and inheritance of document-level
//! style, box/border shorthands, alignment flags, table column rules, and
//! eager decoding of image and QR data.
//!
//! Unknown attributes are ignored for forward compatibility; unknown
//! elements are structure errors.

use crate::error::QuireError;
use crate::image_loader;
use crate::model::{Direction, Document, Page, TableColumn, Widget, WidgetKind, A4_HEIGHT, A4_WIDTH};
use crate::style::{self, Border, BoxSpec, CellOption};
use crate::xml::{self, XmlElement, XmlNode};

/// Parse an XML document string into a widget tree.
///
/// A root element that is neither `document` nor `page` is wrapped in an
/// implicit `document`/`page`; a `page` root gets an implicit `document`.
pub fn parse_document(input: &str) -> Result<Document, QuireError> {
    let root = wrap_implicit_root(xml::parse(input)?);

    let mut doc = Document::default();
    doc.widget.kind = WidgetKind::Document;
    doc.widget.color = style::parse_color(root.attr_or("color", "#222"));
    doc.widget.font_family = root.attr_or("fontFamily", "roboto").to_string();
    doc.widget.font_size = parse_float_attr(&root, "fontSize", 14.0);
    doc.widget.line_height = parse_float_attr(&root, "lineHeight", doc.widget.font_size);
    doc.widget.line_space = parse_float_attr(&root, "lineSpace", doc.widget.font_size / 5.0);
    doc.widget.width = parse_float_attr(&root, "width", A4_WIDTH);
    doc.widget.height = parse_float_attr(&root, "height", A4_HEIGHT);

    for child in root.child_elements() {
        let page = parse_page(child, &doc)?;
        doc.pages.push(page);
    }

    Ok(doc)
}

fn wrap_implicit_root(root: XmlElement) -> XmlElement {
    if root.name == "document" {
        return root;
    }
    let mut document = XmlElement::new("document");
    if root.name == "page" {
        document.children.push(XmlNode::Element(root));
    } else {
        let mut page = XmlElement::new("page");
        page.children.push(XmlNode::Element(root));
        document.children.push(XmlNode::Element(page));
    }
    document
}

fn parse_page(el: &XmlElement, doc: &Document) -> Result<Page, QuireError> {
    if el.name != "page" {
        return Err(QuireError::Parse(format!(
            "expected page element, got {}",
            el.name
        )));
    }

    let mut page = Page {
        widget: parse_widget(el, WidgetKind::Page)?,
        ..Default::default()
    };

    if page.widget.width == 0.0 {
        page.widget.width = doc.widget.width;
    }
    if page.widget.height == 0.0 {
        page.widget.height = doc.widget.height;
    }
    page.reset_page_numbers = parse_bool_attr(el, "resetPageNumbers", false);

    for node in &el.children {
        match node {
            XmlNode::Text(text) => {
                if !text.trim().is_empty() {
                    // Bare text at page level becomes an implicit div.
                    let mut div = Widget::new(WidgetKind::Div);
                    div.value = text.clone();
                    div.value_lines = split_clean(text);
                    div.option = page.widget.option;
                    page.widget.children.push(div);
                }
            }
            XmlNode::Element(child) => match child.name.as_str() {
                "header" => page.header = Some(parse_div(child)?),
                "footer" => page.footer = Some(parse_div(child)?),
                _ => page.widget.children.push(parse_element(child)?),
            },
        }
    }

    Ok(page)
}

fn parse_element(el: &XmlElement) -> Result<Widget, QuireError> {
    match el.name.as_str() {
        "div" => parse_div(el),
        "image" => parse_image(el),
        "qr" => parse_qr(el),
        "table" => parse_table(el),
        "header" | "footer" => Err(QuireError::Parse(format!(
            "<{}> must be directly inside <page>",
            el.name
        ))),
        _ => Err(QuireError::Parse(format!("unknown widget type: {}", el.name))),
    }
}

fn parse_div(el: &XmlElement) -> Result<Widget, QuireError> {
    let mut div = parse_widget(el, WidgetKind::Div)?;

    for node in &el.children {
        match node {
            XmlNode::Text(text) => {
                if !text.trim().is_empty() {
                    div.value = text.clone();
                    div.value_lines = split_clean(text);
                }
            }
            XmlNode::Element(child) => div.children.push(parse_element(child)?),
        }
    }

    Ok(div)
}

// ── Tables ─────────────────────────────────────────────────────────

fn parse_table(el: &XmlElement) -> Result<Widget, QuireError> {
    let mut table = parse_widget(el, WidgetKind::Table)?;

    if table.padding.is_some() {
        return Err(QuireError::Parse(
            "tables cannot have padding, use cellPadding instead".to_string(),
        ));
    }

    table.cell_border = parse_border(el, "cellBorder");
    table.cell_padding = parse_padding(el, "cellPadding");
    table.break_margin = parse_float_attr(el, "breakMargin", 0.0);
    // The carry column can be named directly; a `<column carry="true">`
    // declaration overrides it.
    table.carry_column = match el.attr("carryColumn") {
        Some(v) if !v.is_empty() && v != "none" => v.trim().parse::<usize>().ok(),
        _ => None,
    };
    table.alternate_color = el
        .attr("alternateColor")
        .and_then(style::parse_color);

    let mut any_row = false;
    for child in el.child_elements() {
        match child.name.as_str() {
            "carryHeader" => table.carry_header = Some(Box::new(parse_div(child)?)),
            "carryFooter" => table.carry_footer = Some(Box::new(parse_div(child)?)),
            "columns" => parse_table_columns(child, &mut table)?,
            "row" => {
                if !any_row {
                    any_row = true;
                    add_table_header_row(&mut table);
                }
                let row = parse_table_row(child, &table)?;
                table.children.push(row);
            }
            _ => {}
        }
    }

    if table.alternate_color.is_some() {
        apply_alternate_color(&mut table);
    }

    Ok(table)
}

fn parse_table_columns(el: &XmlElement, table: &mut Widget) -> Result<(), QuireError> {
    for child in el.child_elements().filter(|c| c.name == "column") {
        let mut col = parse_widget(child, WidgetKind::Cell)?;
        col.direction = Some(Direction::Row);
        if col.padding.is_none() {
            col.padding = table.cell_padding;
        }
        if col.border.is_none() {
            col.border = table.cell_border;
        }
        let text = child.text();
        if !text.trim().is_empty() {
            col.value = text.clone();
            col.value_lines = split_clean(&text);
        }

        let carry = parse_bool_attr(child, "carry", false);
        if carry {
            table.carry_column = Some(table.columns.len());
        }
        table.columns.push(TableColumn { widget: col, carry });
    }
    Ok(())
}

/// When a table declares `<columns>`, the first `<row>` triggers a synthetic
/// bold header row built from the column prototypes.
fn add_table_header_row(table: &mut Widget) {
    if table.columns.is_empty() {
        return;
    }

    let mut row = Widget::new(WidgetKind::Row);
    row.direction = Some(Direction::Row);

    for col in &table.columns {
        let mut cell = col.widget.clone();
        cell.kind = WidgetKind::Cell;
        cell.is_header = true;
        cell.bold = true;
        row.children.push(cell);
    }

    table.children.push(row);
}

fn parse_table_row(el: &XmlElement, table: &Widget) -> Result<Widget, QuireError> {
    let mut row = parse_widget(el, WidgetKind::Row)?;
    row.direction = Some(Direction::Row);

    for (index, child) in el
        .child_elements()
        .filter(|c| c.name == "cell")
        .enumerate()
    {
        row.children.push(parse_table_cell(child, table, index)?);
    }

    Ok(row)
}

fn parse_table_cell(
    el: &XmlElement,
    table: &Widget,
    index: usize,
) -> Result<Widget, QuireError> {
    let mut cell = parse_widget(el, WidgetKind::Cell)?;
    cell.direction = Some(Direction::Row);

    if let Some(column) = table.columns.get(index) {
        cell.align = column.widget.align.clone();
        if cell.option.is_none() {
            cell.option = column.widget.option;
        }
    }
    if cell.padding.is_none() {
        cell.padding = table.cell_padding;
    }
    if cell.border.is_none() {
        cell.border = table.cell_border;
    }

    for node in &el.children {
        match node {
            XmlNode::Text(text) => {
                if !text.trim().is_empty() {
                    cell.value = text.clone();
                    cell.value_lines = split_clean(text);
                }
            }
            XmlNode::Element(child) => cell.children.push(parse_element(child)?),
        }
    }

    Ok(cell)
}

/// Even-indexed data rows (the row after the header, then every other one)
/// get the alternate color on cells without an explicit background.
fn apply_alternate_color(table: &mut Widget) {
    let alternate = table.alternate_color;
    for (i, row) in table.children.iter_mut().enumerate().skip(1) {
        if i % 2 == 0 {
            for cell in &mut row.children {
                if cell.background_color.is_none() {
                    cell.background_color = alternate;
                }
            }
        }
    }
}

// ── Images ─────────────────────────────────────────────────────────

fn parse_image(el: &XmlElement) -> Result<Widget, QuireError> {
    let mut img = parse_widget(el, WidgetKind::Image)?;

    img.img_width = parse_float_attr(el, "imgWidth", 0.0);
    img.img_height = parse_float_attr(el, "imgHeight", 0.0);
    img.img_max_width = parse_float_attr(el, "imgMaxWidth", 0.0);
    img.img_max_height = parse_float_attr(el, "imgMaxHeight", 0.0);

    if img.width == 0.0 && img.img_width > 0.0 {
        img.width = img.img_width;
    }
    if img.height == 0.0 && img.img_height > 0.0 {
        img.height = img.img_height;
    }

    if let Some(data) = el.attr("data") {
        if !data.is_empty() {
            img.bytes = image_loader::decode_base64(data)?;
        }
    }

    Ok(img)
}

fn parse_qr(el: &XmlElement) -> Result<Widget, QuireError> {
    let mut qr = parse_image(el)?;
    qr.kind = WidgetKind::Qr;

    let code = el.attr_or("code", "");
    let level = el.attr_or("level", "high");
    let mut size = parse_float_attr(el, "size", 150.0);
    if size == 0.0 {
        size = 150.0;
    }

    qr.width = size;
    qr.height = size;

    if !code.is_empty() {
        qr.bytes = image_loader::generate_qr_png(code, level, size as u32)?;
        qr.img_width = size;
        qr.img_height = size;
    }

    Ok(qr)
}

// ── Common attributes ──────────────────────────────────────────────

fn parse_widget(el: &XmlElement, kind: WidgetKind) -> Result<Widget, QuireError> {
    let mut w = Widget::new(kind);

    w.id = el.attr_or("id", "").to_string();
    w.x = parse_float_attr(el, "x", 0.0);
    w.y = parse_float_attr(el, "y", 0.0);
    w.width = parse_float_attr(el, "width", 0.0);
    w.height = parse_float_attr(el, "height", 0.0);
    w.line_height = parse_float_attr(el, "lineHeight", 0.0);
    w.gap = parse_float_attr(el, "gap", 0.0);

    w.direction = match el.attr("direction") {
        Some("row") => Some(Direction::Row),
        Some("column") => Some(Direction::Column),
        _ => None,
    };

    w.hidden = parse_bool_attr(el, "hidden", false);
    w.wrap = parse_bool_attr(el, "wrap", false);

    w.padding = parse_padding(el, "padding");
    w.margin = parse_margin(el);

    parse_align(el, &mut w);
    parse_font(el, &mut w);

    w.border = parse_border(el, "border");

    w.background_color = el.attr("backgroundColor").and_then(style::parse_color);
    w.color = el.attr("color").and_then(style::parse_color);
    w.stroke_color = el.attr("strokeColor").and_then(style::parse_color);

    Ok(w)
}

fn parse_align(el: &XmlElement, w: &mut Widget) {
    w.align = el.attr_or("align", "").to_string();
    if w.align.is_empty() {
        return;
    }
    let opt = w.option.get_or_insert(CellOption::default());
    opt.align = style::parse_align_mask(&w.align, 0);
}

fn parse_font(el: &XmlElement, w: &mut Widget) {
    if let Some(v) = el.attr("fontFamily") {
        if !v.is_empty() {
            w.font_family = v.to_string();
        }
    }
    if let Some(v) = el.attr("fontSize") {
        if !v.is_empty() {
            w.font_size = style::parse_float(v);
        }
    }
    if let Some(v) = el.attr("bold") {
        if !v.is_empty() {
            w.bold = parse_bool(v);
        }
    }
}

/// Box shorthand with per-side overrides. The side attributes only apply
/// when the base attribute is present.
fn parse_padding(el: &XmlElement, name: &str) -> Option<BoxSpec> {
    let v = el.attr(name)?;
    if v.is_empty() {
        return None;
    }

    let mut spec = style::parse_box(v);
    if let Some(v) = el.attr(&format!("{}Top", name)) {
        spec.top = style::parse_float(v);
    }
    if let Some(v) = el.attr(&format!("{}Right", name)) {
        spec.right = style::parse_float(v);
    }
    if let Some(v) = el.attr(&format!("{}Bottom", name)) {
        spec.bottom = style::parse_float(v);
    }
    if let Some(v) = el.attr(&format!("{}Left", name)) {
        spec.left = style::parse_float(v);
    }
    Some(spec)
}

/// Margin differs from padding: per-side attributes create the box even
/// without the shorthand.
fn parse_margin(el: &XmlElement) -> Option<BoxSpec> {
    let mut margin = el
        .attr("margin")
        .filter(|v| !v.is_empty())
        .map(style::parse_box);

    if let Some(v) = el.attr("marginTop") {
        margin.get_or_insert_with(BoxSpec::default).top = style::parse_float(v);
    }
    if let Some(v) = el.attr("marginRight") {
        margin.get_or_insert_with(BoxSpec::default).right = style::parse_float(v);
    }
    if let Some(v) = el.attr("marginBottom") {
        margin.get_or_insert_with(BoxSpec::default).bottom = style::parse_float(v);
    }
    if let Some(v) = el.attr("marginLeft") {
        margin.get_or_insert_with(BoxSpec::default).left = style::parse_float(v);
    }

    margin
}

fn parse_border(el: &XmlElement, name: &str) -> Option<Border> {
    let radius = parse_float_attr(el, &format!("{}Radius", name), 0.0);

    let mut border = el.attr(name).filter(|v| !v.is_empty()).map(|v| {
        let side = style::parse_line_style(v);
        Border {
            top: Some(side),
            right: Some(side),
            bottom: Some(side),
            left: Some(side),
            radius,
        }
    });

    if let Some(v) = el.attr(&format!("{}Top", name)) {
        border.get_or_insert(Border { radius, ..Default::default() }).top =
            Some(style::parse_line_style(v));
    }
    if let Some(v) = el.attr(&format!("{}Right", name)) {
        border.get_or_insert(Border { radius, ..Default::default() }).right =
            Some(style::parse_line_style(v));
    }
    if let Some(v) = el.attr(&format!("{}Bottom", name)) {
        border.get_or_insert(Border { radius, ..Default::default() }).bottom =
            Some(style::parse_line_style(v));
    }
    if let Some(v) = el.attr(&format!("{}Left", name)) {
        border.get_or_insert(Border { radius, ..Default::default() }).left =
            Some(style::parse_line_style(v));
    }

    if radius > 0.0 && border.is_none() {
        border = Some(Border { radius, ..Default::default() });
    }

    border
}

/// Split text on newlines, trimming each line and dropping blanks.
fn split_clean(s: &str) -> Vec<String> {
    s.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_float_attr(el: &XmlElement, name: &str, default: f64) -> f64 {
    match el.attr(name) {
        Some(v) if !v.is_empty() => style::parse_float(v),
        _ => default,
    }
}

fn parse_bool_attr(el: &XmlElement, name: &str, default: bool) -> bool {
    match el.attr(name) {
        Some(v) if !v.is_empty() => parse_bool(v),
        _ => default,
    }
}

fn parse_bool(v: &str) -> bool {
    v == "true" || v == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, RIGHT};

    #[test]
    fn test_document_defaults() {
        let doc = parse_document("<document><page/></document>").unwrap();
        assert_eq!(doc.widget.font_family, "roboto");
        assert_eq!(doc.widget.font_size, 14.0);
        assert_eq!(doc.widget.line_height, 14.0);
        assert_eq!(doc.widget.line_space, 14.0 / 5.0);
        assert_eq!(doc.widget.width, 595.0);
        assert_eq!(doc.widget.height, 842.0);
        assert_eq!(doc.widget.color, Some(Color::rgb(0x22, 0x22, 0x22)));
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].widget.width, 595.0);
        assert_eq!(doc.pages[0].widget.height, 842.0);
    }

    #[test]
    fn test_implicit_document_and_page() {
        let doc = parse_document("<div>Hi</div>").unwrap();
        assert_eq!(doc.pages.len(), 1);
        let div = &doc.pages[0].widget.children[0];
        assert_eq!(div.kind, WidgetKind::Div);
        assert_eq!(div.value_lines, vec!["Hi"]);
    }

    #[test]
    fn test_implicit_document_for_page_root() {
        let doc = parse_document("<page><div>Hi</div></page>").unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].widget.children.len(), 1);
    }

    #[test]
    fn test_div_text_and_value_lines() {
        let doc = parse_document("<div>one\n two \n\nthree</div>").unwrap();
        let div = &doc.pages[0].widget.children[0];
        assert_eq!(div.value_lines, vec!["one", "two", "three"]);
        assert!(div.value.contains("one"));
    }

    #[test]
    fn test_unknown_tag_is_error() {
        assert!(parse_document("<document><page><widget/></page></document>").is_err());
    }

    #[test]
    fn test_non_page_in_document_is_error() {
        assert!(parse_document("<document><div/></document>").is_err());
    }

    #[test]
    fn test_header_footer_slots() {
        let doc = parse_document(
            "<page><header>H</header><div>body</div><footer>F</footer></page>",
        )
        .unwrap();
        let page = &doc.pages[0];
        assert_eq!(page.header.as_ref().unwrap().value_lines, vec!["H"]);
        assert_eq!(page.footer.as_ref().unwrap().value_lines, vec!["F"]);
        assert_eq!(page.widget.children.len(), 1);
    }

    #[test]
    fn test_header_outside_page_is_error() {
        assert!(parse_document("<div><header>H</header></div>").is_err());
    }

    #[test]
    fn test_table_with_padding_is_error() {
        let err = parse_document(r#"<table padding="4"><row><cell>x</cell></row></table>"#)
            .unwrap_err();
        assert!(err.to_string().contains("cellPadding"));
    }

    #[test]
    fn test_table_synthetic_header_row() {
        let doc = parse_document(
            r#"<table>
                 <columns>
                   <column>Name</column>
                   <column carry="true">Total</column>
                 </columns>
                 <row><cell>a</cell><cell>1</cell></row>
               </table>"#,
        )
        .unwrap();
        let table = &doc.pages[0].widget.children[0];
        assert_eq!(table.carry_column, Some(1));
        assert_eq!(table.children.len(), 2);

        let header = &table.children[0];
        assert_eq!(header.children.len(), 2);
        assert!(header.children[0].is_header);
        assert!(header.children[0].bold);
        assert_eq!(header.children[0].value_lines, vec!["Name"]);

        let data = &table.children[1];
        assert!(!data.children[0].is_header);
        assert_eq!(data.children[1].value_lines, vec!["1"]);
    }

    #[test]
    fn test_table_alternate_color_on_even_rows() {
        let doc = parse_document(
            r##"<table alternateColor="#eee">
                 <columns><column>A</column></columns>
                 <row><cell>r1</cell></row>
                 <row><cell>r2</cell></row>
                 <row><cell>r3</cell></row>
               </table>"##,
        )
        .unwrap();
        let table = &doc.pages[0].widget.children[0];
        // rows: 0 header, 1..3 data; indexes 2 and 4 would get color.
        assert!(table.children[1].children[0].background_color.is_none());
        assert_eq!(
            table.children[2].children[0].background_color,
            Some(Color::rgb(0xee, 0xee, 0xee))
        );
        assert!(table.children[3].children[0].background_color.is_none());
    }

    #[test]
    fn test_cells_inherit_cell_padding_and_border() {
        let doc = parse_document(
            r#"<table cellPadding="4" cellBorder="solid 1 #000">
                 <row><cell>x</cell></row>
               </table>"#,
        )
        .unwrap();
        let cell = &doc.pages[0].widget.children[0].children[0].children[0];
        assert_eq!(cell.padding, Some(BoxSpec::uniform(4.0)));
        assert!(cell.border.is_some());
    }

    #[test]
    fn test_align_sets_string_and_mask() {
        let doc = parse_document(r#"<div align="right"/>"#).unwrap();
        let div = &doc.pages[0].widget.children[0];
        assert_eq!(div.align, "right");
        assert_eq!(div.option.unwrap().align, RIGHT);
    }

    #[test]
    fn test_padding_side_overrides() {
        let doc = parse_document(r#"<div padding="4" paddingLeft="9"/>"#).unwrap();
        let div = &doc.pages[0].widget.children[0];
        let padding = div.padding.unwrap();
        assert_eq!(padding.left, 9.0);
        assert_eq!(padding.top, 4.0);
    }

    #[test]
    fn test_padding_side_without_base_ignored() {
        let doc = parse_document(r#"<div paddingLeft="9"/>"#).unwrap();
        assert!(doc.pages[0].widget.children[0].padding.is_none());
    }

    #[test]
    fn test_margin_side_without_base_applies() {
        let doc = parse_document(r#"<div marginTop="7"/>"#).unwrap();
        let margin = doc.pages[0].widget.children[0].margin.unwrap();
        assert_eq!(margin.top, 7.0);
        assert_eq!(margin.left, 0.0);
    }

    #[test]
    fn test_border_shorthand_and_radius() {
        let doc = parse_document(r#"<div border="solid 2 #333" borderRadius="3"/>"#).unwrap();
        let border = doc.pages[0].widget.children[0].border.unwrap();
        assert_eq!(border.radius, 3.0);
        assert_eq!(border.top.unwrap().width, 2.0);
        assert!(border.all_sides_same());
    }

    #[test]
    fn test_image_bad_base64_is_error() {
        assert!(parse_document(r#"<image data="@@@not-base64@@@"/>"#).is_err());
    }

    #[test]
    fn test_qr_defaults() {
        let doc = parse_document(r#"<qr code="hello"/>"#).unwrap();
        let qr = &doc.pages[0].widget.children[0];
        assert_eq!(qr.kind, WidgetKind::Qr);
        assert_eq!(qr.width, 150.0);
        assert_eq!(qr.img_width, 150.0);
        assert!(crate::image_loader::is_png(&qr.bytes));
    }

    #[test]
    fn test_reset_page_numbers() {
        let doc = parse_document(
            r#"<document><page/><page resetPageNumbers="true"/></document>"#,
        )
        .unwrap();
        assert!(!doc.pages[0].reset_page_numbers);
        assert!(doc.pages[1].reset_page_numbers);
    }
}
