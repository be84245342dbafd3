//! # PDF Serializer
//!
//! Takes the laid-out document and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer: we emit the raw objects, content
//! streams, cross-reference table and trailer ourselves, which keeps the
//! engine self-contained. The subset needed for document rendering (filled
//! and stroked rectangles, lines, text, image XObjects) is manageable.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, fonts, pages, streams, images)
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points to the catalog
//! %%EOF
//! ```
//!
//! Text uses the base-14 Type1 fonts: the document's font families map onto
//! Helvetica, with the resolved bold variant mapping onto Helvetica-Bold.
//! TrueType embedding is out of scope. Content streams are Flate-compressed.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::QuireError;
use crate::font::{ApproxFontMetrics, FontMetrics};
use crate::image_loader;
use crate::model::{Document, Page, Widget, WidgetKind};
use crate::style::{CellOption, Color, LineKind, LineStyle, CENTER, MIDDLE, RIGHT};

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;

pub struct PdfWriter {
    metrics: ApproxFontMetrics,
}

struct PdfObject {
    data: Vec<u8>,
}

struct Builder {
    objects: Vec<PdfObject>,
    image_count: usize,
}

impl Builder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }
}

/// Images referenced by one page's content stream: (`/ImN` index, object id).
type PageImages = Vec<(usize, usize)>;

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            metrics: ApproxFontMetrics,
        }
    }

    /// Serialize a laid-out document to PDF bytes.
    pub fn write(&self, doc: &Document) -> Result<Vec<u8>, QuireError> {
        let mut builder = Builder {
            objects: Vec::new(),
            image_count: 0,
        };

        // Object 0 is the free-list placeholder; 1-4 are reserved for the
        // catalog, the page tree and the two fonts.
        for _ in 0..5 {
            builder.push(Vec::new());
        }
        builder.objects[FONT_REGULAR_ID].data =
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec();
        builder.objects[FONT_BOLD_ID].data =
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_vec();

        let mut page_obj_ids = Vec::new();

        for page in &doc.pages {
            let page_width = page.widget.computed.border.width;
            let page_height = page.widget.computed.border.height;

            let mut images: PageImages = Vec::new();
            let mut stream = String::new();
            self.write_page(&mut stream, page, page_height, &mut builder, &mut images)?;

            let compressed = compress_to_vec_zlib(stream.as_bytes(), 6);
            let mut content: Vec<u8> = Vec::new();
            let _ = write!(
                content,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content.extend_from_slice(&compressed);
            content.extend_from_slice(b"\nendstream");
            let content_id = builder.push(content);

            let mut resources = format!(
                "/Font << /F1 {} 0 R /F2 {} 0 R >>",
                FONT_REGULAR_ID, FONT_BOLD_ID
            );
            if !images.is_empty() {
                let xobjects: String = images
                    .iter()
                    .map(|(index, id)| format!("/Im{} {} 0 R", index, id))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(resources, " /XObject << {} >>", xobjects);
            }

            let page_dict = format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                PAGES_ID, page_width, page_height, content_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[CATALOG_ID].data =
            format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID).into_bytes();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[PAGES_ID].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        Ok(serialize(&builder))
    }

    // ── Widgets ────────────────────────────────────────────────────

    fn write_page(
        &self,
        stream: &mut String,
        page: &Page,
        page_height: f64,
        builder: &mut Builder,
        images: &mut PageImages,
    ) -> Result<(), QuireError> {
        self.write_background(stream, &page.widget, page_height);

        if let Some(header) = &page.header {
            self.write_widget(stream, header, page_height, builder, images)?;
        }
        for child in &page.widget.children {
            self.write_widget(stream, child, page_height, builder, images)?;
        }
        if let Some(footer) = &page.footer {
            self.write_widget(stream, footer, page_height, builder, images)?;
        }

        Ok(())
    }

    fn write_widget(
        &self,
        stream: &mut String,
        w: &Widget,
        page_height: f64,
        builder: &mut Builder,
        images: &mut PageImages,
    ) -> Result<(), QuireError> {
        if w.hidden {
            return Ok(());
        }
        match w.kind {
            WidgetKind::Div => self.write_div(stream, w, page_height, builder, images),
            WidgetKind::Table => self.write_table(stream, w, page_height, builder, images),
            WidgetKind::Image | WidgetKind::Qr => {
                self.write_image(stream, w, page_height, builder, images)
            }
            kind => Err(QuireError::Render(format!(
                "unexpected widget kind in page flow: {:?}",
                kind
            ))),
        }
    }

    fn write_div(
        &self,
        stream: &mut String,
        w: &Widget,
        page_height: f64,
        builder: &mut Builder,
        images: &mut PageImages,
    ) -> Result<(), QuireError> {
        self.write_background(stream, w, page_height);
        self.write_value(stream, w, page_height);

        for child in &w.children {
            self.write_widget(stream, child, page_height, builder, images)?;
        }

        self.write_border(stream, w, page_height);
        Ok(())
    }

    fn write_table(
        &self,
        stream: &mut String,
        w: &Widget,
        page_height: f64,
        builder: &mut Builder,
        images: &mut PageImages,
    ) -> Result<(), QuireError> {
        self.write_background(stream, w, page_height);

        if let (Some(carry), Some(value)) = (&w.carry_header, w.carry_last) {
            let mut y = w.computed.inner.y - w.computed.line_height;
            y -= carry.margin_box().bottom;
            self.write_table_carry(stream, carry, w, y, value, page_height, builder, images)?;
        }

        for row in &w.children {
            if row.hidden {
                continue;
            }
            for cell in &row.children {
                self.write_cell(stream, cell, page_height, builder, images)?;
            }
        }

        if let (Some(carry), Some(value)) = (&w.carry_footer, w.carry_next) {
            let mut y = w.computed.inner.y + w.computed.inner.height;
            y += carry.margin_box().top;
            self.write_table_carry(stream, carry, w, y, value, page_height, builder, images)?;
        }

        Ok(())
    }

    fn write_cell(
        &self,
        stream: &mut String,
        w: &Widget,
        page_height: f64,
        builder: &mut Builder,
        images: &mut PageImages,
    ) -> Result<(), QuireError> {
        if w.hidden {
            return Ok(());
        }
        self.write_background(stream, w, page_height);
        self.write_value(stream, w, page_height);

        for child in &w.children {
            self.write_widget(stream, child, page_height, builder, images)?;
        }

        self.write_border(stream, w, page_height);
        Ok(())
    }

    /// Carry widgets are prototypes: a clone is anchored to the table's
    /// inner box and its `{carry}` placeholder replaced by the running
    /// value before drawing.
    #[allow(clippy::too_many_arguments)]
    fn write_table_carry(
        &self,
        stream: &mut String,
        carry: &Widget,
        table: &Widget,
        y: f64,
        value: f64,
        page_height: f64,
        builder: &mut Builder,
        images: &mut PageImages,
    ) -> Result<(), QuireError> {
        let mut w = carry.clone();

        if w.option.is_none() {
            w.option = Some(CellOption { align: RIGHT });
        }

        w.computed.border.x = table.computed.inner.x;
        w.computed.border.y = y;
        w.computed.border.width = table.computed.inner.width;
        let padding = w.padding_box();
        w.computed.inner.x = w.computed.border.x + padding.left;
        w.computed.inner.y = w.computed.border.y + padding.top;
        w.computed.inner.width = (w.computed.border.width - padding.horizontal()).max(0.0);

        substitute_carry(&mut w.value_lines, value);

        self.write_div(stream, &w, page_height, builder, images)
    }

    fn write_image(
        &self,
        stream: &mut String,
        w: &Widget,
        page_height: f64,
        builder: &mut Builder,
        images: &mut PageImages,
    ) -> Result<(), QuireError> {
        self.write_background(stream, w, page_height);

        if (w.img_width != 0.0 || w.img_height != 0.0)
            && (w.img_width == 0.0 || w.img_height == 0.0)
        {
            return Err(QuireError::Render(
                "image: if width or height is specified then both are required".to_string(),
            ));
        }

        if !w.bytes.is_empty() {
            let object_id = write_image_xobject(builder, &w.bytes)?;
            let index = builder.image_count;
            builder.image_count += 1;
            images.push((index, object_id));

            let x = w.computed.inner.x;
            let y = page_height - w.computed.inner.y - w.img_height;
            let _ = write!(
                stream,
                "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                w.img_width, w.img_height, x, y, index
            );
        }

        self.write_border(stream, w, page_height);
        Ok(())
    }

    // ── Text ───────────────────────────────────────────────────────

    fn write_value(&self, stream: &mut String, w: &Widget, page_height: f64) {
        if w.value_lines.is_empty() {
            return;
        }

        let mut align = w.option.map(|o| o.align).unwrap_or(0);
        // Single lines center vertically within their line box.
        if w.value_lines.len() == 1 {
            align |= MIDDLE;
        }

        let color = w.color.or(w.computed.color).unwrap_or_default();
        let font = if w.computed.bold { "/F2" } else { "/F1" };
        let size = w.computed.font_size;
        let line_height = w.computed.line_height;
        let inner_width = w.computed.inner.width;

        let mut y_top = w.computed.inner.y;

        for line in &w.value_lines {
            let line = self.truncate_to_width(line, &w.computed.font_family, size, inner_width);

            let text_width = self.metrics.measure(&w.computed.font_family, size, &line);
            let mut x = w.computed.inner.x;
            if align & CENTER != 0 {
                x += (inner_width - text_width) / 2.0;
            } else if align & RIGHT != 0 {
                x += inner_width - text_width;
            }

            // Baseline sits at roughly 80% of the line box.
            let baseline = page_height - y_top - 0.8 * line_height;

            let _ = write!(
                stream,
                "BT\n{} {:.2} Tf\n{} rg\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                font,
                size,
                color_triplet(color),
                x,
                baseline,
                encode_pdf_text(&line)
            );

            y_top += line_height;
        }
    }

    /// Cut an overlong line down to the widget's inner width, character by
    /// character. Enforces the single-line truncation contract of `wrap`.
    fn truncate_to_width(
        &self,
        line: &str,
        font_family: &str,
        font_size: f64,
        width: f64,
    ) -> String {
        let full = self.metrics.measure(font_family, font_size, line);
        if full <= width {
            return line.to_string();
        }

        let mut out = String::new();
        let mut used = 0.0;
        for c in line.chars() {
            let char_width = self
                .metrics
                .measure(font_family, font_size, c.encode_utf8(&mut [0; 4]));
            used += char_width;
            if used > width {
                break;
            }
            out.push(c);
        }
        if out.is_empty() {
            return line.to_string();
        }
        out
    }

    // ── Backgrounds and borders ────────────────────────────────────

    fn write_background(&self, stream: &mut String, w: &Widget, page_height: f64) {
        let Some(bg) = w.background_color else {
            return;
        };

        let rect = w.computed.border;
        let x = rect.x;
        let y = page_height - rect.y - rect.height;
        let radius = w.border.map(|b| b.radius).unwrap_or(0.0);

        let _ = write!(stream, "q\n{} rg\n", color_triplet(bg));
        if radius > 0.0 {
            write_rounded_rect(stream, x, y, rect.width, rect.height, radius);
        } else {
            let _ = write!(
                stream,
                "{:.2} {:.2} {:.2} {:.2} re\n",
                x, y, rect.width, rect.height
            );
        }
        let _ = write!(stream, "f\nQ\n");
    }

    fn write_border(&self, stream: &mut String, w: &Widget, page_height: f64) {
        let Some(border) = w.border else {
            return;
        };

        let rect = w.computed.border;
        let x = rect.x;
        let y_top = rect.y;

        if border.has_all_sides() && border.all_sides_same() {
            let side = border.top.unwrap_or_default();
            let _ = write!(stream, "q\n");
            if let Some(color) = side.color {
                let _ = write!(stream, "{} RG\n", color_triplet(color));
            }
            if side.width > 0.0 {
                let _ = write!(stream, "{:.2} w\n", side.width);
            }
            let y = page_height - y_top - rect.height;
            let _ = write!(
                stream,
                "{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                x, y, rect.width, rect.height
            );
            return;
        }

        let x2 = x + rect.width;
        let top = page_height - y_top;
        let bottom = page_height - y_top - rect.height;

        if let Some(side) = drawable(border.left) {
            write_line(stream, x, bottom, x, top, side);
        }
        if let Some(side) = drawable(border.right) {
            write_line(stream, x2, bottom, x2, top, side);
        }
        if let Some(side) = drawable(border.top) {
            write_line(stream, x, top, x2, top, side);
        }
        if let Some(side) = drawable(border.bottom) {
            write_line(stream, x, bottom, x2, bottom, side);
        }
    }
}

fn drawable(side: Option<LineStyle>) -> Option<LineStyle> {
    side.filter(|s| s.kind != LineKind::None)
}

fn write_line(stream: &mut String, x1: f64, y1: f64, x2: f64, y2: f64, style: LineStyle) {
    let _ = write!(stream, "q\n");
    if let Some(color) = style.color {
        let _ = write!(stream, "{} RG\n", color_triplet(color));
    }
    if style.width > 0.0 {
        let _ = write!(stream, "{:.2} w\n", style.width);
    }
    let _ = write!(
        stream,
        "{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
        x1, y1, x2, y2
    );
}

/// Rounded rectangle path with a uniform corner radius, built from bezier
/// arcs (kappa approximation).
fn write_rounded_rect(stream: &mut String, x: f64, y: f64, w: f64, h: f64, radius: f64) {
    let k = 0.5522847498;
    let r = radius.min(w / 2.0).min(h / 2.0);

    let _ = write!(stream, "{:.2} {:.2} m\n", x + r, y);
    let _ = write!(stream, "{:.2} {:.2} l\n", x + w - r, y);
    let _ = write!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x + w - r + r * k,
        y,
        x + w,
        y + r - r * k,
        x + w,
        y + r
    );
    let _ = write!(stream, "{:.2} {:.2} l\n", x + w, y + h - r);
    let _ = write!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x + w,
        y + h - r + r * k,
        x + w - r + r * k,
        y + h,
        x + w - r,
        y + h
    );
    let _ = write!(stream, "{:.2} {:.2} l\n", x + r, y + h);
    let _ = write!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x + r - r * k,
        y + h,
        x,
        y + h - r + r * k,
        x,
        y + h - r
    );
    let _ = write!(stream, "{:.2} {:.2} l\n", x, y + r);
    let _ = write!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x,
        y + r - r * k,
        x + r - r * k,
        y,
        x + r,
        y
    );
    let _ = write!(stream, "h\n");
}

/// Replace `{carry}` with the running value formatted to two decimals.
pub(crate) fn substitute_carry(lines: &mut [String], value: f64) {
    let formatted = format!("{:.2}", value);
    for line in lines {
        *line = line.replace("{carry}", &formatted);
    }
}

fn color_triplet(c: Color) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        c.r as f64 / 255.0,
        c.g as f64 / 255.0,
        c.b as f64 / 255.0
    )
}

/// Encode text for a PDF string literal: printable ASCII with the usual
/// escapes, everything representable in WinAnsi as an octal escape, `?`
/// otherwise.
fn encode_pdf_text(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(ch),
            _ => match unicode_to_winansi(ch) {
                Some(byte) => {
                    let _ = write!(out, "\\{:03o}", byte);
                }
                None => out.push('?'),
            },
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value. Latin-1 maps
/// directly; a handful of Windows-1252 specials live in 0x80-0x9F.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // euro
        0x2026 => Some(0x85), // ellipsis
        0x2018 => Some(0x91), // left single quote
        0x2019 => Some(0x92), // right single quote
        0x201C => Some(0x93), // left double quote
        0x201D => Some(0x94), // right double quote
        0x2022 => Some(0x95), // bullet
        0x2013 => Some(0x96), // en dash
        0x2014 => Some(0x97), // em dash
        0x2122 => Some(0x99), // trade mark
        _ => None,
    }
}

// ── Images ─────────────────────────────────────────────────────────

/// Write an image as one or two XObjects (an SMask for PNG alpha) and
/// return the main object id. JPEG bytes pass through with DCTDecode.
fn write_image_xobject(builder: &mut Builder, bytes: &[u8]) -> Result<usize, QuireError> {
    if image_loader::is_jpeg(bytes) {
        let (width, height) = image_loader::intrinsic_dimensions(bytes)
            .ok_or_else(|| QuireError::Render("failed to read JPEG dimensions".to_string()))?;
        let color_space = if jpeg_is_grayscale(bytes) {
            "/DeviceGray"
        } else {
            "/DeviceRGB"
        };

        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
            width,
            height,
            color_space,
            bytes.len()
        );
        data.extend_from_slice(bytes);
        data.extend_from_slice(b"\nendstream");
        return Ok(builder.push(data));
    }

    let decoded = image_loader::decode_rgb(bytes)?;

    let smask_id = match &decoded.alpha {
        Some(alpha) => {
            let compressed = compress_to_vec_zlib(alpha, 6);
            let mut data: Vec<u8> = Vec::new();
            let _ = write!(
                data,
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
                decoded.width,
                decoded.height,
                compressed.len()
            );
            data.extend_from_slice(&compressed);
            data.extend_from_slice(b"\nendstream");
            Some(builder.push(data))
        }
        None => None,
    };

    let compressed = compress_to_vec_zlib(&decoded.rgb, 6);
    let mut data: Vec<u8> = Vec::new();
    let smask_entry = smask_id
        .map(|id| format!("/SMask {} 0 R ", id))
        .unwrap_or_default();
    let _ = write!(
        data,
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
         /ColorSpace /DeviceRGB /BitsPerComponent 8 {}/Filter /FlateDecode /Length {} >>\nstream\n",
        decoded.width,
        decoded.height,
        smask_entry,
        compressed.len()
    );
    data.extend_from_slice(&compressed);
    data.extend_from_slice(b"\nendstream");
    Ok(builder.push(data))
}

/// Scan JPEG markers for the SOF segment and read the component count.
fn jpeg_is_grayscale(data: &[u8]) -> bool {
    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            if i + 9 < data.len() {
                return data[i + 9] == 1;
            }
            break;
        }
        if i + 3 < data.len() {
            let segment_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + segment_len;
        } else {
            break;
        }
    }
    false
}

/// Serialize all objects into the final PDF byte stream.
fn serialize(builder: &Builder) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in builder.objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{} 0 obj\n", i);
        output.extend_from_slice(&obj.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        builder.objects.len(),
        CATALOG_ID,
        xref_offset
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pdf_text_escapes() {
        assert_eq!(encode_pdf_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(encode_pdf_text("back\\slash"), "back\\\\slash");
        assert_eq!(encode_pdf_text("caf\u{e9}"), "caf\\351");
        assert_eq!(encode_pdf_text("\u{4e16}"), "?");
    }

    #[test]
    fn test_substitute_carry_formats_two_decimals() {
        let mut lines = vec!["Carried: {carry}".to_string(), "plain".to_string()];
        substitute_carry(&mut lines, 30.0);
        assert_eq!(lines[0], "Carried: 30.00");
        assert_eq!(lines[1], "plain");
    }

    #[test]
    fn test_jpeg_grayscale_detection() {
        let gray = image::GrayImage::from_pixel(2, 2, image::Luma([100]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, gray.as_raw(), 2, 2, image::ColorType::L8)
            .unwrap();
        assert!(jpeg_is_grayscale(&buf));

        let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, rgb.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();
        assert!(!jpeg_is_grayscale(&buf));
    }

    #[test]
    fn test_rounded_rect_emits_curves() {
        let mut stream = String::new();
        write_rounded_rect(&mut stream, 0.0, 0.0, 100.0, 50.0, 8.0);
        assert!(stream.contains(" c\n"));
        assert!(stream.ends_with("h\n"));
    }
}
