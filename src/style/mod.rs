//! # Style Primitives
//!
//! The small value types shared by the parser and the layout engine
//! (colors, four-sided boxes, line styles, borders) together with the pure
//! functions that parse their attribute shorthands.
//!
//! Shorthand grammar:
//! - box: `"5"` (all sides), `"5 10"` (vertical/horizontal),
//!   `"5 10 15 20"` (top right bottom left)
//! - line style: `style [width [color]]` where style is `none`, `solid`,
//!   `dashed`, `dotted`, or the numeric shortcuts `0` (none) and `1` (solid)
//! - color: `#RGB` or `#RRGGBB`
//! - alignment: whitespace-separated tokens OR'd into a bitmask

use serde::{Deserialize, Serialize};

// ── Alignment bitmask ──────────────────────────────────────────────

pub const LEFT: u32 = 8;
pub const TOP: u32 = 4;
pub const RIGHT: u32 = 2;
pub const BOTTOM: u32 = 1;
pub const CENTER: u32 = 16;
pub const MIDDLE: u32 = 32;

/// Cell rendering options carried alongside the human-readable align string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOption {
    pub align: u32,
}

/// Parse an alignment attribute (`"right middle"`, `"center"`, ...) into the
/// bitmask form. Unknown tokens are ignored.
pub fn parse_align_mask(v: &str, default: u32) -> u32 {
    let mut align = default;
    for item in v.split_whitespace() {
        match item {
            "left" => align |= LEFT,
            "center" => align |= CENTER,
            "right" => align |= RIGHT,
            "top" => align |= TOP,
            "middle" => align |= MIDDLE,
            "bottom" => align |= BOTTOM,
            _ => {}
        }
    }
    align
}

// ── Color ──────────────────────────────────────────────────────────

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parse `#RGB` or `#RRGGBB`. Anything else is unset.
pub fn parse_color(v: &str) -> Option<Color> {
    let hex = v.strip_prefix('#')?;
    match hex.len() {
        3 => {
            let r = parse_hex(&hex[0..1].repeat(2));
            let g = parse_hex(&hex[1..2].repeat(2));
            let b = parse_hex(&hex[2..3].repeat(2));
            Some(Color::rgb(r, g, b))
        }
        6 => {
            let r = parse_hex(&hex[0..2]);
            let g = parse_hex(&hex[2..4]);
            let b = parse_hex(&hex[4..6]);
            Some(Color::rgb(r, g, b))
        }
        _ => None,
    }
}

fn parse_hex(v: &str) -> u8 {
    u8::from_str_radix(v, 16).unwrap_or(0)
}

// ── Box ────────────────────────────────────────────────────────────

/// Four-sided values used for padding, margin and cell padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl BoxSpec {
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

/// Parse a box shorthand. One value sets all sides, two set
/// vertical/horizontal, four set top/right/bottom/left. Any other count
/// yields a zero box.
pub fn parse_box(v: &str) -> BoxSpec {
    let parts: Vec<&str> = v.split_whitespace().collect();
    match parts.len() {
        1 => BoxSpec::uniform(parse_float(parts[0])),
        2 => {
            let vert = parse_float(parts[0]);
            let horiz = parse_float(parts[1]);
            BoxSpec {
                top: vert,
                right: horiz,
                bottom: vert,
                left: horiz,
            }
        }
        4 => BoxSpec {
            top: parse_float(parts[0]),
            right: parse_float(parts[1]),
            bottom: parse_float(parts[2]),
            left: parse_float(parts[3]),
        },
        _ => BoxSpec::default(),
    }
}

pub(crate) fn parse_float(v: &str) -> f64 {
    v.trim().parse().unwrap_or(0.0)
}

// ── Lines and borders ──────────────────────────────────────────────

/// How a border side is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    None,
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// A (style, width, color) triple describing one border side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub kind: LineKind,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// Parse a border side shorthand: up to three whitespace-separated tokens,
/// `style [width [color]]`.
pub fn parse_line_style(v: &str) -> LineStyle {
    let parts: Vec<&str> = v.split_whitespace().collect();
    let mut style = LineStyle::default();
    if let Some(kind) = parts.first() {
        style.kind = parse_line_kind(kind);
    }
    if let Some(width) = parts.get(1) {
        style.width = parse_float(width);
    }
    if let Some(color) = parts.get(2) {
        style.color = parse_color(color);
    }
    style
}

fn parse_line_kind(v: &str) -> LineKind {
    match v {
        "0" | "none" => LineKind::None,
        "dashed" => LineKind::Dashed,
        "dotted" => LineKind::Dotted,
        _ => LineKind::Solid,
    }
}

/// Per-side border styles plus a shared corner radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Border {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<LineStyle>,
    pub radius: f64,
}

impl Border {
    /// True when all four sides are present and drawable.
    pub fn has_all_sides(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|side| side.is_some_and(|s| s.kind != LineKind::None))
    }

    /// True when the four sides share width and color and can be drawn as a
    /// single rectangle.
    pub fn all_sides_same(&self) -> bool {
        if !self.has_all_sides() {
            return false;
        }
        let sides = [self.top, self.right, self.bottom, self.left].map(|s| s.unwrap_or_default());
        sides
            .iter()
            .all(|s| s.width == sides[0].width && s.color == sides[0].color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_long() {
        assert_eq!(parse_color("#1a2b3c"), Some(Color::rgb(0x1a, 0x2b, 0x3c)));
    }

    #[test]
    fn test_parse_color_short() {
        assert_eq!(parse_color("#222"), Some(Color::rgb(0x22, 0x22, 0x22)));
        assert_eq!(parse_color("#f00"), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_parse_color_invalid() {
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_parse_box_one_value() {
        let b = parse_box("5");
        assert_eq!(b, BoxSpec::uniform(5.0));
    }

    #[test]
    fn test_parse_box_two_values() {
        let b = parse_box("5 10");
        assert_eq!(b.top, 5.0);
        assert_eq!(b.bottom, 5.0);
        assert_eq!(b.left, 10.0);
        assert_eq!(b.right, 10.0);
    }

    #[test]
    fn test_parse_box_four_values() {
        let b = parse_box("1 2 3 4");
        assert_eq!((b.top, b.right, b.bottom, b.left), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_parse_box_other_count_is_zero() {
        assert_eq!(parse_box("1 2 3"), BoxSpec::default());
    }

    #[test]
    fn test_parse_line_style_full() {
        let s = parse_line_style("dashed 2 #ff0000");
        assert_eq!(s.kind, LineKind::Dashed);
        assert_eq!(s.width, 2.0);
        assert_eq!(s.color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_parse_line_style_numeric_shortcuts() {
        assert_eq!(parse_line_style("0").kind, LineKind::None);
        assert_eq!(parse_line_style("1").kind, LineKind::Solid);
    }

    #[test]
    fn test_parse_align_mask() {
        assert_eq!(parse_align_mask("right", 0), RIGHT);
        assert_eq!(parse_align_mask("right middle", 0), RIGHT | MIDDLE);
        assert_eq!(parse_align_mask("bogus", 0), 0);
        assert_eq!(parse_align_mask("", LEFT), LEFT);
    }

    #[test]
    fn test_border_side_comparison() {
        let side = LineStyle {
            kind: LineKind::Solid,
            width: 1.0,
            color: Some(Color::rgb(0, 0, 0)),
        };
        let border = Border {
            top: Some(side),
            right: Some(side),
            bottom: Some(side),
            left: Some(side),
            radius: 0.0,
        };
        assert!(border.has_all_sides());
        assert!(border.all_sides_same());

        let mut uneven = border;
        uneven.left = Some(LineStyle {
            width: 3.0,
            ..side
        });
        assert!(!uneven.all_sides_same());
    }
}
