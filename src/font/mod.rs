//! # Font Metrics
//!
//! Text measurement is injected into the layout engine rather than
//! hard-coded, so tests run against a deterministic fake and a PDF back-end
//! can supply real glyph widths.
//!
//! The bundled [`ApproxFontMetrics`] uses a fixed proportional factor;
//! kerning-accurate measurement is explicitly out of scope.

/// Font size used when measuring the intrinsic width of pre-split text
/// lines, before the widget's own size takes effect.
pub const BASE_MEASURE_SIZE: f64 = 7.7;

/// Width of a character relative to the font size in [`ApproxFontMetrics`].
pub const CHAR_WIDTH_FACTOR: f64 = 0.45;

/// Provides text width measurement for a font family and size.
///
/// Implementations must be pure: the layout engine calls this repeatedly
/// and relies on identical answers for identical inputs.
pub trait FontMetrics {
    fn measure(&self, font_family: &str, font_size: f64, text: &str) -> f64;
}

/// Fixed-factor approximation: `0.45 × len × size`, independent of the
/// font family.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxFontMetrics;

impl FontMetrics for ApproxFontMetrics {
    fn measure(&self, _font_family: &str, font_size: f64, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        text.len() as f64 * CHAR_WIDTH_FACTOR * font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(ApproxFontMetrics.measure("roboto", 14.0, ""), 0.0);
    }

    #[test]
    fn test_width_scales_with_length_and_size() {
        let m = ApproxFontMetrics;
        let one = m.measure("roboto", 10.0, "a");
        assert!((one - 4.5).abs() < 1e-9);
        assert!((m.measure("roboto", 10.0, "abcd") - 4.0 * one).abs() < 1e-9);
        assert!((m.measure("roboto", 20.0, "a") - 2.0 * one).abs() < 1e-9);
    }
}
