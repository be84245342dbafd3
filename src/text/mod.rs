//! # Text Wrapping
//!
//! Greedy line breaking against a width budget. Lines are split on `\n`,
//! trimmed, then filled word by word; a word wider than the budget is broken
//! character by character. The character fallback always consumes at least
//! one character per produced line, so wrapping terminates even when the
//! available width is smaller than a single glyph.

use crate::font::FontMetrics;

/// Split `text` into lines that fit within `available_width`.
///
/// Words are measured through the injected metrics at `font_size`; a single
/// space width is charged between words. Empty source lines are dropped.
pub fn split_lines(
    metrics: &dyn FontMetrics,
    font_family: &str,
    text: &str,
    font_size: f64,
    available_width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    let space_width = metrics.measure(font_family, font_size, " ");

    for text_line in text.split('\n') {
        let text_line = text_line.trim();
        if text_line.is_empty() {
            continue;
        }

        let mut line: Vec<&str> = Vec::new();
        let mut line_width = 0.0;

        for word in text_line.split_whitespace() {
            let word_width = metrics.measure(font_family, font_size, word);

            if word_width > available_width {
                if !line.is_empty() {
                    lines.push(line.join(" "));
                }
                break_long_word(metrics, font_family, word, font_size, available_width, &mut lines);
                line.clear();
                line_width = 0.0;
                continue;
            }

            if line_width + word_width > available_width {
                if !line.is_empty() {
                    lines.push(line.join(" "));
                }
                line = vec![word];
                line_width = word_width + space_width;
                continue;
            }

            line.push(word);
            line_width += word_width;
            line_width += space_width;
        }

        if !line.is_empty() {
            lines.push(line.join(" "));
        }
    }

    lines
}

/// Break a word wider than the budget into character chunks. The first
/// character of every chunk is taken unconditionally.
fn break_long_word(
    metrics: &dyn FontMetrics,
    font_family: &str,
    word: &str,
    font_size: f64,
    available_width: f64,
    lines: &mut Vec<String>,
) {
    let chars: Vec<char> = word.chars().collect();
    let mut start = 0;

    while start < chars.len() {
        let mut buf = String::new();
        let mut buf_width = 0.0;
        let mut taken = 0;

        for &c in &chars[start..] {
            let char_width = metrics.measure(font_family, font_size, c.encode_utf8(&mut [0; 4]));
            if buf_width + char_width > available_width && taken > 0 {
                break;
            }
            buf_width += char_width;
            buf.push(c);
            taken += 1;
        }

        lines.push(buf);
        start += taken;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::ApproxFontMetrics;

    // With ApproxFontMetrics at size 10, every ASCII char is 4.5 wide.

    fn wrap(text: &str, width: f64) -> Vec<String> {
        split_lines(&ApproxFontMetrics, "roboto", text, 10.0, width)
    }

    #[test]
    fn test_short_text_single_line() {
        assert_eq!(wrap("hello world", 1000.0), vec!["hello world"]);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        // "aaaa" is 18 wide; with the trailing space charge each next word
        // overflows the 40pt budget and starts a new line.
        let lines = wrap("aaaa bbbb cccc", 40.0);
        assert_eq!(lines, vec!["aaaa", "bbbb", "cccc"]);
    }

    #[test]
    fn test_every_line_fits_or_is_forced() {
        let metrics = ApproxFontMetrics;
        let lines = wrap("the quick brown fox jumps over the lazy dog", 60.0);
        for line in &lines {
            let w = metrics.measure("roboto", 10.0, line);
            assert!(
                w <= 60.0 || line.chars().count() == 1,
                "line {:?} measures {} in a 60pt budget",
                line,
                w
            );
        }
    }

    #[test]
    fn test_long_word_breaks_by_characters() {
        // 20 chars at 4.5 = 90 wide; budget 30 fits 6 chars per line.
        let lines = wrap("abcdefghijklmnopqrst", 30.0);
        assert_eq!(lines, vec!["abcdef", "ghijkl", "mnopqr", "st"]);
    }

    #[test]
    fn test_narrower_than_one_char_still_terminates() {
        let lines = wrap("abc", 1.0);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_newlines_and_blank_lines() {
        let lines = wrap("one\n\n  \ntwo", 1000.0);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_lines_are_trimmed() {
        assert_eq!(wrap("  padded  \n", 1000.0), vec!["padded"]);
    }
}
