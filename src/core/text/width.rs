//! Grapheme width and visible width helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::ansi::strip_ansi;

const TAB_WIDTH: usize = 3;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    UnicodeWidthStr::width(grapheme)
}

/// Display width of `input` with escape sequences ignored.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}

/// Terminal rows a single logical line occupies at `columns` wide.
pub fn wrapped_rows(line: &str, columns: usize) -> usize {
    let width = visible_width(line);
    if columns == 0 || width == 0 {
        return 1;
    }
    width.div_ceil(columns)
}

#[cfg(test)]
mod tests {
    use super::{visible_width, wrapped_rows};

    #[test]
    fn ansi_ignored_in_width() {
        let input = "hi\x1b[31m!!\x1b[0m";
        assert_eq!(visible_width(input), 4);
    }

    #[test]
    fn osc8_ignored_in_width() {
        let input = "\x1b]8;;https://example.com\x07link\x1b]8;;\x07";
        assert_eq!(visible_width(input), 4);
    }

    #[test]
    fn wide_graphemes_count_double() {
        assert_eq!(visible_width("日本"), 4);
        assert_eq!(visible_width("a\tb"), 5);
    }

    #[test]
    fn long_lines_wrap_into_several_rows() {
        assert_eq!(wrapped_rows("", 10), 1);
        assert_eq!(wrapped_rows("abcde", 5), 1);
        assert_eq!(wrapped_rows("abcdef", 5), 2);
        assert_eq!(wrapped_rows("\x1b[32mabcdef\x1b[0m", 3), 2);
    }
}
