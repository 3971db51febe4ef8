//! Row accounting for text wrapped at a terminal width.
//!
//! Widths come from `unicode-width`; escape sequences and grapheme clusters are
//! not modelled, so budgets for styled or combining text are approximate.

use unicode_width::UnicodeWidthChar;

/// Whether a set of strings is measured by its tallest or shortest member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    Most,
    Least,
}

/// Columns a single character occupies. Zero-width characters count as one.
fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0).max(1)
}

/// Display width of a string in terminal columns.
pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Rows one string needs at `width`: each newline-separated segment takes at least one row.
fn rows_for(width: usize, text: &str) -> usize {
    text.split('\n')
        .map(|segment| display_width(segment).div_ceil(width).max(1))
        .sum()
}

/// Rows needed by the tallest (`Most`) or shortest (`Least`) string in `strings`.
pub fn lines_needed(width: usize, mode: LineMode, strings: &[&str]) -> usize {
    let width = width.max(1);
    let rows = strings.iter().map(|text| rows_for(width, text));
    match mode {
        LineMode::Most => rows.max(),
        LineMode::Least => rows.min(),
    }
    .unwrap_or(0)
}

/// Number of decimal digits in `value`.
pub fn digit_count(value: usize) -> usize {
    let mut digits = 1;
    let mut rest = value / 10;
    while rest > 0 {
        digits += 1;
        rest /= 10;
    }
    digits
}

/// Greedy word wrap at `width` columns.
///
/// Every whitespace character counts as one space. Spacing inside a line is kept,
/// spacing at a break is dropped, and words longer than a line are broken.
/// Continuation lines start with `subsequent_indent`.
pub fn wrap(text: &str, width: usize, subsequent_indent: &str) -> Vec<String> {
    let width = width.max(1);
    let leading = text.chars().take_while(|ch| ch.is_whitespace()).count();
    let mut wrapper = Wrapper {
        width,
        indent: subsequent_indent,
        lines: Vec::new(),
        current: " ".repeat(leading),
        current_width: leading,
        has_word: false,
    };
    let mut gap = 0usize;
    let mut word = String::new();
    for ch in text.chars().skip(leading) {
        if ch.is_whitespace() {
            if !word.is_empty() {
                wrapper.push_word(gap, &word);
                word.clear();
                gap = 0;
            }
            gap += 1;
        } else {
            word.push(ch);
        }
    }
    if !word.is_empty() {
        wrapper.push_word(gap, &word);
    }
    wrapper.finish()
}

struct Wrapper<'a> {
    width: usize,
    indent: &'a str,
    lines: Vec<String>,
    current: String,
    current_width: usize,
    has_word: bool,
}

impl Wrapper<'_> {
    fn push_word(&mut self, gap: usize, word: &str) {
        let word_width = display_width(word);
        if self.has_word {
            if self.current_width + gap + word_width <= self.width {
                self.current.push_str(&" ".repeat(gap));
                self.current.push_str(word);
                self.current_width += gap + word_width;
                return;
            }
            self.break_line();
        }
        if self.current_width + word_width <= self.width {
            self.current.push_str(word);
            self.current_width += word_width;
            self.has_word = true;
            return;
        }
        for ch in word.chars() {
            let width = char_width(ch);
            if self.has_word && self.current_width + width > self.width {
                self.break_line();
            }
            self.current.push(ch);
            self.current_width += width;
            self.has_word = true;
        }
    }

    fn break_line(&mut self) {
        let line = std::mem::replace(&mut self.current, self.indent.to_string());
        self.lines.push(line);
        self.current_width = display_width(self.indent);
        self.has_word = false;
    }

    fn finish(mut self) -> Vec<String> {
        if self.has_word {
            self.lines.push(self.current);
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_columns_take_two_rows_at_eighty() {
        let text = "0123456789".repeat(10);
        assert_eq!(lines_needed(80, LineMode::Most, &[&text]), 2);
    }

    #[test]
    fn exact_fit_takes_one_row() {
        let text = "x".repeat(80);
        assert_eq!(lines_needed(80, LineMode::Most, &[&text]), 1);
    }

    #[test]
    fn empty_set_costs_nothing_and_empty_string_costs_a_row() {
        assert_eq!(lines_needed(80, LineMode::Most, &[]), 0);
        assert_eq!(lines_needed(80, LineMode::Least, &[""]), 1);
    }

    #[test]
    fn newlines_add_rows_per_segment() {
        assert_eq!(lines_needed(80, LineMode::Most, &["one\ntwo\nthree"]), 3);
        let long = format!("{}\nshort", "y".repeat(120));
        assert_eq!(lines_needed(80, LineMode::Most, &[&long]), 3);
    }

    #[test]
    fn mode_selects_tallest_or_shortest() {
        let long = "z".repeat(170);
        let strings = [long.as_str(), "brief", "two\nrows"];
        assert_eq!(lines_needed(80, LineMode::Most, &strings), 3);
        assert_eq!(lines_needed(80, LineMode::Least, &strings), 1);
    }

    #[test]
    fn zero_width_is_treated_as_one_column() {
        assert_eq!(lines_needed(0, LineMode::Most, &["abc"]), 3);
    }

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(display_width("日本"), 4);
        assert_eq!(lines_needed(3, LineMode::Most, &["日本"]), 2);
    }

    #[test]
    fn digit_count_matches_decimal_length() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(1500), 4);
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap("  1 hello world", 80, "    "), vec!["  1 hello world"]);
    }

    #[test]
    fn wrap_indents_continuation_lines() {
        let lines = wrap(" 1 alpha beta gamma", 10, "   ");
        assert_eq!(lines, vec![" 1 alpha", "   beta", "   gamma"]);
        assert!(lines.iter().all(|line| display_width(line) <= 10));
    }

    #[test]
    fn wrap_breaks_long_words() {
        let lines = wrap("abcdefghij", 4, "");
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_turns_newlines_into_spaces() {
        assert_eq!(wrap("first\nsecond", 80, ""), vec!["first second"]);
    }

    #[test]
    fn wrap_keeps_column_spacing() {
        assert_eq!(wrap("kb       Show it", 80, ""), vec!["kb       Show it"]);
        assert_eq!(wrap("a    b", 3, "  "), vec!["a", "  b"]);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap("   ", 80, "  ").is_empty());
    }
}
