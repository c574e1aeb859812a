//! Greedy word wrapping against the embedded font metrics. The wrapper is a
//! lazy iterator: one line per `next()` until the input is consumed, no state
//! kept between calls to `wrap`.

use crate::font::{self, FontId};
use crate::types::Pt;

pub struct LineWrapper<'a> {
    words: std::str::SplitWhitespace<'a>,
    carry: Option<&'a str>,
    font: FontId,
    size: Pt,
    max_width: Pt,
}

pub fn wrap(text: &str, font: FontId, size: Pt, max_width: Pt) -> LineWrapper<'_> {
    LineWrapper {
        words: text.split_whitespace(),
        carry: None,
        font,
        size,
        max_width,
    }
}

impl<'a> Iterator for LineWrapper<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut line = String::new();
        loop {
            let Some(word) = self.carry.take().or_else(|| self.words.next()) else {
                break;
            };
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            let fits = font::text_width(self.font, self.size, &candidate) <= self.max_width;
            // A single word wider than the line goes on its own line;
            // refusing it when the line is empty would make zero progress.
            if fits || line.is_empty() {
                line = candidate;
                if !fits {
                    break;
                }
            } else {
                self.carry = Some(word);
                break;
            }
        }
        if line.is_empty() { None } else { Some(line) }
    }
}

/// Wrapped line count without materializing the lines.
pub fn line_count(text: &str, font: FontId, size: Pt, max_width: Pt) -> usize {
    wrap(text, font, size, max_width).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_all(text: &str, size: f32, max: f32) -> Vec<String> {
        wrap(
            text,
            FontId::Helvetica,
            Pt::from_f32(size),
            Pt::from_f32(max),
        )
        .collect()
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_all("hello world", 10.0, 500.0), vec!["hello world"]);
    }

    #[test]
    fn text_wraps_at_measured_width() {
        let lines = wrap_all("one two three four five six seven", 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(
                font::text_width(FontId::Helvetica, Pt::from_f32(10.0), line)
                    <= Pt::from_f32(60.0)
            );
        }
        assert_eq!(lines.join(" "), "one two three four five six seven");
    }

    #[test]
    fn overwide_word_gets_its_own_line_and_terminates() {
        let lines = wrap_all("a incomprehensibilities b", 12.0, 30.0);
        assert_eq!(lines, vec!["a", "incomprehensibilities", "b"]);
    }

    #[test]
    fn single_overwide_word_yields_one_line() {
        let lines = wrap_all("incomprehensibilities", 12.0, 10.0);
        assert_eq!(lines, vec!["incomprehensibilities"]);
    }

    #[test]
    fn empty_text_yields_no_lines() {
        assert!(wrap_all("", 10.0, 100.0).is_empty());
        assert!(wrap_all("   ", 10.0, 100.0).is_empty());
    }

    #[test]
    fn identical_inputs_yield_identical_sequences() {
        let a = wrap_all("the quick brown fox jumps over the lazy dog", 9.0, 80.0);
        let b = wrap_all("the quick brown fox jumps over the lazy dog", 9.0, 80.0);
        assert_eq!(a, b);
        assert_eq!(
            line_count(
                "the quick brown fox jumps over the lazy dog",
                FontId::Helvetica,
                Pt::from_f32(9.0),
                Pt::from_f32(80.0)
            ),
            a.len()
        );
    }
}
