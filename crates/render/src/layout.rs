//! Text measurement, greedy word wrapping and centering for bitmap fonts

use crate::font::FontMetrics;
use led_ticker_types::Rgb;
use log::trace;

/// Ellipsis used when the face has a glyph for it
const ELLIPSIS: char = '…';
/// ASCII replacement for faces without `…`
const ASCII_ELLIPSIS: &str = "...";
/// Last-resort truncation length when not even one character fits
const LAST_RESORT_CHARS: usize = 10;

/// A positioned run of text, produced per frame and consumed immediately.
///
/// `origin` is the top-left corner of the line box; the baseline sits
/// `font.ascent()` pixels below it.
#[derive(Debug, Clone)]
pub struct TextBlock<'a> {
    pub text: String,
    pub font: &'a FontMetrics,
    pub color: Rgb,
    pub origin: (i32, i32),
}

impl<'a> TextBlock<'a> {
    pub fn new(
        text: impl Into<String>,
        font: &'a FontMetrics,
        color: Rgb,
        origin: (i32, i32),
    ) -> Self {
        Self {
            text: text.into(),
            font,
            color,
            origin,
        }
    }
}

/// Output of [`TextLayoutEngine::wrap`]: always exactly `max_lines` entries,
/// unused ones empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WrapResult {
    lines: Vec<String>,
}

impl WrapResult {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when every line is empty
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Stateless layout engine shared by all providers
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLayoutEngine;

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self
    }

    /// Width of `text` in pixels. Unmapped characters count as the face's
    /// average advance instead of failing.
    pub fn measure(&self, text: &str, font: &FontMetrics) -> u32 {
        text.chars()
            .map(|c| match font.advance_of(c) {
                Ok(advance) => advance,
                Err(e) => {
                    trace!("{} in '{}', using average advance", e, font.name());
                    font.average_advance()
                }
            })
            .sum()
    }

    /// Ellipsis marker for this face
    pub fn ellipsis(&self, font: &FontMetrics) -> String {
        if font.has_glyph(ELLIPSIS) {
            ELLIPSIS.to_string()
        } else {
            ASCII_ELLIPSIS.to_string()
        }
    }

    /// Greedy word wrap into exactly `max_lines` lines.
    ///
    /// Words that do not fit on a line of their own are truncated with an
    /// ellipsis. Words left over once `max_lines` lines are full are dropped.
    pub fn wrap(
        &self,
        text: &str,
        max_width: u32,
        font: &FontMetrics,
        max_lines: usize,
    ) -> WrapResult {
        let mut lines: Vec<String> = Vec::with_capacity(max_lines);
        let mut current = String::new();

        for word in text.split_whitespace() {
            if lines.len() >= max_lines {
                break;
            }

            if !current.is_empty() {
                let candidate = format!("{} {}", current, word);
                if self.measure(&candidate, font) <= max_width {
                    current = candidate;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
                if lines.len() >= max_lines {
                    break;
                }
            }

            current = if self.measure(word, font) <= max_width {
                word.to_string()
            } else {
                self.truncate_word(word, max_width, font)
            };
        }

        if !current.is_empty() && lines.len() < max_lines {
            lines.push(current);
        }
        lines.resize(max_lines, String::new());

        WrapResult { lines }
    }

    /// Cut `word` from the end until it fits together with the ellipsis
    fn truncate_word(&self, word: &str, max_width: u32, font: &FontMetrics) -> String {
        let ellipsis = self.ellipsis(font);
        let ellipsis_width = self.measure(&ellipsis, font);
        let chars: Vec<char> = word.chars().collect();

        // Running prefix widths, so each candidate is O(1)
        let mut prefix_width = Vec::with_capacity(chars.len() + 1);
        prefix_width.push(0u32);
        for c in &chars {
            let last = prefix_width.last().copied().unwrap_or(0);
            prefix_width.push(last + self.measure(c.encode_utf8(&mut [0u8; 4]), font));
        }

        for keep in (1..chars.len()).rev() {
            if prefix_width[keep] + ellipsis_width <= max_width {
                let mut truncated: String = chars[..keep].iter().collect();
                truncated.push_str(&ellipsis);
                return truncated;
            }
        }

        trace!("'{}' cannot fit {}px, using last-resort truncation", word, max_width);
        let mut truncated: String = chars.iter().take(LAST_RESORT_CHARS).collect();
        truncated.push_str(&ellipsis);
        truncated
    }

    /// Left offset that centres `text` in `container_width`, floored
    pub fn center_x(&self, text: &str, font: &FontMetrics, container_width: u32) -> i32 {
        (container_width as i32 - self.measure(text, font) as i32).div_euclid(2)
    }

    /// Lay out `lines` top to bottom starting at `top`, each centred
    /// horizontally. Empty lines produce no block but keep their row.
    pub fn stack_centered<'a, S: AsRef<str>>(
        &self,
        lines: &[S],
        font: &'a FontMetrics,
        color: Rgb,
        top: i32,
        line_gap: u32,
        width: u32,
    ) -> Vec<TextBlock<'a>> {
        let pitch = (font.height() + line_gap) as i32;
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.as_ref().is_empty())
            .map(|(i, line)| {
                let line = line.as_ref();
                let x = self.center_x(line, font, width);
                TextBlock::new(line, font, color, (x, top + i as i32 * pitch))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontBook;
    use std::sync::Arc;

    fn face(name: &str) -> Arc<FontMetrics> {
        FontBook::with_builtin().get(name).unwrap()
    }

    #[test]
    fn test_wrap_returns_exactly_max_lines() {
        let engine = TextLayoutEngine::new();
        let font = face("6x10");
        for max_lines in 0..5 {
            let text = "the quick brown fox jumps over the lazy dog";
            let result = engine.wrap(text, 60, &font, max_lines);
            assert_eq!(result.len(), max_lines);
        }
        let result = engine.wrap("", 60, &font, 3);
        assert_eq!(result.lines(), &["", "", ""]);
        assert!(result.is_blank());
    }

    #[test]
    fn test_wrap_lines_fit_budget() {
        let engine = TextLayoutEngine::new();
        let font = face("5x8");
        let texts = [
            "A long headline about markets rallying after the announcement",
            "short",
            "Pneumonoultramicroscopicsilicovolcanoconiosis is a word",
            "  spaced    out   words  ",
        ];
        for text in texts {
            for width in [30u32, 64, 128] {
                let result = engine.wrap(text, width, &font, 3);
                for line in result.lines().iter().filter(|l| !l.is_empty()) {
                    assert!(
                        engine.measure(line, &font) <= width,
                        "'{}' exceeds {}px",
                        line,
                        width
                    );
                }
            }
        }
    }

    #[test]
    fn test_wrap_is_greedy_and_drops_overflow() {
        let engine = TextLayoutEngine::new();
        let font = face("6x10");
        // 60px = 10 chars per line
        let result = engine.wrap("one two three four five six", 60, &font, 2);
        assert_eq!(result.lines(), &["one two", "three four"]);
    }

    #[test]
    fn test_wrap_is_deterministic() {
        let engine = TextLayoutEngine::new();
        let font = face("4x6");
        let text = "Word of the day: serendipity, the occurrence of events by chance";
        assert_eq!(engine.wrap(text, 120, &font, 3), engine.wrap(text, 120, &font, 3));
    }

    #[test]
    fn test_single_long_word_is_truncated_with_ellipsis() {
        let engine = TextLayoutEngine::new();
        let font = face("6x10");
        let result = engine.wrap("Supercalifragilisticexpialidocious", 30, &font, 1);
        let line = &result.lines()[0];
        assert!(!line.is_empty());
        assert!(line.ends_with(&engine.ellipsis(&font)));
        assert!(engine.measure(line, &font) <= 30);
        assert_eq!(line, "Su...");
    }

    #[test]
    fn test_last_resort_truncation_is_never_empty() {
        let engine = TextLayoutEngine::new();
        let font = face("6x10");
        let result = engine.wrap("Supercalifragilisticexpialidocious", 8, &font, 2);
        assert_eq!(result.lines()[0], "Supercalif...");
        assert_eq!(result.lines()[1], "");
    }

    #[test]
    fn test_measure_uses_average_advance_for_unmapped() {
        let engine = TextLayoutEngine::new();
        let font = face("6x10");
        assert_eq!(engine.measure("é", &font), font.average_advance());
        assert_eq!(engine.measure("ab", &font), 12);
    }

    #[test]
    fn test_center_x_floors() {
        let engine = TextLayoutEngine::new();
        let font = face("6x10");
        assert_eq!(engine.center_x("abc", &font, 128), 55);
        assert_eq!(engine.center_x("abc", &font, 19), 0);
        // Wider than the container: negative offset, floored
        assert_eq!(engine.center_x("abcd", &font, 15), -5);
    }

    #[test]
    fn test_stack_centered_keeps_rows_for_empty_lines() {
        let engine = TextLayoutEngine::new();
        let font = face("4x6");
        let blocks = engine.stack_centered(&["ab", "", "cd"], &font, Rgb::WHITE, 10, 1, 32);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].origin, (12, 10));
        assert_eq!(blocks[1].origin, (12, 24));
    }
}
