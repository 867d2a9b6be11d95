//! # Text Layout
//!
//! Line breaking and text measurement for cell contents.
//!
//! Uses the AFM metrics from the FontContext for character widths and
//! UAX#14 for break opportunities. Breaking is greedy: a line takes as many
//! characters as fit, then ends at the last allowed break point.

use crate::font::FontContext;
use crate::style::FontFace;
use unicode_linebreak::{linebreaks, BreakOpportunity};

const SOFT_HYPHEN: char = '\u{00AD}';

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The text on this line, trailing spaces removed.
    pub text: String,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the start of the next segment.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        let mut char_idx = 0;
        for (byte_idx, _) in text.char_indices() {
            map[byte_idx] = char_idx;
            char_idx += 1;
        }
        map[text.len()] = char_idx;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break a string into lines that fit within `max_width` points.
    ///
    /// Explicit newlines always start a new line. Soft hyphens (U+00AD) are
    /// invisible unless a line ends on one, in which case a hyphen is drawn.
    /// A word wider than `max_width` is split between characters.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        face: &FontFace,
    ) -> Vec<BrokenLine> {
        if text.is_empty() {
            return vec![BrokenLine {
                text: String::new(),
            }];
        }

        let chars: Vec<char> = text.chars().collect();
        let char_widths: Vec<f64> = chars
            .iter()
            .map(|&ch| {
                if ch == SOFT_HYPHEN || is_newline(ch) {
                    0.0
                } else {
                    font_context.char_width(ch, face)
                }
            })
            .collect();
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width: f64 = 0.0;
        let mut last_break_point: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        let end = if is_newline(chars[i - 1]) { i - 1 } else { i };
                        lines.push(self.make_line(&chars[line_start..end], false));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        last_break_point = Some(i - 1);
                    }
                    None => {}
                }
            }

            if ch == SOFT_HYPHEN {
                last_break_point = Some(i);
                continue;
            }
            if is_newline(ch) {
                continue;
            }

            let char_width = char_widths[i];
            if line_width + char_width > max_width && line_start < i {
                // Trailing spaces never force a break.
                if ch == ' ' {
                    line_width += char_width;
                    continue;
                }

                if let Some(bp) = last_break_point.filter(|&bp| bp >= line_start) {
                    let break_at = bp + 1;
                    let hyphen = chars[bp] == SOFT_HYPHEN;
                    lines.push(self.make_line(&chars[line_start..break_at], hyphen));
                    line_start = break_at;
                    line_width = char_widths[line_start..=i].iter().sum();
                    last_break_point = None;
                    continue;
                }

                // No break point on this line: split the word here.
                lines.push(self.make_line(&chars[line_start..i], false));
                line_start = i;
                line_width = char_width;
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        if line_start < chars.len() || lines.is_empty() {
            lines.push(self.make_line(&chars[line_start..], false));
        }

        lines
    }

    /// Measure the width of a string on a single line, in points.
    pub fn measure_width(&self, font_context: &FontContext, text: &str, face: &FontFace) -> f64 {
        let visible: String = text.chars().filter(|&ch| ch != SOFT_HYPHEN).collect();
        font_context.measure_string(&visible, face)
    }

    /// Create a BrokenLine from characters, dropping trailing breakables
    /// unless the line ends on a drawn hyphen.
    fn make_line(&self, chars: &[char], hyphen: bool) -> BrokenLine {
        let mut end = chars.len();
        while end > 0
            && !hyphen
            && (chars[end - 1] == ' ' || chars[end - 1] == SOFT_HYPHEN || is_newline(chars[end - 1]))
        {
            end -= 1;
        }
        let mut text: String = chars[..end]
            .iter()
            .filter(|&&c| c != SOFT_HYPHEN)
            .collect();
        if hyphen {
            text.push('-');
        }
        BrokenLine { text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FontContext {
        FontContext::new()
    }

    fn face() -> FontFace {
        FontFace::new("Helvetica", 12.0)
    }

    fn texts(lines: &[BrokenLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_single_line() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "Hello", 200.0, &face());
        assert_eq!(texts(&lines), vec!["Hello"]);
    }

    #[test]
    fn test_line_break_at_space() {
        let fc = ctx();
        let tl = TextLayout::new();
        let lines = tl.break_into_lines(&fc, "Hello World", 40.0, &face());
        assert_eq!(texts(&lines), vec!["Hello", "World"]);
        assert!(lines
            .iter()
            .all(|l| tl.measure_width(&fc, &l.text, &face()) <= 40.0));
    }

    #[test]
    fn test_explicit_newline() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "Hello\nWorld", 200.0, &face());
        assert_eq!(texts(&lines), vec!["Hello", "World"]);
    }

    #[test]
    fn test_empty_string() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "", 200.0, &face());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.is_empty());
    }

    #[test]
    fn test_long_word_is_split() {
        let fc = ctx();
        let tl = TextLayout::new();
        let lines = tl.break_into_lines(&fc, "Anticonstitutionnellement", 30.0, &face());
        assert!(lines.len() > 1);
        let joined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined, "Anticonstitutionnellement");
        assert!(lines
            .iter()
            .all(|l| tl.measure_width(&fc, &l.text, &face()) <= 30.0 + 1e-9));
    }

    #[test]
    fn test_soft_hyphen_break_draws_hyphen() {
        let fc = ctx();
        let tl = TextLayout::new();
        let full = tl.measure_width(&fc, "paroissiale", &face());
        let text = "paroi\u{00AD}ssiale";
        let lines = tl.break_into_lines(&fc, text, full - 10.0, &face());
        assert_eq!(texts(&lines), vec!["paroi-", "ssiale"]);
        let one = tl.break_into_lines(&fc, text, full + 1.0, &face());
        assert_eq!(texts(&one), vec!["paroissiale"]);
    }

    #[test]
    fn test_trailing_space_is_not_measured() {
        let fc = ctx();
        let tl = TextLayout::new();
        let lines = tl.break_into_lines(&fc, "Messe ", 200.0, &face());
        assert_eq!(texts(&lines), vec!["Messe"]);
        // A trailing space past the limit stays on the line.
        let width = tl.measure_width(&fc, "Messe", &face());
        let tight = tl.break_into_lines(&fc, "Messe ", width, &face());
        assert_eq!(texts(&tight), vec!["Messe"]);
    }
}
