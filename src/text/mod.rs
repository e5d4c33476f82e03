//! # Text Wrapping
//!
//! The "wrapped lines with measured width" service the layout relies on.
//! Font metrics and shaping live behind `LineWrapper`; the layout only ever
//! sees lines and their widths.
//!
//! `GreedyWrapper` is the built-in implementation: UAX#14 break
//! opportunities with a greedy fill and an average-advance width model.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::style::TextStyle;

/// One line after wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    pub text: String,
    /// Measured width, trailing spaces excluded.
    pub width: i32,
    /// The line ended at a mandatory break whose newline is not in `text`.
    pub hard_break: bool,
}

pub trait LineWrapper {
    /// Break `text` into lines no wider than `max_width` where possible. A
    /// word wider than `max_width` is broken by character.
    fn wrap(&self, text: &str, style: &TextStyle, max_width: i32) -> Vec<WrappedLine>;

    /// Height of one line of `style`.
    fn line_height(&self, style: &TextStyle) -> i32 {
        (style.size() * style.line_spacing()).ceil() as i32
    }
}

/// Greedy UAX#14 wrapper with approximate glyph advances.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyWrapper;

impl GreedyWrapper {
    fn advance(&self, ch: char, style: &TextStyle) -> f32 {
        let size = style.size();
        let factor = match ch {
            ' ' => 0.28,
            'i' | 'l' | 'j' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.28,
            'm' | 'w' | 'M' | 'W' => 0.83,
            c if c.is_ascii_uppercase() => 0.67,
            _ => 0.5,
        };
        let weight = if style.bold.unwrap_or(false) { 1.08 } else { 1.0 };
        size * factor * weight
    }

    fn make_line(&self, chars: &[char], widths: &[f32], hard_break: bool) -> WrappedLine {
        let mut end = chars.len();
        while end > 0 && chars[end - 1] == ' ' {
            end -= 1;
        }
        let width: f32 = widths[..end].iter().sum();
        WrappedLine {
            text: chars.iter().collect(),
            width: width.ceil() as i32,
            hard_break,
        }
    }
}

/// UAX#14 break opportunities indexed by char position: entry `i` is the
/// opportunity before `chars[i]`. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

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

impl LineWrapper for GreedyWrapper {
    fn wrap(&self, text: &str, style: &TextStyle, max_width: i32) -> Vec<WrappedLine> {
        if text.is_empty() {
            return Vec::new();
        }
        let max_width = max_width.max(0) as f32;
        let chars: Vec<char> = text.chars().collect();
        let widths: Vec<f32> = chars.iter().map(|c| self.advance(*c, style)).collect();
        let opportunities = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0f32;
        let mut last_break: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            if i > 0 {
                match opportunities[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        let mut end = i;
                        while end > line_start && is_newline(chars[end - 1]) {
                            end -= 1;
                        }
                        let hard_break = end < i;
                        lines.push(self.make_line(
                            &chars[line_start..end],
                            &widths[line_start..end],
                            hard_break,
                        ));
                        line_start = i;
                        line_width = 0.0;
                        last_break = None;
                    }
                    Some(BreakOpportunity::Allowed) => last_break = Some(i - 1),
                    None => {}
                }
            }

            if is_newline(ch) {
                continue;
            }

            if line_width + widths[i] > max_width && line_start < i {
                if let Some(bp) = last_break.filter(|bp| *bp >= line_start) {
                    let break_at = bp + 1;
                    lines.push(
                        self.make_line(&chars[line_start..break_at], &widths[line_start..break_at], false),
                    );
                    line_start = break_at;
                    line_width = widths[line_start..=i].iter().sum();
                    last_break = None;
                    continue;
                }
                // no opportunity on this line, break inside the word
                lines.push(self.make_line(&chars[line_start..i], &widths[line_start..i], false));
                line_start = i;
                line_width = widths[i];
                last_break = None;
                continue;
            }
            line_width += widths[i];
        }

        if line_start < chars.len() {
            let tail: Vec<char> = chars[line_start..]
                .iter()
                .copied()
                .filter(|c| !is_newline(*c))
                .collect();
            if !tail.is_empty() {
                let tail_widths: Vec<f32> = tail.iter().map(|c| self.advance(*c, style)).collect();
                lines.push(self.make_line(&tail, &tail_widths, false));
            }
        }
        lines
    }
}
