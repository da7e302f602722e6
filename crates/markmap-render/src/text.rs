use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub metrics: TextMetrics,
}

pub trait TextMeasurer {
    fn line_width(&self, line: &str, style: &TextStyle) -> f64;

    fn line_height(&self, style: &TextStyle) -> f64;

    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        self.measure_wrapped(text, style, None).metrics
    }

    /// Greedy word wrap. `None` (or a non-positive width) keeps every source line intact.
    /// Tokens wider than `max_width` are broken between characters.
    fn measure_wrapped(
        &self,
        text: &str,
        style: &TextStyle,
        max_width: Option<f64>,
    ) -> WrappedText {
        let max_width = max_width.filter(|w| w.is_finite() && *w > 0.0);
        let mut lines = Vec::new();
        for line in normalized_text_lines(text) {
            match max_width {
                None => lines.push(line),
                Some(max) => wrap_line(self, &line, style, max, &mut lines),
            }
        }

        let width = lines
            .iter()
            .map(|l| self.line_width(l, style))
            .fold(0.0, f64::max);
        let height = lines.len() as f64 * self.line_height(style);
        WrappedText {
            metrics: TextMetrics {
                width,
                height,
                line_count: lines.len(),
            },
            lines,
        }
    }
}

fn wrap_line<M: TextMeasurer + ?Sized>(
    measurer: &M,
    line: &str,
    style: &TextStyle,
    max: f64,
    out: &mut Vec<String>,
) {
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measurer.line_width(&candidate, style) <= max {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if measurer.line_width(word, style) <= max {
            current = word.to_string();
            continue;
        }
        for ch in word.chars() {
            let mut next = current.clone();
            next.push(ch);
            if !current.is_empty() && measurer.line_width(&next, style) > max {
                out.push(std::mem::take(&mut current));
                current.push(ch);
            } else {
                current = next;
            }
        }
    }
    out.push(current);
}

/// Splits text into source lines, treating `<br>` variants like newlines.
pub fn normalized_text_lines(text: &str) -> Vec<String> {
    let t = text
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n");
    t.split('\n').map(|s| s.to_string()).collect()
}

/// Width estimate from Unicode display columns; wide (CJK) glyphs count double.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn line_width(&self, line: &str, style: &TextStyle) -> f64 {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        line.width() as f64 * style.font_size.max(1.0) * char_width_factor
    }

    fn line_height(&self, style: &TextStyle) -> f64 {
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.25
        } else {
            self.line_height_factor
        };
        style.font_size.max(1.0) * line_height_factor
    }
}
