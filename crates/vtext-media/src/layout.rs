//! Text measurement and line wrapping.
//!
//! FFmpeg's drawtext does not wrap, so cue text is wrapped here using the
//! resolved font's advance widths and drawn with explicit newlines.

use std::path::Path;
use tracing::warn;
use vtext_models::Size;

/// Width of one character, relative to the font size, when no font is loaded.
const ESTIMATED_ADVANCE: f64 = 0.6;
/// Line height relative to the font size when no font is loaded.
const ESTIMATED_LINE_HEIGHT: f64 = 1.25;

pub struct TextMeasurer {
    font: Option<fontdue::Font>,
    px: f32,
}

impl std::fmt::Debug for TextMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextMeasurer")
            .field("px", &self.px)
            .field("estimated", &self.font.is_none())
            .finish()
    }
}

impl TextMeasurer {
    /// Load metrics from a font file, falling back to estimates if it cannot be parsed.
    ///
    /// Returns a warning message alongside the estimating measurer on failure.
    pub fn load(path: &Path, size: u32) -> (Self, Option<String>) {
        let loaded = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| Self::from_bytes(&bytes, size));
        match loaded {
            Ok(measurer) => (measurer, None),
            Err(reason) => {
                warn!(
                    font = %path.display(),
                    error = %reason,
                    "Could not load font metrics, estimating text size"
                );
                let message = format!(
                    "could not read metrics from {} ({}); text size is estimated",
                    path.display(),
                    reason
                );
                (Self::estimate(size), Some(message))
            }
        }
    }

    pub fn from_bytes(bytes: &[u8], size: u32) -> Result<Self, String> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| e.to_string())?;
        Ok(Self {
            font: Some(font),
            px: size as f32,
        })
    }

    /// Measurer that uses fixed per-character estimates.
    pub fn estimate(size: u32) -> Self {
        Self {
            font: None,
            px: size as f32,
        }
    }

    pub fn is_estimated(&self) -> bool {
        self.font.is_none()
    }

    pub fn font(&self) -> Option<&fontdue::Font> {
        self.font.as_ref()
    }

    pub fn px(&self) -> f32 {
        self.px
    }

    pub fn line_width(&self, line: &str) -> f64 {
        match &self.font {
            Some(font) => line
                .chars()
                .map(|c| f64::from(font.metrics(c, self.px).advance_width))
                .sum(),
            None => line.chars().count() as f64 * ESTIMATED_ADVANCE * f64::from(self.px),
        }
    }

    pub fn line_height(&self) -> f64 {
        self.font
            .as_ref()
            .and_then(|font| font.horizontal_line_metrics(self.px))
            .map(|m| f64::from(m.new_line_size))
            .filter(|h| *h > 0.0)
            .unwrap_or(ESTIMATED_LINE_HEIGHT * f64::from(self.px))
    }

    /// Wrap `text` to `max_width`, keeping explicit line breaks.
    ///
    /// Words are never split; a word wider than `max_width` gets its own line.
    pub fn wrap(&self, text: &str, max_width: f64) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                if current.is_empty() {
                    current.push_str(word);
                    continue;
                }
                let candidate = format!("{} {}", current, word);
                if self.line_width(&candidate) <= max_width {
                    current = candidate;
                } else {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                }
            }
            lines.push(current);
        }
        lines
    }

    /// Size of a block of lines, before outline or padding.
    pub fn block_size(&self, lines: &[String]) -> Size {
        let width = lines
            .iter()
            .map(|l| self.line_width(l))
            .fold(0.0_f64, f64::max);
        Size::new(width, self.line_height() * lines.len().max(1) as f64)
    }
}
