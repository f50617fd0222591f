//! Transcript words and caption segments.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

pub const DEFAULT_MAX_CHARS_PER_LINE: usize = 42;
pub const DEFAULT_MAX_SEGMENT_SECS: f64 = 5.0;

/// One recognized word with its timing in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TranscriptWord {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Timing is finite and strictly increasing.
    pub fn has_valid_timing(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }
}

/// A timed caption line. `start < end` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl CaptionSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Display limits applied when grouping words into segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CaptionLimits {
    pub max_chars_per_line: usize,
    pub max_segment_duration: f64,
}

impl Default for CaptionLimits {
    fn default() -> Self {
        Self {
            max_chars_per_line: DEFAULT_MAX_CHARS_PER_LINE,
            max_segment_duration: DEFAULT_MAX_SEGMENT_SECS,
        }
    }
}

impl CaptionLimits {
    pub fn new(max_chars_per_line: usize, max_segment_duration: f64) -> Self {
        Self {
            max_chars_per_line,
            max_segment_duration,
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.max_chars_per_line == 0 {
            return Err(ValidationError::invalid_input(
                "max_chars_per_line must be at least 1",
            ));
        }
        if !self.max_segment_duration.is_finite() || self.max_segment_duration <= 0.0 {
            return Err(ValidationError::invalid_input(
                "max_segment_duration must be a positive number of seconds",
            ));
        }
        Ok(())
    }
}
