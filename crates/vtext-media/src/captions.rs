//! Caption segmentation.
//!
//! Groups time-ordered transcript words into display lines bounded by a
//! character limit and a duration limit. Segmentation is lazy: `Segments`
//! borrows the transcript and can be cloned to restart from any point.

use tracing::warn;
use vtext_models::{CaptionLimits, CaptionSegment, TranscriptWord};

/// Splits transcripts into caption segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptionSegmenter {
    limits: CaptionLimits,
}

impl CaptionSegmenter {
    pub fn new(limits: CaptionLimits) -> Self {
        Self { limits }
    }

    pub fn segment<'a>(&self, words: &'a [TranscriptWord]) -> Segments<'a> {
        segment(words, self.limits)
    }
}

/// Segment `words` with the given limits.
pub fn segment(words: &[TranscriptWord], limits: CaptionLimits) -> Segments<'_> {
    Segments {
        words,
        limits,
        pos: 0,
        prev_end: f64::NEG_INFINITY,
    }
}

/// Lazy iterator over caption segments.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    words: &'a [TranscriptWord],
    limits: CaptionLimits,
    pos: usize,
    prev_end: f64,
}

impl<'a> Segments<'a> {
    /// Text of the word at `pos` if it can be displayed.
    ///
    /// Blank words are skipped silently; words with broken timing are
    /// dropped with a warning.
    fn usable(&self, word: &'a TranscriptWord) -> Option<&'a str> {
        let text = word.text.trim();
        if text.is_empty() {
            return None;
        }
        if !word.has_valid_timing() {
            warn!(
                word = text,
                start = word.start,
                end = word.end,
                "Dropping malformed transcript word"
            );
            return None;
        }
        Some(text)
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = CaptionSegment;

    fn next(&mut self) -> Option<CaptionSegment> {
        let (first_text, first) = loop {
            let word = self.words.get(self.pos)?;
            self.pos += 1;
            let Some(text) = self.usable(word) else {
                continue;
            };
            if word.end <= self.prev_end {
                warn!(
                    word = text,
                    end = word.end,
                    previous_end = self.prev_end,
                    "Dropping transcript word that ends inside the previous caption"
                );
                continue;
            }
            break (text, word);
        };

        let start = first.start.max(self.prev_end);
        let mut text = first_text.to_string();
        let mut chars = text.chars().count();
        let mut end = first.end;

        while let Some(word) = self.words.get(self.pos) {
            let Some(word_text) = self.usable(word) else {
                self.pos += 1;
                continue;
            };
            let next_chars = chars + 1 + word_text.chars().count();
            let next_end = end.max(word.end);
            if next_chars > self.limits.max_chars_per_line
                || next_end - start > self.limits.max_segment_duration
            {
                break;
            }
            text.push(' ');
            text.push_str(word_text);
            chars = next_chars;
            end = next_end;
            self.pos += 1;
        }

        self.prev_end = end;
        Some(CaptionSegment { text, start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.words.len().saturating_sub(self.pos)))
    }
}

impl std::iter::FusedIterator for Segments<'_> {}

/// Number of non-blank words whose timing is unusable.
pub fn count_malformed(words: &[TranscriptWord]) -> usize {
    words
        .iter()
        .filter(|w| !w.text.trim().is_empty() && !w.has_valid_timing())
        .count()
}

/// Synthesize word timings from segment-level timestamps.
///
/// Each segment's span is shared among its words in proportion to their
/// character counts.
pub fn words_from_segments(segments: &[CaptionSegment]) -> Vec<TranscriptWord> {
    let mut words = Vec::new();
    for seg in segments {
        let parts: Vec<&str> = seg.text.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if !(seg.start.is_finite() && seg.end.is_finite() && seg.end > seg.start) {
            warn!(
                text = %seg.text,
                start = seg.start,
                end = seg.end,
                "Dropping transcript segment with invalid timing"
            );
            continue;
        }

        let total_chars: usize = parts.iter().map(|p| p.chars().count()).sum();
        let span = seg.end - seg.start;
        let mut cursor = seg.start;
        for (i, part) in parts.iter().enumerate() {
            let end = if i + 1 == parts.len() {
                seg.end
            } else {
                cursor + span * part.chars().count() as f64 / total_chars as f64
            };
            words.push(TranscriptWord::new(*part, cursor, end));
            cursor = end;
        }
    }
    words
}
