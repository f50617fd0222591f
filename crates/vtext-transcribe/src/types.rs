//! Transcript types and the response formats they are parsed from.

use serde::{Deserialize, Serialize};
use vtext_models::{CaptionSegment, TranscriptWord};

/// Output of a transcription.
///
/// `words` is empty when the recognizer only produced segment timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub words: Vec<TranscriptWord>,
    #[serde(default)]
    pub segments: Vec<CaptionSegment>,
}

impl Transcript {
    pub fn has_word_timing(&self) -> bool {
        !self.words.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.segments.iter().all(|s| s.text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawSegment {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub text: String,
    /// Present in the whisper CLI output with `--word_timestamps True`
    #[serde(default)]
    pub words: Vec<RawWord>,
}

/// `verbose_json` body from an OpenAI-compatible transcription endpoint,
/// and the JSON file written by the whisper CLI. Both share this shape;
/// the API puts words at the top level, the CLI nests them in segments.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VerboseTranscription {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub words: Vec<RawWord>,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

impl From<VerboseTranscription> for Transcript {
    fn from(raw: VerboseTranscription) -> Self {
        let mut words: Vec<TranscriptWord> = raw
            .words
            .into_iter()
            .map(|w| TranscriptWord::new(w.word.trim(), w.start, w.end))
            .collect();
        if words.is_empty() {
            words = raw
                .segments
                .iter()
                .flat_map(|s| s.words.iter())
                .map(|w| TranscriptWord::new(w.word.trim(), w.start, w.end))
                .collect();
        }
        let segments = raw
            .segments
            .into_iter()
            .map(|s| CaptionSegment {
                text: s.text.trim().to_string(),
                start: s.start,
                end: s.end,
            })
            .collect();
        Transcript {
            text: raw.text.trim().to_string(),
            language: raw.language,
            words,
            segments,
        }
    }
}
