//! Worker error types.

use thiserror::Error;
use vtext_media::{FontResolutionError, MediaError};
use vtext_models::{FailureKind, ValidationError};
use vtext_transcribe::TranscribeError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid job: {0}")]
    Validation(#[from] ValidationError),

    #[error("Font resolution failed: {0}")]
    FontResolution(#[from] FontResolutionError),

    #[error("Transcription unavailable: {0}")]
    TranscriptionUnavailable(String),

    #[error("Transcription failed: {0}")]
    Transcribe(#[from] TranscribeError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Job timed out after {0} seconds")]
    Timeout(u64),

    #[error("Job cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn transcription_unavailable(msg: impl Into<String>) -> Self {
        Self::TranscriptionUnavailable(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Probe failures mean the input is not a usable video.
    pub fn from_probe(err: MediaError) -> Self {
        match err {
            MediaError::Cancelled => Self::Cancelled,
            MediaError::Timeout(secs) => Self::Timeout(secs),
            other => Self::InvalidInput(format!("cannot read video: {}", other.detailed_message())),
        }
    }

    /// Audio extraction failures make captions unavailable.
    pub fn from_audio(err: MediaError) -> Self {
        match err {
            MediaError::Cancelled => Self::Cancelled,
            MediaError::Timeout(secs) => Self::Timeout(secs),
            missing @ MediaError::NoAudioTrack(_) => {
                Self::TranscriptionUnavailable(missing.to_string())
            }
            other => Self::TranscriptionUnavailable(format!(
                "audio extraction failed: {}",
                other.detailed_message()
            )),
        }
    }

    /// The job failure this error maps to.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            WorkerError::InvalidInput(_) | WorkerError::Validation(_) => FailureKind::InvalidInput,
            WorkerError::FontResolution(_) => FailureKind::FontResolution,
            WorkerError::TranscriptionUnavailable(_) | WorkerError::Transcribe(_) => {
                FailureKind::TranscriptionUnavailable
            }
            WorkerError::Media(e) => match e {
                MediaError::Timeout(_) => FailureKind::Timeout,
                MediaError::Cancelled => FailureKind::Cancelled,
                MediaError::Font(_) => FailureKind::FontResolution,
                MediaError::FileNotFound(_) | MediaError::InvalidVideo(_) => {
                    FailureKind::InvalidInput
                }
                _ => FailureKind::EncodingFailure,
            },
            WorkerError::Timeout(_) => FailureKind::Timeout,
            WorkerError::Cancelled => FailureKind::Cancelled,
            WorkerError::ConfigError(_) | WorkerError::Io(_) => FailureKind::EncodingFailure,
        }
    }

    /// Message for job reports, including the encoder's stderr tail when present.
    pub fn report_message(&self) -> String {
        match self {
            WorkerError::Media(e) => e.detailed_message(),
            other => other.to_string(),
        }
    }
}
