//! Transcription error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for transcription operations.
pub type TranscribeResult<T> = Result<T, TranscribeError>;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Audio file not found: {0}")]
    AudioNotFound(PathBuf),

    #[error("Transcription service returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Transcription request rejected with {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid transcription response: {0}")]
    InvalidResponse(String),

    #[error("Whisper CLI failed: {message}")]
    Cli {
        message: String,
        stderr: Option<String>,
    },

    #[error("Transcription timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranscribeError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn cli(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Cli {
            message: message.into(),
            stderr,
        }
    }

    /// Build the error for a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        if status == 429 || status >= 500 {
            Self::Server { status, body }
        } else {
            Self::Rejected { status, body }
        }
    }

    /// Network failures, rate limits and 5xx responses are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranscribeError::Network(e) => !e.is_builder() && !e.is_decode(),
            TranscribeError::Server { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(TranscribeError::from_status(503, "busy").is_retryable());
        assert!(TranscribeError::from_status(429, "slow down").is_retryable());
        assert!(!TranscribeError::from_status(400, "bad file").is_retryable());
        assert!(!TranscribeError::from_status(401, "no key").is_retryable());
        assert!(!TranscribeError::cli("boom", None).is_retryable());
    }
}
