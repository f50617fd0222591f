//! Speech-to-text collaborators for caption mode.
//!
//! Two implementations of [`Transcriber`]:
//! - [`WhisperHttpClient`] for OpenAI-compatible transcription endpoints
//! - [`WhisperCliTranscriber`] for a local `whisper` installation

use async_trait::async_trait;
use std::path::Path;

pub mod cli;
pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use cli::{WhisperCliConfig, WhisperCliTranscriber};
pub use client::{WhisperClientConfig, WhisperHttpClient};
pub use error::{TranscribeError, TranscribeResult};
pub use retry::RetryConfig;
pub use types::Transcript;

/// Turns an audio file into timed words.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Transcribe a 16 kHz mono WAV file.
    async fn transcribe(&self, audio: &Path) -> TranscribeResult<Transcript>;
}
