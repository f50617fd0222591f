//! Client for OpenAI-compatible Whisper transcription APIs.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{TranscribeError, TranscribeResult};
use crate::retry::{with_retry, RetryConfig};
use crate::types::{Transcript, VerboseTranscription};
use crate::Transcriber;

const TRANSCRIPTIONS_PATH: &str = "/v1/audio/transcriptions";

#[derive(Debug, Clone)]
pub struct WhisperClientConfig {
    /// Service root, e.g. `https://api.openai.com`
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub language: Option<String>,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for WhisperClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
            language: None,
            timeout: Duration::from_secs(300),
            retry: RetryConfig::default(),
        }
    }
}

impl WhisperClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let retries = std::env::var("WHISPER_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.retry.max_retries);
        let timeout_secs = std::env::var("WHISPER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.timeout.as_secs());

        Self {
            base_url: std::env::var("WHISPER_API_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("WHISPER_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            model: std::env::var("WHISPER_MODEL").unwrap_or(defaults.model),
            language: std::env::var("WHISPER_LANGUAGE").ok().filter(|l| !l.is_empty()),
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryConfig {
                max_retries: retries,
                ..defaults.retry
            },
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), TRANSCRIPTIONS_PATH)
    }
}

/// Transcriber that uploads audio to a Whisper-compatible HTTP service.
#[derive(Debug, Clone)]
pub struct WhisperHttpClient {
    http: Client,
    config: WhisperClientConfig,
}

impl WhisperHttpClient {
    pub fn new(config: WhisperClientConfig) -> TranscribeResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("vtext-transcribe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &WhisperClientConfig {
        &self.config
    }

    fn form(&self, audio: Vec<u8>, file_name: String) -> TranscribeResult<Form> {
        let part = Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/wav")?;
        let mut form = Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .text("timestamp_granularities[]", "segment");
        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }
        Ok(form)
    }

    async fn send(&self, audio: &[u8], file_name: &str) -> TranscribeResult<Transcript> {
        let mut request = self
            .http
            .post(self.config.endpoint())
            .multipart(self.form(audio.to_vec(), file_name.to_string())?);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::from_status(status.as_u16(), body));
        }

        let body = response.bytes().await?;
        let raw: VerboseTranscription = serde_json::from_slice(&body)
            .map_err(|e| TranscribeError::invalid_response(e.to_string()))?;
        Ok(raw.into())
    }
}

#[async_trait]
impl Transcriber for WhisperHttpClient {
    fn name(&self) -> &'static str {
        "whisper-http"
    }

    async fn transcribe(&self, audio: &Path) -> TranscribeResult<Transcript> {
        if !audio.exists() {
            return Err(TranscribeError::AudioNotFound(audio.to_path_buf()));
        }
        let bytes = tokio::fs::read(audio).await?;
        let file_name = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        info!(
            endpoint = %self.config.endpoint(),
            model = %self.config.model,
            bytes = bytes.len(),
            "Requesting transcription"
        );

        let transcript = with_retry(&self.config.retry, "transcribe", || {
            self.send(&bytes, &file_name)
        })
        .await?;

        debug!(
            words = transcript.words.len(),
            segments = transcript.segments.len(),
            "Transcription received"
        );
        Ok(transcript)
    }
}
