//! Transcription through a locally installed `whisper` CLI.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{TranscribeError, TranscribeResult};
use crate::types::{Transcript, VerboseTranscription};
use crate::Transcriber;

pub const DEFAULT_CLI_MODEL: &str = "base";

#[derive(Debug, Clone)]
pub struct WhisperCliConfig {
    /// `whisper` executable, as a path or a name looked up on `PATH`
    pub binary: PathBuf,
    pub model: String,
    pub language: Option<String>,
    /// Directory holding `ffmpeg`, prepended to the child's `PATH`
    pub ffmpeg_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Default for WhisperCliConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("whisper"),
            model: DEFAULT_CLI_MODEL.to_string(),
            language: None,
            ffmpeg_dir: None,
            timeout: None,
        }
    }
}

impl WhisperCliConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            binary: std::env::var("WHISPER_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.binary),
            model: std::env::var("WHISPER_CLI_MODEL").unwrap_or(defaults.model),
            language: std::env::var("WHISPER_LANGUAGE").ok().filter(|l| !l.is_empty()),
            ffmpeg_dir: None,
            timeout: std::env::var("WHISPER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
        }
    }

    pub fn with_ffmpeg_dir(mut self, dir: Option<&Path>) -> Self {
        self.ffmpeg_dir = dir.map(Path::to_path_buf);
        self
    }
}

#[derive(Debug, Clone)]
pub struct WhisperCliTranscriber {
    config: WhisperCliConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: WhisperCliConfig) -> Self {
        Self { config }
    }

    pub fn build_args(&self, audio: &Path, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            audio.as_os_str().to_owned(),
            "--model".into(),
            self.config.model.clone().into(),
            "--word_timestamps".into(),
            "True".into(),
            "--output_format".into(),
            "json".into(),
            "--output_dir".into(),
            output_dir.as_os_str().to_owned(),
            "--verbose".into(),
            "False".into(),
        ];
        if let Some(language) = &self.config.language {
            args.push("--language".into());
            args.push(language.clone().into());
        }
        args
    }

    /// `PATH` for the child: the ffmpeg directory first, then the inherited entries.
    fn child_path(&self) -> Option<OsString> {
        let dir = self.config.ffmpeg_dir.as_ref()?;
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = std::iter::once(dir.clone()).chain(std::env::split_paths(&inherited));
        std::env::join_paths(dirs).ok()
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    fn name(&self) -> &'static str {
        "whisper-cli"
    }

    async fn transcribe(&self, audio: &Path) -> TranscribeResult<Transcript> {
        if !audio.exists() {
            return Err(TranscribeError::AudioNotFound(audio.to_path_buf()));
        }
        let output_dir = tempfile::TempDir::new()?;
        let args = self.build_args(audio, output_dir.path());

        info!(
            binary = %self.config.binary.display(),
            model = %self.config.model,
            "Running whisper CLI"
        );

        let mut cmd = Command::new(&self.config.binary);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = self.child_path() {
            cmd.env("PATH", path);
        }

        let child = cmd.spawn().map_err(|e| {
            TranscribeError::cli(
                format!("failed to start {}: {}", self.config.binary.display(), e),
                None,
            )
        })?;

        let output = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| TranscribeError::Timeout(limit.as_secs()))??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TranscribeError::cli(
                format!("whisper exited with {}", output.status),
                Some(stderr).filter(|s| !s.is_empty()),
            ));
        }

        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let json_path = output_dir.path().join(format!("{}.json", stem));
        let body = tokio::fs::read(&json_path).await.map_err(|e| {
            TranscribeError::invalid_response(format!(
                "whisper produced no {}: {}",
                json_path.display(),
                e
            ))
        })?;
        let transcript = parse_cli_output(&body)?;
        debug!(words = transcript.words.len(), "Whisper CLI transcription parsed");
        Ok(transcript)
    }
}

/// Parse the JSON file written by `whisper --output_format json`.
pub fn parse_cli_output(body: &[u8]) -> TranscribeResult<Transcript> {
    let raw: VerboseTranscription = serde_json::from_slice(body)
        .map_err(|e| TranscribeError::invalid_response(e.to_string()))?;
    Ok(raw.into())
}
