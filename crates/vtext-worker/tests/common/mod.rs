//! Fake collaborators for runner and batch tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

use vtext_media::{
    AudioExtractor, EncodeRequest, MediaError, MediaResult, OverlayEncoder, StyleResolver,
    VideoInfo, VideoProber,
};
use vtext_models::{FontFamily, TranscriptWord};
use vtext_transcribe::{Transcriber, TranscribeError, TranscribeResult, Transcript};
use vtext_worker::{Collaborators, JobRunner, WorkerConfig};

pub struct FakeProber {
    pub has_audio: bool,
}

#[async_trait]
impl VideoProber for FakeProber {
    async fn probe(&self, path: &Path) -> MediaResult<VideoInfo> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        Ok(VideoInfo {
            duration: 12.0,
            width: 1280,
            height: 720,
            fps: 30.0,
            codec: "h264".to_string(),
            has_audio: self.has_audio,
        })
    }
}

#[derive(Default)]
pub struct FakeAudio {
    pub calls: Mutex<Vec<Option<f64>>>,
}

#[async_trait]
impl AudioExtractor for FakeAudio {
    async fn extract(
        &self,
        _input: &Path,
        output: &Path,
        max_secs: Option<f64>,
        _cancel: Option<watch::Receiver<bool>>,
    ) -> MediaResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(max_secs);
        }
        tokio::fs::write(output, b"RIFF").await?;
        Ok(())
    }
}

pub enum FakeTranscriber {
    Words(Vec<TranscriptWord>),
    Down,
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn transcribe(&self, audio: &Path) -> TranscribeResult<Transcript> {
        assert!(audio.exists(), "audio should be extracted first");
        match self {
            FakeTranscriber::Words(words) => Ok(Transcript {
                text: words
                    .iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
                language: Some("en".to_string()),
                words: words.clone(),
                segments: Vec::new(),
            }),
            FakeTranscriber::Down => Err(TranscribeError::from_status(503, "service unavailable")),
        }
    }
}

/// Records requests and writes a placeholder file to the requested output.
#[derive(Default)]
pub struct FakeEncoder {
    /// Inputs whose file name contains this string fail to encode
    pub fail_for: Option<String>,
    pub delay: Option<Duration>,
    pub requests: Mutex<Vec<EncodeRequest>>,
}

impl FakeEncoder {
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn last_request(&self) -> Option<EncodeRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

#[async_trait]
impl OverlayEncoder for FakeEncoder {
    async fn encode(&self, request: EncodeRequest) -> MediaResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self.fail_for.as_ref().is_some_and(|needle| {
            request
                .input
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(needle.as_str()))
        });
        if failing {
            tokio::fs::write(&request.output, b"partial").await?;
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with status 1",
                Some("Error while decoding stream".to_string()),
                Some(1),
            ));
        }

        tokio::fs::write(&request.output, b"encoded").await?;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Ok(())
    }
}

/// Temporary workspace with a font directory, an input directory and an output directory.
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("fonts")).unwrap();
        std::fs::create_dir_all(root.path().join("in")).unwrap();
        // Font file names are what the resolver indexes; the contents are never parsed here.
        std::fs::write(root.path().join("fonts/DejaVuSans.ttf"), b"not a real font").unwrap();
        Self { root }
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.root.path().join("fonts")
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.path().join("in")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.path().join("work")
    }

    /// Create an input video placeholder.
    pub fn video(&self, name: &str) -> PathBuf {
        let path = self.input_dir().join(name);
        std::fs::write(&path, b"video").unwrap();
        path
    }

    pub fn config(&self) -> WorkerConfig {
        WorkerConfig {
            work_dir: self.work_dir(),
            output_dir: self.output_dir(),
            fonts_dir: Some(self.fonts_dir()),
            ..Default::default()
        }
    }

    pub fn runner(
        &self,
        config: WorkerConfig,
        transcriber: Option<FakeTranscriber>,
        encoder: Arc<FakeEncoder>,
        has_audio: bool,
    ) -> JobRunner {
        let collaborators = Collaborators {
            prober: Arc::new(FakeProber { has_audio }),
            resolver: Arc::new(StyleResolver::from_dirs(
                &[self.fonts_dir()],
                Some(FontFamily::named(FontFamily::DEJAVU_SANS)),
            )),
            audio: Arc::new(FakeAudio::default()),
            transcriber: transcriber.map(|t| Arc::new(t) as Arc<dyn Transcriber>),
            encoder,
        };
        JobRunner::new(config, collaborators)
    }

    /// Files left in the output directory, sorted.
    pub fn outputs(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.output_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Scratch directories left under the work directory.
    pub fn scratch_dirs(&self) -> usize {
        std::fs::read_dir(self.work_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn words(items: &[(&str, f64, f64)]) -> Vec<TranscriptWord> {
    items
        .iter()
        .map(|(text, start, end)| TranscriptWord::new(*text, *start, *end))
        .collect()
}
