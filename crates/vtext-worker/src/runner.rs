//! Job runner: drives one video through style resolution, composition and encoding.
//!
//! States move strictly forward: `Created → StyleResolving → Composing →
//! Encoding → Done`, or to `Failed` from any non-terminal state. The whole
//! run is bounded by the job timeout and an optional cancellation signal;
//! scratch files live in a per-job `TempDir` and the output is staged next
//! to its final path, so nothing partial survives a failure.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;

use vtext_media::command::wait_for_cancel;
use vtext_media::{
    count_malformed, words_from_segments, AudioExtractor, CaptionSegmenter, CueSource,
    EncodeRequest, FfmpegAudioExtractor, FfmpegOverlayEncoder, FfmpegTools, FfprobeProber,
    FontFallback, OverlayComposer, OverlayEncoder, Platform, ResolvedFont, StagedOutput,
    StyleResolver, SystemFontDirs, VideoInfo, VideoProber,
};
use vtext_models::{
    CaptionLimits, CaptionSegment, JobId, JobOutcome, JobRequest, JobSpec, JobState, TextSource,
};
use vtext_transcribe::{
    Transcriber, WhisperCliConfig, WhisperCliTranscriber, WhisperClientConfig, WhisperHttpClient,
};

use crate::config::{TranscriberKind, WorkerConfig};
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;

/// File name of the extracted audio inside a job's scratch directory.
const AUDIO_FILE_NAME: &str = "audio.wav";

/// External collaborators a job needs.
#[derive(Clone)]
pub struct Collaborators {
    pub prober: Arc<dyn VideoProber>,
    pub resolver: Arc<StyleResolver>,
    pub audio: Arc<dyn AudioExtractor>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub encoder: Arc<dyn OverlayEncoder>,
}

impl Collaborators {
    /// Build the ffmpeg, font and transcription collaborators from config.
    pub fn from_config(config: &WorkerConfig) -> WorkerResult<Self> {
        let tools = FfmpegTools::resolve(config.ffmpeg.as_deref(), config.ffprobe.as_deref())
            .map_err(|e| WorkerError::config_error(e.to_string()))?;

        let transcriber: Option<Arc<dyn Transcriber>> = match config.transcriber {
            TranscriberKind::Http => Some(Arc::new(
                WhisperHttpClient::new(WhisperClientConfig::from_env())
                    .map_err(|e| WorkerError::config_error(e.to_string()))?,
            )),
            TranscriberKind::Cli => Some(Arc::new(WhisperCliTranscriber::new(
                WhisperCliConfig::from_env().with_ffmpeg_dir(tools.bin_dir()),
            ))),
            TranscriberKind::None => None,
        };

        Ok(Self {
            prober: Arc::new(FfprobeProber::new(&tools)),
            resolver: Arc::new(style_resolver(config)),
            audio: Arc::new(FfmpegAudioExtractor::new(&tools)),
            transcriber,
            encoder: Arc::new(FfmpegOverlayEncoder::new(&tools)),
        })
    }
}

/// Font resolver over the bundled directory (when present) and the system font directories.
pub fn style_resolver(config: &WorkerConfig) -> StyleResolver {
    let bundled = config.fonts_dir.clone().filter(|d| d.is_dir());
    StyleResolver::new(
        &SystemFontDirs::new(bundled),
        Platform::current(),
        config.default_family(),
    )
}

/// State history and warnings of one run.
struct Lifecycle {
    logger: JobLogger,
    state: JobState,
    transitions: Vec<JobState>,
    warnings: Vec<String>,
}

impl Lifecycle {
    fn new(logger: JobLogger) -> Self {
        Self {
            logger,
            state: JobState::Created,
            transitions: vec![JobState::Created],
            warnings: Vec::new(),
        }
    }

    fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        self.logger.log_transition(&self.state, &next);
        self.transitions.push(next.clone());
        self.state = next;
    }

    fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.logger.log_warning(&message);
        self.warnings.push(message);
    }
}

/// Runs overlay jobs.
#[derive(Clone)]
pub struct JobRunner {
    config: WorkerConfig,
    collaborators: Collaborators,
}

impl JobRunner {
    pub fn new(config: WorkerConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    pub fn from_config(config: WorkerConfig) -> WorkerResult<Self> {
        let collaborators = Collaborators::from_config(&config)?;
        Ok(Self::new(config, collaborators))
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &StyleResolver {
        &self.collaborators.resolver
    }

    /// Validate `request` and run it, writing default outputs under `output_dir`.
    pub async fn run_request(
        &self,
        request: JobRequest,
        output_dir: &Path,
        cancel: Option<watch::Receiver<bool>>,
    ) -> JobOutcome {
        let input = request.input.clone();
        match request.into_spec(output_dir) {
            Ok(spec) => self.run(spec, cancel).await,
            Err(e) => {
                let err = WorkerError::from(e);
                tracing::warn!(input = %input.display(), error = %err, "Rejected job request");
                rejected(input, &err)
            }
        }
    }

    /// Run a validated job to a terminal state.
    pub async fn run(&self, spec: JobSpec, cancel: Option<watch::Receiver<bool>>) -> JobOutcome {
        let logger = JobLogger::new(&spec.id, "overlay");
        let span = logger.create_span();
        self.run_logged(spec, cancel, logger).instrument(span).await
    }

    async fn run_logged(
        &self,
        spec: JobSpec,
        cancel: Option<watch::Receiver<bool>>,
        logger: JobLogger,
    ) -> JobOutcome {
        let started_at = Utc::now();
        let started = Instant::now();
        logger.log_start(&format!(
            "{} -> {} ({}, {} text)",
            spec.input.display(),
            spec.output.display(),
            spec.mode.as_str(),
            spec.text.as_str()
        ));

        let mut lifecycle = Lifecycle::new(logger);
        let limit = self.config.job_timeout;

        let result = {
            let work =
                tokio::time::timeout(limit, self.execute(&spec, &mut lifecycle, cancel.clone()));
            let cancelled = async {
                match cancel {
                    Some(rx) => wait_for_cancel(rx).await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                finished = work => finished.unwrap_or(Err(WorkerError::Timeout(limit.as_secs()))),
                _ = cancelled => Err(WorkerError::Cancelled),
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        let failure = match result {
            Ok(output) => {
                lifecycle
                    .logger
                    .log_completion(&format!("{} in {:.1}s", output.display(), elapsed));
                lifecycle.advance(JobState::Done { output });
                None
            }
            Err(e) => {
                let kind = e.failure_kind();
                let message = e.report_message();
                lifecycle.logger.log_error(&format!("{}: {}", kind, message));
                lifecycle.advance(JobState::Failed { kind, message });
                Some(kind)
            }
        };
        metrics::record_job(&spec.mode, failure, elapsed);

        JobOutcome {
            job_id: spec.id,
            input: spec.input,
            state: lifecycle.state,
            transitions: lifecycle.transitions,
            warnings: lifecycle.warnings,
            started_at,
            elapsed_secs: elapsed,
        }
    }

    async fn execute(
        &self,
        spec: &JobSpec,
        lifecycle: &mut Lifecycle,
        cancel: Option<watch::Receiver<bool>>,
    ) -> WorkerResult<PathBuf> {
        lifecycle.advance(JobState::StyleResolving);
        let font = self.resolve_font(spec, lifecycle)?;

        lifecycle.advance(JobState::Composing);
        if !spec.input.is_file() {
            return Err(WorkerError::invalid_input(format!(
                "input video not found: {}",
                spec.input.display()
            )));
        }
        let info = self
            .collaborators
            .prober
            .probe(&spec.input)
            .await
            .map_err(WorkerError::from_probe)?;
        let window = spec.mode.window(info.duration);
        lifecycle.logger.log_progress(&format!(
            "{}x{} @ {:.2} fps, {:.2}s, rendering {:.2}s",
            info.width, info.height, info.fps, info.duration, window
        ));

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix(&format!("job-{}-", spec.id.short()))
            .tempdir_in(&self.config.work_dir)?;

        let source = match &spec.text {
            TextSource::Manual { text } => CueSource::Manual(text.clone()),
            TextSource::Captions { limits } => CueSource::Captions(
                self.captions(
                    spec,
                    &info,
                    window,
                    *limits,
                    scratch.path(),
                    lifecycle,
                    cancel.clone(),
                )
                .await?,
            ),
        };

        let composer = OverlayComposer::new(&spec.style, &font, info.frame_size(), info.fps);
        for warning in composer.warnings() {
            lifecycle.warn(warning.clone());
        }
        let plan = composer.compose(source, &spec.animation, window);
        lifecycle
            .logger
            .log_progress(&format!("render plan has {} cue(s)", plan.cues.len()));

        lifecycle.advance(JobState::Encoding);
        let staged = StagedOutput::new(&spec.output).await?;
        let timeout_secs = spec
            .mode
            .is_preview()
            .then(|| self.config.preview_timeout.as_secs());

        self.collaborators
            .encoder
            .encode(EncodeRequest {
                input: spec.input.clone(),
                plan,
                output: staged.path().to_path_buf(),
                mode: spec.mode,
                encoding: spec.encoding.clone(),
                scratch_dir: scratch.path().to_path_buf(),
                has_audio: info.has_audio,
                timeout_secs,
                cancel,
            })
            .await?;

        Ok(staged.promote().await?)
    }

    fn resolve_font(
        &self,
        spec: &JobSpec,
        lifecycle: &mut Lifecycle,
    ) -> WorkerResult<ResolvedFont> {
        let font = self.collaborators.resolver.resolve(&spec.style.font)?;
        match &font.fallback {
            Some(FontFallback::Substitute { .. }) => metrics::record_font_fallback("substitute"),
            Some(FontFallback::DefaultFamily { .. }) => {
                metrics::record_font_fallback("default_family")
            }
            None => {}
        }
        for warning in font.warnings() {
            lifecycle.warn(warning);
        }
        lifecycle.logger.log_progress(&format!(
            "font {} ({}{}{})",
            font.path.display(),
            font.face,
            if font.synthetic_bold { ", synthetic bold" } else { "" },
            if font.synthetic_italic { ", synthetic italic" } else { "" },
        ));
        Ok(font)
    }

    #[allow(clippy::too_many_arguments)]
    async fn captions(
        &self,
        spec: &JobSpec,
        info: &VideoInfo,
        window: f64,
        limits: CaptionLimits,
        scratch: &Path,
        lifecycle: &mut Lifecycle,
        cancel: Option<watch::Receiver<bool>>,
    ) -> WorkerResult<Vec<CaptionSegment>> {
        let transcriber = self.collaborators.transcriber.as_ref().ok_or_else(|| {
            WorkerError::transcription_unavailable("no transcription service is configured")
        })?;
        if !info.has_audio {
            return Err(WorkerError::from_audio(vtext_media::MediaError::NoAudioTrack(
                spec.input.clone(),
            )));
        }

        let audio = scratch.join(AUDIO_FILE_NAME);
        let max_secs = spec.mode.is_preview().then_some(window);
        self.collaborators
            .audio
            .extract(&spec.input, &audio, max_secs, cancel)
            .await
            .map_err(WorkerError::from_audio)?;

        lifecycle
            .logger
            .log_progress(&format!("transcribing with {}", transcriber.name()));
        let transcript = transcriber.transcribe(&audio).await?;

        let words = if transcript.has_word_timing() {
            transcript.words
        } else {
            lifecycle
                .warn("transcript has no word timestamps; word timing estimated from segments");
            words_from_segments(&transcript.segments)
        };

        let malformed = count_malformed(&words);
        if malformed > 0 {
            metrics::record_dropped_words(malformed);
            lifecycle.warn(format!("dropped {} transcript word(s) with invalid timing", malformed));
        }

        let segments: Vec<CaptionSegment> = CaptionSegmenter::new(limits).segment(&words).collect();
        if segments.is_empty() {
            lifecycle.warn("transcript contains no words; no captions will be drawn");
        }
        Ok(segments)
    }
}

/// Outcome for a request that failed validation before it could run.
pub fn rejected(input: PathBuf, err: &WorkerError) -> JobOutcome {
    let state = JobState::Failed {
        kind: err.failure_kind(),
        message: err.report_message(),
    };
    JobOutcome {
        job_id: JobId::new(),
        input,
        transitions: vec![JobState::Created, state.clone()],
        state,
        warnings: Vec::new(),
        started_at: Utc::now(),
        elapsed_secs: 0.0,
    }
}
