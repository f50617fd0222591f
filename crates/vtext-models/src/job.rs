//! Job definitions: requests, validated specs, states and outcomes.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::animation::AnimationSpec;
use crate::caption::CaptionLimits;
use crate::encoding::EncodingConfig;
use crate::error::{check_range, ValidationError, ValidationResult};
use crate::style::{TextStyle, TextStyleRequest};

pub const DEFAULT_PREVIEW_SECS: f64 = 5.0;
pub const MIN_PREVIEW_SECS: f64 = 1.0;
pub const MAX_PREVIEW_SECS: f64 = 60.0;

/// Container extensions accepted as input videos.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Prefix for default output file names.
pub const OUTPUT_PREFIX: &str = "overlay_";

/// Whether `path` has a recognized video extension (case-insensitive).
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for file names and log lines.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Preview a short leading clip or render the whole video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputMode {
    Preview { seconds: f64 },
    Full,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Full
    }
}

impl OutputMode {
    pub fn preview() -> Self {
        OutputMode::Preview {
            seconds: DEFAULT_PREVIEW_SECS,
        }
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, OutputMode::Preview { .. })
    }

    /// Length of the render window for a video of `duration` seconds.
    pub fn window(&self, duration: f64) -> f64 {
        match self {
            OutputMode::Preview { seconds } => seconds.min(duration),
            OutputMode::Full => duration,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Preview { .. } => "preview",
            OutputMode::Full => "full",
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            OutputMode::Preview { seconds } => {
                check_range("preview seconds", *seconds, MIN_PREVIEW_SECS, MAX_PREVIEW_SECS)
            }
            OutputMode::Full => Ok(()),
        }
    }
}

/// Validated text source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSource {
    /// Fixed multi-line text shown for the whole render window.
    Manual { text: String },
    /// Captions transcribed from the audio track.
    Captions { limits: CaptionLimits },
}

impl TextSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextSource::Manual { .. } => "manual",
            TextSource::Captions { .. } => "captions",
        }
    }
}

/// Text source as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSourceRequest {
    Manual {
        text: String,
    },
    Captions {
        #[serde(default)]
        limits: CaptionLimits,
    },
}

impl TextSourceRequest {
    pub fn validate(&self) -> ValidationResult<TextSource> {
        match self {
            TextSourceRequest::Manual { text } => {
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                let text = text.trim_matches(|c: char| c == '\n' || c.is_whitespace());
                if text.is_empty() {
                    return Err(ValidationError::EmptyText);
                }
                Ok(TextSource::Manual {
                    text: text.to_string(),
                })
            }
            TextSourceRequest::Captions { limits } => {
                limits.validate()?;
                Ok(TextSource::Captions { limits: *limits })
            }
        }
    }
}

/// A render request before validation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobRequest {
    /// Input video path
    pub input: PathBuf,

    /// Output path; defaults to `<output_dir>/overlay_<file name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub style: TextStyleRequest,

    pub text: TextSourceRequest,

    #[serde(default)]
    pub animation: AnimationSpec,

    #[serde(default)]
    pub mode: OutputMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<EncodingConfig>,
}

impl JobRequest {
    /// Validate every field and produce an immutable job spec.
    pub fn into_spec(self, default_output_dir: &Path) -> ValidationResult<JobSpec> {
        let file_name = self
            .input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ValidationError::invalid_input("input path has no file name"))?
            .to_string();
        if !is_supported_video(&self.input) {
            return Err(ValidationError::invalid_input(format!(
                "unsupported video container: {} (expected one of {})",
                file_name,
                VIDEO_EXTENSIONS.join(", ")
            )));
        }

        let style = self.style.validate()?;
        let text = self.text.validate()?;
        self.animation.validate()?;
        self.mode.validate()?;

        let output = match self.output {
            Some(path) => path,
            None => default_output_dir.join(default_output_name(&file_name, &self.mode)),
        };
        if output == self.input {
            return Err(ValidationError::invalid_input(
                "output path must differ from the input path",
            ));
        }

        let encoding = self.encoding.unwrap_or_else(|| {
            if self.mode.is_preview() {
                EncodingConfig::for_preview()
            } else {
                EncodingConfig::default()
            }
        });

        Ok(JobSpec {
            id: JobId::new(),
            input: self.input,
            output,
            style,
            text,
            animation: self.animation,
            mode: self.mode,
            encoding,
            created_at: Utc::now(),
        })
    }
}

/// Default output file name for an input file name.
///
/// Full renders keep the container (`overlay_clip.mov`). Previews are always mp4,
/// so a non-mp4 source keeps its extension in the stem (`preview_clip_mov.mp4`)
/// and `clip.mov` never shares a preview with `clip.mp4`.
pub fn default_output_name(file_name: &str, mode: &OutputMode) -> String {
    match mode {
        OutputMode::Full => format!("{}{}", OUTPUT_PREFIX, file_name),
        OutputMode::Preview { .. } => {
            let path = Path::new(file_name);
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(file_name);
            match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if !ext.eq_ignore_ascii_case("mp4") => {
                    format!("preview_{}_{}.mp4", stem, ext.to_ascii_lowercase())
                }
                _ => format!("preview_{}.mp4", stem),
            }
        }
    }
}

/// A validated job, consumed once by the runner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobSpec {
    pub id: JobId,
    pub input: PathBuf,
    pub output: PathBuf,
    pub style: TextStyle,
    pub text: TextSource,
    pub animation: AnimationSpec,
    pub mode: OutputMode,
    pub encoding: EncodingConfig,
    pub created_at: DateTime<Utc>,
}

/// Why a job failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Neither the requested nor the default font could be located
    FontResolution,
    /// Captions were requested but no transcript could be produced
    TranscriptionUnavailable,
    /// The encoder failed
    EncodingFailure,
    /// The job exceeded its time limit
    Timeout,
    /// Bad or unreadable input
    InvalidInput,
    /// The job was cancelled
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::FontResolution => "font_resolution",
            FailureKind::TranscriptionUnavailable => "transcription_unavailable",
            FailureKind::EncodingFailure => "encoding_failure",
            FailureKind::Timeout => "timeout",
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runner state. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Created,
    StyleResolving,
    Composing,
    Encoding,
    Done { output: PathBuf },
    Failed { kind: FailureKind, message: String },
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Created => "created",
            JobState::StyleResolving => "style_resolving",
            JobState::Composing => "composing",
            JobState::Encoding => "encoding",
            JobState::Done { .. } => "done",
            JobState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done { .. } | JobState::Failed { .. })
    }

    /// Whether moving to `next` follows the pipeline order.
    pub fn can_transition_to(&self, next: &JobState) -> bool {
        match (self, next) {
            (current, _) if current.is_terminal() => false,
            (_, JobState::Failed { .. }) => true,
            (JobState::Created, JobState::StyleResolving) => true,
            (JobState::StyleResolving, JobState::Composing) => true,
            (JobState::Composing, JobState::Encoding) => true,
            (JobState::Encoding, JobState::Done { .. }) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub input: PathBuf,
    /// Terminal state
    pub state: JobState,
    /// Every state the job passed through, in order, ending with `state`
    pub transitions: Vec<JobState>,
    /// Recovered problems (font fallbacks, dropped transcript words)
    #[serde(default)]
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.state, JobState::Done { .. })
    }

    pub fn output(&self) -> Option<&Path> {
        match &self.state {
            JobState::Done { output } => Some(output),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<(FailureKind, &str)> {
        match &self.state {
            JobState::Failed { kind, message } => Some((*kind, message.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_request(input: &str) -> JobRequest {
        JobRequest {
            input: PathBuf::from(input),
            output: None,
            style: TextStyleRequest::default(),
            text: TextSourceRequest::Manual {
                text: "Hello\r\nWorld".to_string(),
            },
            animation: AnimationSpec::default(),
            mode: OutputMode::Full,
            encoding: None,
        }
    }

    #[test]
    fn test_into_spec_defaults_output() {
        let spec = manual_request("/videos/Clip.MOV")
            .into_spec(Path::new("/out"))
            .unwrap();
        assert_eq!(spec.output, PathBuf::from("/out/overlay_Clip.MOV"));
        assert_eq!(
            spec.text,
            TextSource::Manual {
                text: "Hello\nWorld".to_string()
            }
        );
    }

    #[test]
    fn test_preview_output_name() {
        let mut request = manual_request("/videos/clip.mkv");
        request.mode = OutputMode::preview();
        let spec = request.into_spec(Path::new("/out")).unwrap();
        assert_eq!(spec.output, PathBuf::from("/out/preview_clip_mkv.mp4"));
        assert_eq!(spec.encoding, EncodingConfig::for_preview());
    }

    #[test]
    fn test_preview_names_keep_sources_apart() {
        let preview = OutputMode::preview();
        assert_eq!(default_output_name("clip.mp4", &preview), "preview_clip.mp4");
        assert_eq!(default_output_name("clip.MP4", &preview), "preview_clip.mp4");
        assert_eq!(default_output_name("clip.MOV", &preview), "preview_clip_mov.mp4");
        assert_ne!(
            default_output_name("clip.mov", &preview),
            default_output_name("clip.mp4", &preview)
        );
    }

    #[test]
    fn test_rejects_invalid_requests() {
        let err = manual_request("/videos/notes.txt")
            .into_spec(Path::new("/out"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInput(_)));

        let mut request = manual_request("/videos/a.mp4");
        request.text = TextSourceRequest::Manual {
            text: "  \n ".to_string(),
        };
        assert_eq!(
            request.into_spec(Path::new("/out")).unwrap_err(),
            ValidationError::EmptyText
        );

        let mut request = manual_request("/videos/a.mp4");
        request.mode = OutputMode::Preview { seconds: 0.5 };
        assert!(request.into_spec(Path::new("/out")).is_err());

        let mut request = manual_request("/videos/a.mp4");
        request.output = Some(PathBuf::from("/videos/a.mp4"));
        assert!(request.into_spec(Path::new("/out")).is_err());
    }

    #[test]
    fn test_mode_window() {
        assert_eq!(OutputMode::preview().window(3.0), 3.0);
        assert_eq!(OutputMode::preview().window(30.0), 5.0);
        assert_eq!(OutputMode::Full.window(30.0), 30.0);
    }

    #[test]
    fn test_state_transitions() {
        assert!(JobState::Created.can_transition_to(&JobState::StyleResolving));
        assert!(!JobState::Created.can_transition_to(&JobState::Encoding));
        assert!(JobState::Composing.can_transition_to(&JobState::Failed {
            kind: FailureKind::Timeout,
            message: String::new(),
        }));
        let done = JobState::Done {
            output: PathBuf::from("x.mp4"),
        };
        assert!(done.is_terminal());
        assert!(!done.can_transition_to(&JobState::Created));
    }

    #[test]
    fn test_request_json() {
        let json = r#"{
            "input": "/in/a.mp4",
            "text": {"kind": "captions"},
            "mode": {"mode": "preview", "seconds": 5},
            "animation": {"direction": "bottom", "duration_secs": 0.6}
        }"#;
        let request: JobRequest = serde_json::from_str(json).unwrap();
        let spec = request.into_spec(Path::new("/out")).unwrap();
        assert_eq!(
            spec.text,
            TextSource::Captions {
                limits: CaptionLimits::default()
            }
        );
        assert!(spec.mode.is_preview());
    }

    #[test]
    fn test_job_id_short() {
        let id = JobId::from_string("0123456789abcdef");
        assert_eq!(id.short(), "01234567");
        assert_eq!(JobId::from_string("abc").short(), "abc");
    }
}
