//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use vtext_media::DEFAULT_FALLBACK_FAMILY;
use vtext_models::{CaptionLimits, FontFamily};

/// Which transcription backend caption jobs use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriberKind {
    /// OpenAI-compatible HTTP API
    #[default]
    Http,
    /// Local `whisper` CLI
    Cli,
    /// Caption jobs fail with `TranscriptionUnavailable`
    None,
}

impl FromStr for TranscriberKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "api" => Ok(TranscriberKind::Http),
            "cli" | "local" => Ok(TranscriberKind::Cli),
            "none" | "off" | "" => Ok(TranscriberKind::None),
            other => Err(format!("unknown transcriber '{}' (expected http, cli or none)", other)),
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Parent of per-job scratch directories
    pub work_dir: PathBuf,
    /// Default destination for outputs without an explicit path
    pub output_dir: PathBuf,
    /// Maximum concurrent jobs in batch mode
    pub max_concurrent_jobs: usize,
    /// Whole-job time limit
    pub job_timeout: Duration,
    /// Encode time limit for preview renders
    pub preview_timeout: Duration,
    /// ffmpeg path or name; `PATH` lookup when unset
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    /// Bundled font directory searched ahead of system fonts
    pub fonts_dir: Option<PathBuf>,
    /// Family used when a requested one is missing; `None` disables the fallback
    pub default_font: Option<String>,
    pub transcriber: TranscriberKind,
    pub caption_limits: CaptionLimits,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("vtext"),
            output_dir: PathBuf::from("output"),
            max_concurrent_jobs: 2,
            job_timeout: Duration::from_secs(3600),
            preview_timeout: Duration::from_secs(120),
            ffmpeg: None,
            ffprobe: None,
            fonts_dir: Some(PathBuf::from("fonts")),
            default_font: Some(DEFAULT_FALLBACK_FAMILY.to_string()),
            transcriber: TranscriberKind::default(),
            caption_limits: CaptionLimits::default(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_font = match std::env::var("VTEXT_DEFAULT_FONT") {
            Ok(v) if v.trim().eq_ignore_ascii_case("none") => None,
            Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
            _ => defaults.default_font,
        };

        Self {
            work_dir: env_path("VTEXT_WORK_DIR").unwrap_or(defaults.work_dir),
            output_dir: env_path("VTEXT_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            max_concurrent_jobs: env_parse::<usize>("VTEXT_MAX_JOBS")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent_jobs),
            job_timeout: env_parse("VTEXT_JOB_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.job_timeout),
            preview_timeout: env_parse("VTEXT_PREVIEW_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.preview_timeout),
            ffmpeg: env_path("VTEXT_FFMPEG"),
            ffprobe: env_path("VTEXT_FFPROBE"),
            fonts_dir: env_path("VTEXT_FONTS_DIR").or(defaults.fonts_dir),
            default_font,
            transcriber: env_parse("VTEXT_TRANSCRIBER").unwrap_or(defaults.transcriber),
            caption_limits: CaptionLimits {
                max_chars_per_line: env_parse::<usize>("VTEXT_MAX_CHARS_PER_LINE")
                    .filter(|n| *n > 0)
                    .unwrap_or(defaults.caption_limits.max_chars_per_line),
                max_segment_duration: env_parse::<f64>("VTEXT_MAX_SEGMENT_SECS")
                    .filter(|s| s.is_finite() && *s > 0.0)
                    .unwrap_or(defaults.caption_limits.max_segment_duration),
            },
        }
    }

    /// The configured default family, if any.
    pub fn default_family(&self) -> Option<FontFamily> {
        self.default_font
            .as_deref()
            .and_then(|name| FontFamily::new(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcriber_kind_parse() {
        assert_eq!("HTTP".parse::<TranscriberKind>().unwrap(), TranscriberKind::Http);
        assert_eq!("cli".parse::<TranscriberKind>().unwrap(), TranscriberKind::Cli);
        assert_eq!("none".parse::<TranscriberKind>().unwrap(), TranscriberKind::None);
        assert!("vosk".parse::<TranscriberKind>().is_err());
    }

    #[test]
    fn test_default_family() {
        let config = WorkerConfig::default();
        assert_eq!(
            config.default_family().map(|f| f.to_string()),
            Some("DejaVu Sans".to_string())
        );

        let disabled = WorkerConfig {
            default_font: None,
            ..Default::default()
        };
        assert!(disabled.default_family().is_none());
    }
}
