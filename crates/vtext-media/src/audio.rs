//! Audio extraction for transcription.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::watch;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner, FfmpegTools};
use crate::error::MediaResult;

/// Sample rate expected by Whisper-style recognizers.
pub const TRANSCRIPTION_SAMPLE_RATE: u32 = 16_000;

/// Extracts the audio track of a video to a WAV file.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Write mono 16 kHz PCM audio of `input` to `output`.
    ///
    /// `max_secs` limits extraction to the leading part of the input.
    async fn extract(
        &self,
        input: &Path,
        output: &Path,
        max_secs: Option<f64>,
        cancel: Option<watch::Receiver<bool>>,
    ) -> MediaResult<()>;
}

#[derive(Debug, Clone)]
pub struct FfmpegAudioExtractor {
    tools: FfmpegTools,
}

impl FfmpegAudioExtractor {
    pub fn new(tools: &FfmpegTools) -> Self {
        Self {
            tools: tools.clone(),
        }
    }

    pub fn build_command(input: &Path, output: &Path, max_secs: Option<f64>) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(input, output);
        if let Some(secs) = max_secs {
            cmd = cmd.duration(secs);
        }
        cmd.output_args([
            "-vn".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            TRANSCRIPTION_SAMPLE_RATE.to_string(),
            "-c:a".to_string(),
            "pcm_s16le".to_string(),
        ])
    }
}

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    async fn extract(
        &self,
        input: &Path,
        output: &Path,
        max_secs: Option<f64>,
        cancel: Option<watch::Receiver<bool>>,
    ) -> MediaResult<()> {
        info!(input = %input.display(), "Extracting audio for transcription");
        let cmd = Self::build_command(input, output, max_secs);
        FfmpegRunner::new(&self.tools)
            .with_cancel(cancel)
            .run(&cmd)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_command() {
        let args = FfmpegAudioExtractor::build_command(
            Path::new("in.mov"),
            Path::new("audio.wav"),
            Some(5.0),
        )
        .build_args();
        assert!(args.windows(2).any(|w| w == ["-t", "5.000"]));
        assert!(args.windows(2).any(|w| w == ["-ar", "16000"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "pcm_s16le"]));
        assert!(args.contains(&"-vn".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("audio.wav"));
    }

    #[test]
    fn test_full_length_extract() {
        let args =
            FfmpegAudioExtractor::build_command(Path::new("in.mov"), Path::new("a.wav"), None)
                .build_args();
        assert!(!args.contains(&"-t".to_string()));
    }
}
