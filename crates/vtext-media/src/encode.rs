//! Overlay encoding through FFmpeg.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info};
use vtext_models::{EncodingConfig, OutputMode};

use crate::command::{FfmpegCommand, FfmpegRunner, FfmpegTools};
use crate::compose::RenderPlan;
use crate::drawtext::{build_filter_graph, OUTPUT_LABEL};
use crate::error::MediaResult;
use crate::progress::FfmpegProgress;

/// Name of the filter script inside the scratch directory.
pub const FILTER_SCRIPT_NAME: &str = "overlay.filtergraph";

/// Everything an encode needs.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub plan: RenderPlan,
    /// Where the encoder writes; usually a staged path
    pub output: PathBuf,
    pub mode: OutputMode,
    pub encoding: EncodingConfig,
    /// Job-scoped directory for text files and the filter script
    pub scratch_dir: PathBuf,
    pub has_audio: bool,
    pub timeout_secs: Option<u64>,
    pub cancel: Option<watch::Receiver<bool>>,
}

/// Renders a plan onto a video.
#[async_trait]
pub trait OverlayEncoder: Send + Sync {
    async fn encode(&self, request: EncodeRequest) -> MediaResult<()>;
}

/// Encoder backed by the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegOverlayEncoder {
    tools: FfmpegTools,
}

impl FfmpegOverlayEncoder {
    pub fn new(tools: &FfmpegTools) -> Self {
        Self {
            tools: tools.clone(),
        }
    }

    /// Write the cue text files and filter script, returning the script path.
    pub async fn prepare_graph(plan: &RenderPlan, scratch_dir: &Path) -> MediaResult<PathBuf> {
        let graph = build_filter_graph(plan, scratch_dir);
        for (path, text) in &graph.text_files {
            tokio::fs::write(path, text).await?;
        }
        let script = scratch_dir.join(FILTER_SCRIPT_NAME);
        tokio::fs::write(&script, &graph.script).await?;
        debug!(
            script = %script.display(),
            cues = graph.text_files.len(),
            "Wrote overlay filter graph"
        );
        Ok(script)
    }

    /// Build the ffmpeg command for `request` given the written script.
    pub fn build_command(request: &EncodeRequest, script: &Path) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(&request.input, &request.output);
        if let OutputMode::Preview { seconds } = request.mode {
            cmd = cmd.duration(seconds);
        }
        cmd = cmd
            .filter_complex_script(script)
            .map(format!("[{}]", OUTPUT_LABEL));
        if request.has_audio {
            cmd = cmd.map("0:a?");
        }
        cmd.output_args(request.encoding.to_ffmpeg_args(request.has_audio))
    }
}

#[async_trait]
impl OverlayEncoder for FfmpegOverlayEncoder {
    async fn encode(&self, request: EncodeRequest) -> MediaResult<()> {
        let script = Self::prepare_graph(&request.plan, &request.scratch_dir).await?;
        let cmd = Self::build_command(&request, &script);

        info!(
            input = %request.input.display(),
            output = %request.output.display(),
            mode = request.mode.as_str(),
            cues = request.plan.cues.len(),
            "Encoding overlay"
        );

        let total = request.plan.duration;
        FfmpegRunner::new(&self.tools)
            .with_timeout(request.timeout_secs)
            .with_cancel(request.cancel.clone())
            .run_with_progress(&cmd, move |p: FfmpegProgress| {
                debug!(
                    percent = p.percentage(total),
                    speed = p.speed,
                    "Encode progress"
                );
            })
            .await
    }
}
