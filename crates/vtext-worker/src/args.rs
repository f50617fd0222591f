//! Command-line arguments for the `vtext` binary.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use vtext_models::animation::DEFAULT_ANIMATION_SECS;
use vtext_models::style::DEFAULT_FONT_SIZE;
use vtext_models::{
    AnimationReplay, AnimationSpec, CaptionLimits, EncodingConfig, FontFamily, FontSlant,
    FontVariant, FontWeight, OutputMode, Placement, SlideDirection, TextSourceRequest,
    TextStyleRequest,
};

use crate::batch::JobTemplate;

#[derive(Debug, Parser)]
#[command(name = "vtext", version, about = "Burn styled, animated text into videos")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one video
    Render(RenderArgs),
    /// Render every video in a directory with the same settings
    Batch(BatchArgs),
    /// List the font catalog and how each family resolves on this machine
    Fonts(FontsArgs),
    /// Render a PNG sample of a text style
    Sample(SampleArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Input video
    pub input: PathBuf,

    /// Output file; defaults to `<output-dir>/overlay_<input name>`
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for the default output name
    #[arg(long, env = "VTEXT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub text: TextArgs,

    #[command(flatten)]
    pub style: StyleArgs,

    #[command(flatten)]
    pub animation: AnimationArgs,

    #[command(flatten)]
    pub render: RenderModeArgs,

    /// Print the job outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Directory of input videos
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory for the rendered files
    #[arg(short, long, env = "VTEXT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Videos rendered at once
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub text: TextArgs,

    #[command(flatten)]
    pub style: StyleArgs,

    #[command(flatten)]
    pub animation: AnimationArgs,

    #[command(flatten)]
    pub render: RenderModeArgs,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct FontsArgs {
    #[arg(long)]
    pub bold: bool,

    #[arg(long)]
    pub italic: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// PNG file to write
    #[arg(short, long, default_value = "sample.png")]
    pub output: PathBuf,

    /// Sample text; a pangram is used when omitted
    #[arg(long)]
    pub text: Option<String>,

    #[command(flatten)]
    pub style: StyleArgs,
}

/// Text source flags. Exactly one of `--text`, `--text-file` or `--captions`.
#[derive(Debug, Clone, Args)]
pub struct TextArgs {
    /// Text to burn in; a literal `\n` starts a new line
    #[arg(long, conflicts_with_all = ["text_file", "captions"])]
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(long, value_name = "PATH", conflicts_with = "captions")]
    pub text_file: Option<PathBuf>,

    /// Generate timed captions from the video's speech
    #[arg(long)]
    pub captions: bool,

    /// Caption line length limit
    #[arg(long, requires = "captions")]
    pub max_chars: Option<usize>,

    /// Longest time a caption stays on screen
    #[arg(long, requires = "captions")]
    pub max_segment_secs: Option<f64>,
}

impl TextArgs {
    pub fn to_request(&self, defaults: CaptionLimits) -> anyhow::Result<TextSourceRequest> {
        if self.captions {
            return Ok(TextSourceRequest::Captions {
                limits: CaptionLimits {
                    max_chars_per_line: self.max_chars.unwrap_or(defaults.max_chars_per_line),
                    max_segment_duration: self
                        .max_segment_secs
                        .unwrap_or(defaults.max_segment_duration),
                },
            });
        }

        let text = match (&self.text, &self.text_file) {
            (Some(text), _) => text.replace("\\n", "\n"),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read text file {}", path.display()))?,
            (None, None) => bail!("one of --text, --text-file or --captions is required"),
        };
        Ok(TextSourceRequest::Manual { text })
    }
}

#[derive(Debug, Clone, Args)]
pub struct StyleArgs {
    /// Font family
    #[arg(long, default_value = FontFamily::ARIAL)]
    pub font: String,

    #[arg(long)]
    pub bold: bool,

    #[arg(long)]
    pub italic: bool,

    /// Use this font file instead of a family
    #[arg(long, value_name = "PATH")]
    pub font_file: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_FONT_SIZE)]
    pub size: u32,

    /// Fill color as #RRGGBB
    #[arg(long, default_value = "#FFFFFF")]
    pub color: String,

    /// Outline width in pixels; 0 disables the outline
    #[arg(long, default_value_t = 2)]
    pub outline_width: u32,

    #[arg(long, default_value = "#000000")]
    pub outline_color: String,

    #[arg(long)]
    pub no_shadow: bool,

    #[arg(long, default_value = "#000000")]
    pub shadow_color: String,

    #[arg(long, default_value_t = 0.5)]
    pub shadow_opacity: f32,

    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    pub shadow_dx: i32,

    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    pub shadow_dy: i32,

    /// Draw a background box behind the text
    #[arg(long = "box")]
    pub box_enabled: bool,

    #[arg(long, default_value = "#000000")]
    pub box_color: String,

    #[arg(long, default_value_t = 0.25)]
    pub box_opacity: f32,

    #[arg(long, default_value_t = 16)]
    pub box_padding: u32,
}

impl StyleArgs {
    pub fn to_request(&self) -> TextStyleRequest {
        TextStyleRequest {
            family: self.font.clone(),
            bold: self.bold,
            italic: self.italic,
            custom_font: self.font_file.clone(),
            size: self.size,
            color: self.color.clone(),
            outline_width: self.outline_width,
            outline_color: self.outline_color.clone(),
            shadow_enabled: !self.no_shadow,
            shadow_color: self.shadow_color.clone(),
            shadow_opacity: self.shadow_opacity,
            shadow_dx: self.shadow_dx,
            shadow_dy: self.shadow_dy,
            box_enabled: self.box_enabled,
            box_color: self.box_color.clone(),
            box_opacity: self.box_opacity,
            box_padding: self.box_padding,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct AnimationArgs {
    /// Edge the text slides in from: none, top, bottom, left or right
    #[arg(long, default_value = "none")]
    pub slide_from: SlideDirection,

    /// Slide-in duration in seconds
    #[arg(long, default_value_t = DEFAULT_ANIMATION_SECS)]
    pub slide_secs: f64,

    /// Resting position: center, top, bottom, left or right
    #[arg(long, default_value = "center")]
    pub placement: Placement,

    #[arg(long)]
    pub fade_in: bool,

    /// Replay the slide-in per caption (per_segment) or only at the start (once)
    #[arg(long, default_value = "per_segment")]
    pub replay: AnimationReplay,
}

impl AnimationArgs {
    pub fn to_spec(&self) -> AnimationSpec {
        AnimationSpec {
            direction: self.slide_from,
            duration_secs: self.slide_secs,
            placement: self.placement,
            fade_in: self.fade_in,
            replay: self.replay,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RenderModeArgs {
    /// Render only a short leading clip, 5 seconds unless given
    #[arg(long, value_name = "SECS", num_args = 0..=1, default_missing_value = "5")]
    pub preview: Option<f64>,

    /// x264 quality (lower is better)
    #[arg(long)]
    pub crf: Option<u8>,
}

impl RenderModeArgs {
    pub fn mode(&self) -> OutputMode {
        match self.preview {
            Some(seconds) => OutputMode::Preview { seconds },
            None => OutputMode::Full,
        }
    }

    /// Encoding override; `None` keeps the mode's default settings.
    pub fn encoding(&self) -> Option<EncodingConfig> {
        self.crf.map(|crf| {
            let base = if self.preview.is_some() {
                EncodingConfig::for_preview()
            } else {
                EncodingConfig::default()
            };
            base.with_crf(crf)
        })
    }
}

/// Build a job template from the shared job flags.
pub fn job_template(
    text: &TextArgs,
    style: &StyleArgs,
    animation: &AnimationArgs,
    render: &RenderModeArgs,
    caption_defaults: CaptionLimits,
) -> anyhow::Result<JobTemplate> {
    Ok(JobTemplate {
        style: style.to_request(),
        text: text.to_request(caption_defaults)?,
        animation: animation.to_spec(),
        mode: render.mode(),
        encoding: render.encoding(),
    })
}

impl FontsArgs {
    pub fn variant(&self) -> FontVariant {
        let weight = if self.bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        let slant = if self.italic {
            FontSlant::Italic
        } else {
            FontSlant::Normal
        };
        FontVariant::from_parts(weight, slant)
    }
}
