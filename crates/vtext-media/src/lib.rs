#![deny(unreachable_patterns)]
//! FFmpeg wrapper and overlay composition for vtext.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout and cancellation
//! - Video probing and audio extraction
//! - Font resolution with synthetic bold/italic fallbacks
//! - Slide-in animation planning and caption segmentation
//! - Render plans and their `drawtext` filter graphs
//! - Staged outputs that never leave partial files behind
//! - Font sample images

pub mod animation;
pub mod audio;
pub mod captions;
pub mod command;
pub mod compose;
pub mod drawtext;
pub mod encode;
pub mod error;
pub mod fonts;
pub mod fs_utils;
pub mod layout;
pub mod probe;
pub mod progress;
pub mod sample;
pub mod staging;

pub use animation::{rest_position, start_position, AnimationPlanner, Motion, PLACEMENT_MARGIN};
pub use audio::{AudioExtractor, FfmpegAudioExtractor};
pub use captions::{count_malformed, segment, words_from_segments, CaptionSegmenter, Segments};
pub use command::{FfmpegCommand, FfmpegRunner, FfmpegTools};
pub use compose::{CueSource, OverlayComposer, OverlayCue, OverlayFrame, RenderPlan};
pub use drawtext::{build_filter_graph, FilterGraph};
pub use encode::{EncodeRequest, FfmpegOverlayEncoder, OverlayEncoder};
pub use error::{MediaError, MediaResult};
pub use fonts::{
    FontDirectoryProvider, FontFallback, FontReport, FontResolutionError, Platform, ResolvedFont,
    StaticFontDirs, StyleResolver, SystemFontDirs, DEFAULT_FALLBACK_FAMILY,
};
pub use fs_utils::move_file;
pub use layout::TextMeasurer;
pub use probe::{FfprobeProber, VideoInfo, VideoProber};
pub use progress::FfmpegProgress;
pub use sample::{render_sample, sample_text};
pub use staging::StagedOutput;
