//! Shared data models for vtext.
//!
//! This crate provides Serde-serializable types for:
//! - Text styles (fonts, colors, outline, shadow, background box)
//! - Slide-in animation specs and resting placements
//! - Transcript words and caption segments
//! - Jobs, job states and failure kinds
//! - Encoding configuration

pub mod animation;
pub mod caption;
pub mod color;
pub mod encoding;
pub mod error;
pub mod geometry;
pub mod job;
pub mod style;

// Re-export common types
pub use animation::{AnimationReplay, AnimationSpec, Placement, SlideDirection};
pub use caption::{CaptionLimits, CaptionSegment, TranscriptWord};
pub use color::Color;
pub use encoding::EncodingConfig;
pub use error::{ValidationError, ValidationResult};
pub use geometry::{OverlayPosition, Point, Size};
pub use job::{
    FailureKind, JobId, JobOutcome, JobRequest, JobSpec, JobState, OutputMode, TextSource,
    TextSourceRequest,
};
pub use style::{
    BackgroundBox, FontFamily, FontSource, FontSlant, FontVariant, FontWeight, Outline, Shadow,
    TextStyle, TextStyleRequest,
};
