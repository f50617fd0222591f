//! Slide-in animation settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{check_range, ValidationError, ValidationResult};

/// Longest accepted slide-in duration in seconds.
pub const MAX_ANIMATION_SECS: f64 = 30.0;

/// Default slide-in duration used by the interactive tool.
pub const DEFAULT_ANIMATION_SECS: f64 = 0.6;

/// Edge the overlay slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlideDirection {
    #[default]
    None,
    Top,
    Bottom,
    Left,
    Right,
}

impl SlideDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideDirection::None => "none",
            SlideDirection::Top => "top",
            SlideDirection::Bottom => "bottom",
            SlideDirection::Left => "left",
            SlideDirection::Right => "right",
        }
    }
}

impl fmt::Display for SlideDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlideDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(SlideDirection::None),
            "top" => Ok(SlideDirection::Top),
            "bottom" => Ok(SlideDirection::Bottom),
            "left" => Ok(SlideDirection::Left),
            "right" => Ok(SlideDirection::Right),
            other => Err(ValidationError::unknown("slide direction", other)),
        }
    }
}

/// Where the overlay rests once the slide-in completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Center => "center",
            Placement::Top => "top",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Right => "right",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" => Ok(Placement::Center),
            "top" => Ok(Placement::Top),
            "bottom" => Ok(Placement::Bottom),
            "left" => Ok(Placement::Left),
            "right" => Ok(Placement::Right),
            other => Err(ValidationError::unknown("placement", other)),
        }
    }
}

/// How the slide-in repeats across caption cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimationReplay {
    /// Restart the slide-in at every cue's start.
    #[default]
    PerSegment,
    /// Animate once from the start of the output; later cues appear at rest.
    Once,
}

impl FromStr for AnimationReplay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_segment" => Ok(AnimationReplay::PerSegment),
            "once" => Ok(AnimationReplay::Once),
            other => Err(ValidationError::unknown("animation replay", other)),
        }
    }
}

/// Slide-in animation for the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnimationSpec {
    pub direction: SlideDirection,
    pub duration_secs: f64,
    pub placement: Placement,
    pub fade_in: bool,
    pub replay: AnimationReplay,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            direction: SlideDirection::None,
            duration_secs: DEFAULT_ANIMATION_SECS,
            placement: Placement::Center,
            fade_in: false,
            replay: AnimationReplay::PerSegment,
        }
    }
}

impl AnimationSpec {
    /// A static overlay at `placement`.
    pub fn at_rest(placement: Placement) -> Self {
        Self {
            direction: SlideDirection::None,
            duration_secs: 0.0,
            placement,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        check_range("animation duration", self.duration_secs, 0.0, MAX_ANIMATION_SECS)
    }

    /// Whether the overlay moves or fades at all.
    pub fn is_animated(&self) -> bool {
        self.duration_secs > 0.0 && (self.direction != SlideDirection::None || self.fade_in)
    }
}
