//! Overlay composition: text source + style + animation into a render plan.

use serde::Serialize;
use vtext_models::{
    AnimationReplay, AnimationSpec, CaptionSegment, OverlayPosition, Size, TextStyle,
};

use crate::animation::{Motion, PLACEMENT_MARGIN};
use crate::fonts::ResolvedFont;
use crate::layout::TextMeasurer;

/// Share of the frame width available to caption lines.
const CAPTION_WIDTH_RATIO: f64 = 0.9;

/// Stroke width used to emulate bold at `size`.
pub fn bold_emphasis(size: u32) -> u32 {
    (size / 24).max(1)
}

/// What to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum CueSource {
    /// One block of text for the whole window.
    Manual(String),
    /// Timed caption lines.
    Captions(Vec<CaptionSegment>),
}

/// One timed overlay in the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayCue {
    /// Wrapped text, lines joined with `\n`
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Outer size including outline, emphasis and box padding
    pub size: Size,
    pub motion: Motion,
}

impl OverlayCue {
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// The overlay at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame<'a> {
    pub text: &'a str,
    pub position: OverlayPosition,
}

/// Time-indexed description of what to draw and where.
#[derive(Debug, Clone, Serialize)]
pub struct RenderPlan {
    pub frame: Size,
    pub fps: f64,
    /// Length of the rendered output in seconds
    pub duration: f64,
    pub style: TextStyle,
    pub font: ResolvedFont,
    /// Offset from a cue's top-left corner to where glyphs start
    pub inset: f64,
    pub cues: Vec<OverlayCue>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Active text and its position at output time `t`.
    pub fn frame_at(&self, t: f64) -> Option<OverlayFrame<'_>> {
        self.cues.iter().find(|c| c.is_active(t)).map(|cue| OverlayFrame {
            text: &cue.text,
            position: cue.motion.position_at(t),
        })
    }
}

/// Builds render plans for one style, font and frame size.
#[derive(Debug)]
pub struct OverlayComposer {
    style: TextStyle,
    font: ResolvedFont,
    measurer: TextMeasurer,
    frame: Size,
    fps: f64,
    warnings: Vec<String>,
}

impl OverlayComposer {
    /// Load metrics for `font` at the style's size.
    pub fn new(style: &TextStyle, font: &ResolvedFont, frame: Size, fps: f64) -> Self {
        let (measurer, warning) = TextMeasurer::load(&font.path, style.size);
        let mut composer = Self::with_measurer(style, font, frame, fps, measurer);
        composer.warnings.extend(warning);
        composer
    }

    pub fn with_measurer(
        style: &TextStyle,
        font: &ResolvedFont,
        frame: Size,
        fps: f64,
        measurer: TextMeasurer,
    ) -> Self {
        Self {
            style: style.clone(),
            font: font.clone(),
            measurer,
            frame,
            fps,
            warnings: Vec::new(),
        }
    }

    /// Problems recovered while preparing the composer.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Distance from the cue box edge to the glyphs.
    fn inset(&self) -> f64 {
        let outline = self.style.outline.map(|o| o.width).unwrap_or(0);
        let emphasis = if self.font.synthetic_bold {
            bold_emphasis(self.style.size)
        } else {
            0
        };
        let padding = self.style.background.map(|b| b.padding).unwrap_or(0);
        f64::from(outline + emphasis + padding)
    }

    /// Build the plan for `window` seconds of output.
    pub fn compose(&self, source: CueSource, animation: &AnimationSpec, window: f64) -> RenderPlan {
        let inset = self.inset();
        let mut cues = Vec::new();

        if window > 0.0 {
            match source {
                CueSource::Manual(text) => {
                    let max_width = self.frame.width - 2.0 * PLACEMENT_MARGIN;
                    let (wrapped, size) = self.layout(&text, max_width, inset);
                    let motion = Motion::plan(animation, self.frame, size, 0.0, window);
                    cues.push(OverlayCue {
                        text: wrapped,
                        start: 0.0,
                        end: window,
                        size,
                        motion,
                    });
                }
                CueSource::Captions(segments) => {
                    let max_width = self.frame.width * CAPTION_WIDTH_RATIO;
                    for segment in segments {
                        if segment.start >= window {
                            break;
                        }
                        let start = segment.start.max(0.0);
                        let end = segment.end.min(window);
                        if end <= start {
                            continue;
                        }
                        let (wrapped, size) = self.layout(&segment.text, max_width, inset);
                        let motion = match animation.replay {
                            AnimationReplay::PerSegment => {
                                Motion::plan(animation, self.frame, size, start, end - start)
                            }
                            AnimationReplay::Once => {
                                Motion::plan(animation, self.frame, size, 0.0, window)
                            }
                        };
                        cues.push(OverlayCue {
                            text: wrapped,
                            start,
                            end,
                            size,
                            motion,
                        });
                    }
                }
            }
        }

        RenderPlan {
            frame: self.frame,
            fps: self.fps,
            duration: window.max(0.0),
            style: self.style.clone(),
            font: self.font.clone(),
            inset,
            cues,
        }
    }

    fn layout(&self, text: &str, max_width: f64, inset: f64) -> (String, Size) {
        let available = (max_width - 2.0 * inset).max(1.0);
        let lines = self.measurer.wrap(text, available);
        let block = self.measurer.block_size(&lines);
        let size = Size::new(block.width + 2.0 * inset, block.height + 2.0 * inset);
        (lines.join("\n"), size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::rest_position;
    use vtext_models::{Placement, SlideDirection, TextStyleRequest};

    const FRAME: Size = Size::new(640.0, 360.0);

    fn composer(style: &TextStyle) -> OverlayComposer {
        let font = ResolvedFont::custom("/fonts/test.ttf", None);
        OverlayComposer::with_measurer(
            style,
            &font,
            FRAME,
            30.0,
            TextMeasurer::estimate(style.size),
        )
    }

    fn plain_style() -> TextStyle {
        TextStyleRequest {
            size: 20,
            outline_width: 0,
            shadow_enabled: false,
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn slide_left(replay: AnimationReplay) -> AnimationSpec {
        AnimationSpec {
            direction: SlideDirection::Left,
            duration_secs: 1.0,
            placement: Placement::Bottom,
            fade_in: false,
            replay,
        }
    }

    fn seg(text: &str, start: f64, end: f64) -> CaptionSegment {
        CaptionSegment {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_manual_text_spans_window() {
        let style = plain_style();
        let plan = composer(&style).compose(
            CueSource::Manual("Hello\nWorld".to_string()),
            &AnimationSpec::at_rest(Placement::Center),
            5.0,
        );
        assert_eq!(plan.cues.len(), 1);
        let cue = &plan.cues[0];
        assert_eq!((cue.start, cue.end), (0.0, 5.0));
        assert_eq!(cue.text, "Hello\nWorld");
        // 12px per character at size 20, two lines of 25px.
        assert_eq!(cue.size, Size::new(60.0, 50.0));
        assert!(plan.frame_at(4.99).is_some());
        assert!(plan.frame_at(5.0).is_none());
    }

    #[test]
    fn test_manual_text_wraps_to_frame() {
        let style = plain_style();
        let text = "word ".repeat(30);
        let plan = composer(&style).compose(
            CueSource::Manual(text),
            &AnimationSpec::default(),
            3.0,
        );
        let cue = &plan.cues[0];
        assert!(cue.text.lines().count() > 1);
        assert!(cue.size.width <= FRAME.width - 2.0 * PLACEMENT_MARGIN);
    }

    #[test]
    fn test_captions_clipped_to_window() {
        let style = plain_style();
        let plan = composer(&style).compose(
            CueSource::Captions(vec![
                seg("one", 0.0, 2.0),
                seg("two", 2.0, 4.0),
                seg("three", 5.0, 6.0),
            ]),
            &slide_left(AnimationReplay::PerSegment),
            3.0,
        );
        assert_eq!(plan.cues.len(), 2);
        assert_eq!(plan.cues[1].end, 3.0);
        assert_eq!(plan.duration, 3.0);
    }

    #[test]
    fn test_per_segment_replay_restarts_motion() {
        let style = plain_style();
        let plan = composer(&style).compose(
            CueSource::Captions(vec![seg("one", 0.0, 2.0), seg("two", 2.0, 2.5)]),
            &slide_left(AnimationReplay::PerSegment),
            10.0,
        );
        let second = &plan.cues[1];
        assert_eq!(second.motion.origin, 2.0);
        // Capped at the cue's own length.
        assert_eq!(second.motion.duration, 0.5);
        let at_start = plan.frame_at(2.0).unwrap();
        assert_eq!(at_start.text, "two");
        assert!(at_start.position.x + second.size.width <= 0.0);
    }

    #[test]
    fn test_once_replay_leaves_later_cues_at_rest() {
        let style = plain_style();
        let plan = composer(&style).compose(
            CueSource::Captions(vec![seg("one", 0.0, 2.0), seg("two", 2.0, 4.0)]),
            &slide_left(AnimationReplay::Once),
            10.0,
        );
        let second = &plan.cues[1];
        assert_eq!(second.motion.origin, 0.0);
        let frame = plan.frame_at(2.0).unwrap();
        let rest = rest_position(Placement::Bottom, FRAME, second.size);
        assert_eq!(frame.position.point(), rest);
    }

    #[test]
    fn test_inset_includes_outline_box_and_emphasis() {
        let style = TextStyleRequest {
            size: 48,
            outline_width: 3,
            box_enabled: true,
            box_padding: 10,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let mut font = ResolvedFont::custom("/fonts/test.ttf", None);
        font.synthetic_bold = true;
        let composer = OverlayComposer::with_measurer(
            &style,
            &font,
            FRAME,
            30.0,
            TextMeasurer::estimate(48),
        );
        let plan = composer.compose(
            CueSource::Manual("x".to_string()),
            &AnimationSpec::default(),
            1.0,
        );
        assert_eq!(plan.inset, 3.0 + 2.0 + 10.0);
    }

    #[test]
    fn test_empty_window_has_no_cues() {
        let style = plain_style();
        let plan = composer(&style).compose(
            CueSource::Manual("hi".to_string()),
            &AnimationSpec::default(),
            0.0,
        );
        assert!(plan.is_empty());
    }
}
