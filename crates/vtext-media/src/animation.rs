//! Slide-in animation planning.
//!
//! Everything here is pure: the same inputs always give the same position,
//! so positions can be evaluated per frame or turned into FFmpeg expressions.

use serde::Serialize;
use vtext_models::{AnimationSpec, OverlayPosition, Placement, Point, Size, SlideDirection};

/// Distance in pixels between a resting overlay and the frame edge.
pub const PLACEMENT_MARGIN: f64 = 24.0;

/// Resting top-left corner of an overlay of `overlay` size inside `frame`.
pub fn rest_position(placement: Placement, frame: Size, overlay: Size) -> Point {
    let centered_x = (frame.width - overlay.width) / 2.0;
    let centered_y = (frame.height - overlay.height) / 2.0;
    let (x, y) = match placement {
        Placement::Center => (centered_x, centered_y),
        Placement::Top => (centered_x, PLACEMENT_MARGIN),
        Placement::Bottom => (centered_x, frame.height - overlay.height - PLACEMENT_MARGIN),
        Placement::Left => (PLACEMENT_MARGIN, centered_y),
        Placement::Right => (frame.width - overlay.width - PLACEMENT_MARGIN, centered_y),
    };
    Point::new(x.max(PLACEMENT_MARGIN), y.max(PLACEMENT_MARGIN))
}

/// Off-screen start for a slide from `direction` towards `rest`.
///
/// The overlay is fully outside the frame on the entry axis. The other axis
/// keeps its resting coordinate, so motion is a straight line.
pub fn start_position(direction: SlideDirection, rest: Point, frame: Size, overlay: Size) -> Point {
    match direction {
        SlideDirection::None => rest,
        SlideDirection::Top => Point::new(rest.x, (-overlay.height).min(rest.y)),
        SlideDirection::Bottom => Point::new(rest.x, frame.height.max(rest.y)),
        SlideDirection::Left => Point::new((-overlay.width).min(rest.x), rest.y),
        SlideDirection::Right => Point::new(frame.width.max(rest.x), rest.y),
    }
}

/// A linear motion from `start` to `rest` beginning at `origin` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Motion {
    pub start: Point,
    pub rest: Point,
    /// Output time at which the motion begins
    pub origin: f64,
    pub duration: f64,
    pub fade_in: bool,
}

impl Motion {
    /// An overlay that never moves.
    pub fn fixed(rest: Point) -> Self {
        Self {
            start: rest,
            rest,
            origin: 0.0,
            duration: 0.0,
            fade_in: false,
        }
    }

    /// Plan a motion for `spec` with its time origin at `origin`.
    ///
    /// `max_duration` caps the animation, e.g. to the length of a cue.
    pub fn plan(
        spec: &AnimationSpec,
        frame: Size,
        overlay: Size,
        origin: f64,
        max_duration: f64,
    ) -> Self {
        let rest = rest_position(spec.placement, frame, overlay);
        let duration = spec.duration_secs.min(max_duration).max(0.0);
        if duration <= 0.0 || !duration.is_finite() {
            return Self::fixed(rest);
        }
        Self {
            start: start_position(spec.direction, rest, frame, overlay),
            rest,
            origin,
            duration,
            fade_in: spec.fade_in,
        }
    }

    /// Whether the overlay ever moves or fades.
    pub fn is_static(&self) -> bool {
        self.duration <= 0.0 || (self.start == self.rest && !self.fade_in)
    }

    /// Completed fraction of the motion at output time `t`, in `0.0..=1.0`.
    pub fn progress(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((t - self.origin) / self.duration).clamp(0.0, 1.0)
    }

    /// Position and opacity at output time `t`.
    pub fn position_at(&self, t: f64) -> OverlayPosition {
        let p = self.progress(t);
        if p >= 1.0 {
            return OverlayPosition::at(self.rest, 1.0);
        }
        let point = Point::new(
            lerp(self.start.x, self.rest.x, p),
            lerp(self.start.y, self.rest.y, p),
        );
        let opacity = if self.fade_in { p } else { 1.0 };
        OverlayPosition::at(point, opacity)
    }
}

fn lerp(from: f64, to: f64, p: f64) -> f64 {
    from + (to - from) * p
}

/// Computes overlay position as a function of elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct AnimationPlanner {
    frame: Size,
}

impl AnimationPlanner {
    pub fn new(frame: Size) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> Size {
        self.frame
    }

    /// Position of an `overlay`-sized box `t` seconds after the animation starts.
    pub fn position_at(&self, t: f64, spec: &AnimationSpec, overlay: Size) -> OverlayPosition {
        Motion::plan(spec, self.frame, overlay, 0.0, f64::INFINITY).position_at(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Size = Size::new(1920.0, 1080.0);
    const OVERLAY: Size = Size::new(400.0, 100.0);

    fn spec(direction: SlideDirection, placement: Placement) -> AnimationSpec {
        AnimationSpec {
            direction,
            duration_secs: 1.0,
            placement,
            fade_in: false,
            ..Default::default()
        }
    }

    const DIRECTIONS: [SlideDirection; 5] = [
        SlideDirection::None,
        SlideDirection::Top,
        SlideDirection::Bottom,
        SlideDirection::Left,
        SlideDirection::Right,
    ];

    const PLACEMENTS: [Placement; 5] = [
        Placement::Center,
        Placement::Top,
        Placement::Bottom,
        Placement::Left,
        Placement::Right,
    ];

    #[test]
    fn test_rest_positions() {
        let p = rest_position(Placement::Center, FRAME, OVERLAY);
        assert_eq!(p, Point::new(760.0, 490.0));
        let p = rest_position(Placement::Bottom, FRAME, OVERLAY);
        assert_eq!(p, Point::new(760.0, 1080.0 - 100.0 - 24.0));
        let p = rest_position(Placement::Right, FRAME, OVERLAY);
        assert_eq!(p, Point::new(1920.0 - 400.0 - 24.0, 490.0));
        // Oversized overlays are clamped to the margin.
        let p = rest_position(Placement::Center, Size::new(100.0, 100.0), OVERLAY);
        assert_eq!(p, Point::new(24.0, 24.0));
    }

    #[test]
    fn test_at_or_after_duration_is_rest() {
        let planner = AnimationPlanner::new(FRAME);
        for direction in DIRECTIONS {
            for placement in PLACEMENTS {
                let spec = spec(direction, placement);
                let rest = rest_position(placement, FRAME, OVERLAY);
                for t in [1.0, 1.5, 100.0] {
                    let pos = planner.position_at(t, &spec, OVERLAY);
                    assert_eq!(pos.point(), rest);
                    assert_eq!(pos.opacity, 1.0);
                }
            }
        }
    }

    #[test]
    fn test_starts_fully_off_screen() {
        let planner = AnimationPlanner::new(FRAME);
        let at = |d| planner.position_at(0.0, &spec(d, Placement::Center), OVERLAY);
        assert!(at(SlideDirection::Top).y + OVERLAY.height <= 0.0);
        assert!(at(SlideDirection::Bottom).y >= FRAME.height);
        assert!(at(SlideDirection::Left).x + OVERLAY.width <= 0.0);
        assert!(at(SlideDirection::Right).x >= FRAME.width);
    }

    #[test]
    fn test_monotonic_without_overshoot() {
        let planner = AnimationPlanner::new(FRAME);
        for direction in DIRECTIONS {
            for placement in PLACEMENTS {
                let spec = spec(direction, placement);
                let rest = rest_position(placement, FRAME, OVERLAY);
                let mut prev = planner.position_at(0.0, &spec, OVERLAY);
                for i in 1..100 {
                    let t = i as f64 / 100.0;
                    let pos = planner.position_at(t, &spec, OVERLAY);
                    assert!((rest.x - pos.x).abs() <= (rest.x - prev.x).abs());
                    assert!((rest.y - pos.y).abs() <= (rest.y - prev.y).abs());
                    // Never past the resting point.
                    assert!((pos.x - prev.x) * (rest.x - pos.x) >= 0.0);
                    assert!((pos.y - prev.y) * (rest.y - pos.y) >= 0.0);
                    prev = pos;
                }
            }
        }
    }

    #[test]
    fn test_zero_duration_and_none_are_static() {
        let planner = AnimationPlanner::new(FRAME);
        let mut s = spec(SlideDirection::Left, Placement::Bottom);
        s.duration_secs = 0.0;
        let rest = rest_position(Placement::Bottom, FRAME, OVERLAY);
        for t in [-1.0, 0.0, 0.5] {
            assert_eq!(planner.position_at(t, &s, OVERLAY).point(), rest);
        }

        let s = spec(SlideDirection::None, Placement::Top);
        let rest = rest_position(Placement::Top, FRAME, OVERLAY);
        for t in [-1.0, 0.0, 0.5] {
            let pos = planner.position_at(t, &s, OVERLAY);
            assert_eq!(pos.point(), rest);
            assert_eq!(pos.opacity, 1.0);
        }
    }

    #[test]
    fn test_before_start_is_start_position() {
        let planner = AnimationPlanner::new(FRAME);
        let s = spec(SlideDirection::Right, Placement::Center);
        assert_eq!(
            planner.position_at(-2.0, &s, OVERLAY),
            planner.position_at(0.0, &s, OVERLAY)
        );
    }

    #[test]
    fn test_fade_in_ramps_opacity() {
        let planner = AnimationPlanner::new(FRAME);
        let mut s = spec(SlideDirection::None, Placement::Center);
        s.fade_in = true;
        assert_eq!(planner.position_at(0.0, &s, OVERLAY).opacity, 0.0);
        assert!((planner.position_at(0.25, &s, OVERLAY).opacity - 0.25).abs() < 1e-9);
        assert_eq!(planner.position_at(1.0, &s, OVERLAY).opacity, 1.0);
    }

    #[test]
    fn test_tiny_frame_stays_finite() {
        let frame = Size::new(10.0, 10.0);
        let planner = AnimationPlanner::new(frame);
        for direction in DIRECTIONS {
            let s = spec(direction, Placement::Center);
            for t in [0.0, 0.3, 1.0] {
                let pos = planner.position_at(t, &s, OVERLAY);
                assert!(pos.x.is_finite() && pos.y.is_finite());
            }
        }
        // The clamped rest is already past the right edge, so the start does not move further out.
        let start = planner.position_at(
            0.0,
            &spec(SlideDirection::Right, Placement::Center),
            OVERLAY,
        );
        assert_eq!(start.x, PLACEMENT_MARGIN);
    }

    #[test]
    fn test_motion_capped_and_shifted() {
        let s = spec(SlideDirection::Left, Placement::Center);
        let motion = Motion::plan(&s, FRAME, OVERLAY, 10.0, 0.5);
        assert_eq!(motion.duration, 0.5);
        assert_eq!(motion.position_at(10.0).point(), motion.start);
        assert_eq!(motion.position_at(10.5).point(), motion.rest);
        assert!(!motion.is_static());
    }
}
