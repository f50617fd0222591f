//! Frame and overlay geometry in pixels.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Overlay position and opacity at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverlayPosition {
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

impl OverlayPosition {
    pub fn at(point: Point, opacity: f64) -> Self {
        Self {
            x: point.x,
            y: point.y,
            opacity,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
