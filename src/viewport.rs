//! Viewport transform between client (screen) space and board space.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::VIEWPORT_SCALE_EPSILON;
use crate::geometry::Point;

/// Pan/zoom state of the board view, owned by the pan/zoom UI.
///
/// `x` / `y` is the screen-space translation in CSS pixels.
/// `scale` is the zoom factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Scale safe to divide by: degenerate (non-positive, tiny or non-finite)
    /// scales clamp to [`VIEWPORT_SCALE_EPSILON`].
    #[must_use]
    pub fn safe_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > VIEWPORT_SCALE_EPSILON {
            self.scale
        } else {
            VIEWPORT_SCALE_EPSILON
        }
    }

    /// Convert a screen-space distance (pixels) to a board-space distance.
    #[must_use]
    pub fn screen_dist_to_board(&self, screen_dist: f64) -> f64 {
        screen_dist / self.safe_scale()
    }
}

/// Convert a board point to canvas (screen) coordinates.
#[must_use]
pub fn to_canvas_point(board: Point, viewport: &Viewport) -> Point {
    Point {
        x: board.x.mul_add(viewport.scale, viewport.x),
        y: board.y.mul_add(viewport.scale, viewport.y),
    }
}

/// Convert a client (screen) point back to board coordinates.
#[must_use]
pub fn project_client_to_board(client: Point, viewport: &Viewport) -> Point {
    let scale = viewport.safe_scale();
    Point {
        x: (client.x - viewport.x) / scale,
        y: (client.y - viewport.y) / scale,
    }
}
