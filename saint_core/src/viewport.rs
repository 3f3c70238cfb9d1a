//! Global zoom/pan state and the view transform derived from it.

use crate::config::SessionConfig;
use crate::geometry::{Point, Vec2, ViewportSize};

/// Zoom, pan, and the pinch history that drives zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// Always within `[zoom_min, zoom_max]`.
    zoom_scale: f32,
    pub pan:    Vec2,
    /// Pinch distance seen on the previous zoom frame; 0 when no pinch-zoom
    /// is under way.
    last_pinch_distance: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        ViewportState { zoom_scale: 1.0, pan: Vec2::ZERO, last_pinch_distance: 0.0 }
    }
}

impl ViewportState {
    pub fn zoom_scale(&self) -> f32 {
        self.zoom_scale
    }

    pub fn last_pinch_distance(&self) -> f32 {
        self.last_pinch_distance
    }

    /// Feed one zoom-mode frame.  The first frame of a pinch only records
    /// the distance; later frames scale by the change.
    pub fn apply_pinch(&mut self, distance: f32, cfg: &SessionConfig) {
        if self.last_pinch_distance > 0.0 {
            let delta = distance - self.last_pinch_distance;
            self.zoom_scale = (self.zoom_scale + delta * cfg.zoom_gain)
                .clamp(cfg.zoom_min, cfg.zoom_max);
        }
        self.last_pinch_distance = distance;
    }

    pub fn reset_pinch(&mut self) {
        self.last_pinch_distance = 0.0;
    }

    /// Scale about the viewport centre, then pan.
    pub fn transform(&self, size: ViewportSize) -> Transform {
        let c = size.center();
        let s = self.zoom_scale;
        Transform {
            scale:     s,
            translate: Point::new(c.x - c.x * s, c.y - c.y * s) + self.pan,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transform
// ════════════════════════════════════════════════════════════════════════════

/// Uniform scale followed by translation: `p' = p·scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale:     f32,
    pub translate: Vec2,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { scale: 1.0, translate: Vec2::ZERO };

    pub fn apply(&self, p: Point) -> Point {
        p.scale(self.scale) + self.translate
    }
}
