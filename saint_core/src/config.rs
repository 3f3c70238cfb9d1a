//! Tunables for a [`Session`](crate::session::Session).
//!
//! The gesture thresholds are in normalized landmark units and are *not*
//! scaled by measured hand size; they assume a hand roughly filling the
//! camera frame.

use crate::organism::AnimationEffect;
use crate::paths::{Color, Tool};

pub const PINCH_THRESHOLD: f32 = 0.08;
pub const FIST_THRESHOLD:  f32 = 0.12;
pub const ZOOM_GAIN:       f32 = 5.0;
pub const ZOOM_MIN:        f32 = 0.1;
pub const ZOOM_MAX:        f32 = 5.0;
pub const DRIFT_SPEED:     f32 = 2.0;
pub const DRIFT_MARGIN:    f32 = 200.0;
pub const DEFAULT_GLOW:    f32 = 15.0;
pub const PARTICLE_COUNT:  usize = 40;

/// Everything the interaction core needs to know up front.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Thumb-to-index distance below which the hand is pinching.
    pub pinch_threshold: f32,
    /// Fingertip-to-wrist distance below which every finger counts as folded.
    pub fist_threshold:  f32,
    /// Zoom change per unit of pinch-distance change.
    pub zoom_gain:       f32,
    pub zoom_min:        f32,
    pub zoom_max:        f32,
    /// Each drift velocity component is drawn from `[-drift_speed, drift_speed]`.
    pub drift_speed:     f32,
    /// How far past the viewport a drifting path may roam before reflecting.
    pub drift_margin:    f32,
    /// Glow radius used by every effect except GLOW.
    pub default_glow:    f32,
    pub initial_color:   Color,
    pub initial_width:   f32,
    pub initial_tool:    Tool,
    pub initial_effect:  AnimationEffect,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            pinch_threshold: PINCH_THRESHOLD,
            fist_threshold:  FIST_THRESHOLD,
            zoom_gain:       ZOOM_GAIN,
            zoom_min:        ZOOM_MIN,
            zoom_max:        ZOOM_MAX,
            drift_speed:     DRIFT_SPEED,
            drift_margin:    DRIFT_MARGIN,
            default_glow:    DEFAULT_GLOW,
            initial_color:   Color::CYAN,
            initial_width:   4.0,
            initial_tool:    Tool::Draw,
            initial_effect:  AnimationEffect::Parasite,
        }
    }
}
