//! Gesture classification: landmark geometry → features → candidate mode.
//!
//! Mode arbitration is an ordered rule list; the first rule whose
//! predicate holds decides the frame.  The order *is* the tie-break:
//!
//! | # | Rule      | Predicate                       | Mode                        |
//! |---|-----------|---------------------------------|-----------------------------|
//! | 1 | Fist      | all four tips near the wrist    | `Animate`                   |
//! | 2 | Pinch     | thumb–index < pinch threshold   | `Grab` if holding, else `Zoom` |
//! | 3 | DrawPose  | index extended, middle curled   | `Draw`                      |
//! | 4 | Idle      | always                          | `Standby`                   |

use std::fmt;

use crate::config::SessionConfig;
use crate::geometry::{Point, ViewportSize};
use crate::landmarks::{
    LandmarkSample, FINGER_TIPS, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, THUMB_TIP, WRIST,
};

// ════════════════════════════════════════════════════════════════════════════
// Mode
// ════════════════════════════════════════════════════════════════════════════

/// The single active interaction state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Standby,
    Draw,
    Zoom,
    Grab,
    Animate,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Standby => "STANDBY",
            Mode::Draw    => "DRAW",
            Mode::Zoom    => "ZOOM",
            Mode::Grab    => "GRAB",
            Mode::Animate => "ANIMATE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureFeatures
// ════════════════════════════════════════════════════════════════════════════

/// Geometric features of one landmark sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureFeatures {
    /// Thumb tip to index tip, normalized units.
    pub pinch_distance: f32,
    pub is_fist:        bool,
    pub is_palm_open:   bool,
    /// Index extended above its PIP joint, middle curled below its PIP joint.
    pub is_draw_pose:   bool,
    /// Index tip in screen space, x mirrored for a front-facing camera.
    pub cursor:         Point,
}

impl GestureFeatures {
    pub fn extract(sample: &LandmarkSample, viewport: ViewportSize, cfg: &SessionConfig) -> Self {
        let wrist = sample.point(WRIST);
        let index = sample.point(INDEX_TIP);
        let thumb = sample.point(THUMB_TIP);

        let pinch_distance = index.distance(thumb);

        let is_fist = FINGER_TIPS
            .iter()
            .all(|&tip| sample.point(tip).distance(wrist) < cfg.fist_threshold);

        // y grows downward: "above" means numerically smaller.
        let is_palm_open = FINGER_TIPS
            .iter()
            .all(|&tip| sample.point(tip).y < sample.point(tip - 2).y);

        let is_draw_pose = sample.point(INDEX_TIP).y < sample.point(INDEX_PIP).y
            && sample.point(MIDDLE_TIP).y > sample.point(MIDDLE_PIP).y;

        let cursor = Point::new((1.0 - index.x) * viewport.width, index.y * viewport.height);

        GestureFeatures { pinch_distance, is_fist, is_palm_open, is_draw_pose, cursor }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rule list
// ════════════════════════════════════════════════════════════════════════════

/// One arbitration rule.  See the module table for ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Fist,
    Pinch,
    DrawPose,
    Idle,
}

/// Evaluation order.  First match wins.
pub const RULES: [Rule; 4] = [Rule::Fist, Rule::Pinch, Rule::DrawPose, Rule::Idle];

impl Rule {
    pub fn matches(self, f: &GestureFeatures, cfg: &SessionConfig) -> bool {
        match self {
            Rule::Fist     => f.is_fist,
            Rule::Pinch    => f.pinch_distance < cfg.pinch_threshold,
            Rule::DrawPose => f.is_draw_pose,
            Rule::Idle     => true,
        }
    }

    pub fn mode(self, holding_widget: bool) -> Mode {
        match self {
            Rule::Fist                      => Mode::Animate,
            Rule::Pinch if holding_widget   => Mode::Grab,
            Rule::Pinch                     => Mode::Zoom,
            Rule::DrawPose                  => Mode::Draw,
            Rule::Idle                      => Mode::Standby,
        }
    }
}

/// The rule that decides this frame.
pub fn winning_rule(f: &GestureFeatures, cfg: &SessionConfig) -> Rule {
    RULES
        .into_iter()
        .find(|r| r.matches(f, cfg))
        .unwrap_or(Rule::Idle)
}

/// Candidate mode for a frame with a hand present.
pub fn decide_mode(f: &GestureFeatures, holding_widget: bool, cfg: &SessionConfig) -> Mode {
    winning_rule(f, cfg).mode(holding_widget)
}
