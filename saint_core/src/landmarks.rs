//! Hand landmark samples as delivered by a perception source.
//!
//! A sample is 21 normalized points in `[0,1]²` following the usual hand
//! skeleton convention:
//!
//! ```text
//!            8   12  16  20        tips
//!            7   11  15  19        DIP joints
//!     4      6   10  14  18        PIP joints
//!      3     5   9   13  17        MCP knuckles
//!       2
//!        1
//!            0                     wrist
//! ```
//!
//! Each fingertip's preceding two joints sit at `tip − 1` and `tip − 2`.

use crate::error::{Error, Result};
use crate::geometry::Point;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP:   usize = 16;
pub const PINKY_TIP:  usize = 20;

/// The four non-thumb fingertips, index first.
pub const FINGER_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Polylines through the skeleton, used for the landmark preview.
pub const HAND_CONNECTIONS: &[&[usize]] = &[
    &[0, 1, 2, 3, 4],
    &[0, 5, 6, 7, 8],
    &[9, 10, 11, 12],
    &[13, 14, 15, 16],
    &[17, 18, 19, 20],
    &[5, 9, 13, 17],
    &[0, 17],
];

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSample
// ════════════════════════════════════════════════════════════════════════════

/// One hand, one frame.  Never stored beyond the frame that produced it
/// (the landmark preview keeps a copy of the latest one for display).
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSample {
    points: [Point; LANDMARK_COUNT],
}

impl LandmarkSample {
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        LandmarkSample { points }
    }

    /// Build from a perception result of unknown length.
    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        let found = points.len();
        let points: [Point; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| Error::LandmarkCount { expected: LANDMARK_COUNT, found })?;
        Ok(LandmarkSample { points })
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] {
        &self.points
    }
}

/// What the perception source yields for one camera frame.
#[derive(Clone, Debug, PartialEq)]
pub enum PerceptionFrame {
    /// No hand detected (or a gap in the feed).
    Absent,
    Hand(LandmarkSample),
}

impl PerceptionFrame {
    pub fn sample(&self) -> Option<&LandmarkSample> {
        match self {
            PerceptionFrame::Absent      => None,
            PerceptionFrame::Hand(s)     => Some(s),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Synthetic poses
// ════════════════════════════════════════════════════════════════════════════

/// Synthetic hand poses for the keyboard simulator and for tests.
///
/// Every builder positions the hand so that its index fingertip lands
/// exactly on the requested normalized point, which makes the derived
/// cursor predictable.
pub mod poses {
    use super::*;

    // Knuckle offsets from the wrist for index, middle, ring, pinky.
    const MCP: [(f32, f32); 4] = [(-0.06, -0.15), (-0.02, -0.16), (0.02, -0.15), (0.06, -0.13)];
    const THUMB: [(f32, f32); 4] = [(-0.05, -0.03), (-0.09, -0.07), (-0.12, -0.10), (-0.14, -0.13)];

    /// Which of the four non-thumb fingers are extended.
    #[derive(Clone, Copy, Debug)]
    pub struct Pose {
        pub extended:  [bool; 4],
        /// Place the thumb tip this far to the right of the index tip.
        pub pinch_gap: Option<f32>,
    }

    impl Pose {
        pub fn build(&self, index_tip: Point) -> LandmarkSample {
            let mut pts = [Point::ZERO; LANDMARK_COUNT];
            for (k, &(tx, ty)) in THUMB.iter().enumerate() {
                pts[THUMB_CMC + k] = Point::new(tx, ty);
            }
            for (f, &(mx, my)) in MCP.iter().enumerate() {
                let base = INDEX_MCP + f * 4;
                let mcp = Point::new(mx, my);
                pts[base] = mcp;
                if self.extended[f] {
                    pts[base + 1] = mcp + Point::new(0.0, -0.05);
                    pts[base + 2] = mcp + Point::new(0.0, -0.085);
                    pts[base + 3] = mcp + Point::new(0.0, -0.115);
                } else {
                    // Folded back toward the palm.
                    pts[base + 1] = mcp + Point::new(0.0, -0.03);
                    pts[base + 2] = mcp + Point::new(0.0, 0.02);
                    pts[base + 3] = mcp + Point::new(0.0, 0.06);
                }
            }
            if let Some(gap) = self.pinch_gap {
                pts[THUMB_TIP] = pts[INDEX_TIP] + Point::new(gap, 0.0);
            }
            let shift = index_tip - pts[INDEX_TIP];
            for p in &mut pts {
                *p += shift;
            }
            LandmarkSample::new(pts)
        }
    }

    /// All four fingers extended, thumb away from the index.
    pub fn open_palm(index_tip: Point) -> LandmarkSample {
        Pose { extended: [true; 4], pinch_gap: None }.build(index_tip)
    }

    /// Index extended, the rest curled.
    pub fn pointing(index_tip: Point) -> LandmarkSample {
        Pose { extended: [true, false, false, false], pinch_gap: None }.build(index_tip)
    }

    /// Every fingertip folded close to the wrist.
    pub fn fist(index_tip: Point) -> LandmarkSample {
        Pose { extended: [false; 4], pinch_gap: None }.build(index_tip)
    }

    /// Open hand with the thumb tip `gap` away from the index tip.
    pub fn pinch(index_tip: Point, gap: f32) -> LandmarkSample {
        Pose { extended: [true; 4], pinch_gap: Some(gap) }.build(index_tip)
    }
}
