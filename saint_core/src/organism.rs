//! "Organic life" animation: per-path drift plus a per-point procedural
//! displacement field.
//!
//! Stored points are never touched here.  The engine only updates each
//! path's [`Drift`](crate::paths::Drift) and computes displaced copies of
//! the points for rendering.
//!
//! ## Effects
//!
//! With `t` the animation clock and `i` the point's index in its path:
//!
//! | Effect   | Displacement |
//! |----------|--------------|
//! | PARASITE | `x += sin(8t − 0.15i)·(15 + 0.5i)`, `y += cos(4t − 0.15i)·5` |
//! | ORGANISM | `x,y += jitter(±1) + sin(12t + 0.15i)·8` |
//! | WAVE     | `y += sin(0.2i + 5t)·10` |
//! | GLOW     | none; glow radius becomes `default_glow + sin(10t)·10` |
//! | FLOAT    | `y −= sin(t + 0.1i)·20` |
//! | NONE     | none |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;

use crate::config::SessionConfig;
use crate::error::Error;
use crate::geometry::{Point, Vec2, ViewportSize};
use crate::paths::{Path, PathStore};

// ════════════════════════════════════════════════════════════════════════════
// AnimationEffect
// ════════════════════════════════════════════════════════════════════════════

/// Globally selected displacement field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationEffect {
    None,
    #[default]
    Parasite,
    Organism,
    Wave,
    Glow,
    Float,
}

impl AnimationEffect {
    pub const ALL: [AnimationEffect; 6] = [
        AnimationEffect::None,
        AnimationEffect::Parasite,
        AnimationEffect::Organism,
        AnimationEffect::Wave,
        AnimationEffect::Glow,
        AnimationEffect::Float,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnimationEffect::None     => "none",
            AnimationEffect::Parasite => "parasite",
            AnimationEffect::Organism => "organism",
            AnimationEffect::Wave     => "wave",
            AnimationEffect::Glow     => "glow",
            AnimationEffect::Float    => "float",
        }
    }

    /// Offset of point `i` at clock `t`.  Only ORGANISM consumes randomness.
    pub fn displacement<R: Rng>(self, t: f64, i: usize, rng: &mut R) -> Vec2 {
        let i = i as f64;
        let v = |x: f64, y: f64| Vec2::new(x as f32, y as f32);
        match self {
            AnimationEffect::Parasite => v(
                (t * 8.0 - i * 0.15).sin() * (15.0 + i * 0.5),
                (t * 4.0 - i * 0.15).cos() * 5.0,
            ),
            AnimationEffect::Organism => {
                let pulse = (t * 12.0 + i * 0.15).sin() * 8.0;
                let jx: f64 = rng.random_range(-1.0..1.0);
                let jy: f64 = rng.random_range(-1.0..1.0);
                v(jx + pulse, jy + pulse)
            }
            AnimationEffect::Wave  => v(0.0, (i * 0.2 + t * 5.0).sin() * 10.0),
            AnimationEffect::Float => v(0.0, -(t + i * 0.1).sin() * 20.0),
            AnimationEffect::Glow | AnimationEffect::None => Vec2::ZERO,
        }
    }
}

impl FromStr for AnimationEffect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let wanted = s.trim().to_ascii_lowercase();
        AnimationEffect::ALL
            .into_iter()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| Error::UnknownEffect(s.to_string()))
    }
}

impl fmt::Display for AnimationEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AnimationClock
// ════════════════════════════════════════════════════════════════════════════

/// Monotonic animation time, two units per second of wall time.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct AnimationClock(pub f64);

impl AnimationClock {
    pub fn from_elapsed(elapsed: Duration) -> Self {
        AnimationClock(elapsed.as_secs_f64() * 1000.0 * 0.002)
    }

    pub fn t(self) -> f64 {
        self.0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Drift dynamics
// ════════════════════════════════════════════════════════════════════════════

/// Advance every path's drift by one frame.
///
/// Active: lazily seed the velocity, integrate, and reflect once the anchor
/// leaves the viewport grown by `drift_margin` on every side.
/// Inactive: snap the offset back to zero, keeping the velocity.
pub fn step_drift<R: Rng>(
    store:  &mut PathStore,
    active: bool,
    size:   ViewportSize,
    cfg:    &SessionConfig,
    rng:    &mut R,
) {
    for path in store.iter_mut() {
        if !active {
            path.drift.offset = Vec2::ZERO;
            continue;
        }

        let mut vel = match path.drift.velocity {
            Some(v) => v,
            None => {
                let s = cfg.drift_speed;
                path.drift.offset = Vec2::ZERO;
                Vec2::new(rng.random_range(-s..=s), rng.random_range(-s..=s))
            }
        };

        path.drift.offset += vel;

        let a = path.anchor();
        let m = cfg.drift_margin;
        // Point the velocity back inward; the anchor may overshoot for a frame.
        if a.x < -m {
            vel.x = vel.x.abs();
        } else if a.x > size.width + m {
            vel.x = -vel.x.abs();
        }
        if a.y < -m {
            vel.y = vel.y.abs();
        } else if a.y > size.height + m {
            vel.y = -vel.y.abs();
        }
        path.drift.velocity = Some(vel);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-frame animation parameters
// ════════════════════════════════════════════════════════════════════════════

/// Snapshot of the global animation inputs for one render frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    pub active: bool,
    pub effect: AnimationEffect,
    pub clock:  AnimationClock,
}

impl Animation {
    /// Positions to draw for `path`.  Inactive → stored points verbatim.
    pub fn rendered_points<R: Rng>(&self, path: &Path, rng: &mut R) -> Vec<Point> {
        if !self.active {
            return path.points().to_vec();
        }
        let t = self.clock.t();
        let offset = path.drift.offset;
        path.points()
            .iter()
            .enumerate()
            .map(|(i, &p)| p + offset + self.effect.displacement(t, i, rng))
            .collect()
    }

    /// Blur radius for the stroke glow.
    pub fn glow_radius(&self, cfg: &SessionConfig) -> f32 {
        if self.active && self.effect == AnimationEffect::Glow {
            cfg.default_glow + ((self.clock.t() * 10.0).sin() * 10.0) as f32
        } else {
            cfg.default_glow
        }
    }
}
