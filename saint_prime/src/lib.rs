//! # saint_prime
//!
//! Gesture-driven neon sketchpad on top of [`saint_core`]: a software-
//! rendered window, a landmark source, and the UI chrome around the
//! interaction session.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Mode | Action |
//! |---|---|---|
//! | Index out, middle curled | `DRAW` | Ink a glowing stroke under the cursor |
//! | Pinch on empty canvas | `ZOOM` | Opening zooms in, closing zooms out |
//! | Pinch while a panel is held | `GRAB` | Panel follows the cursor |
//! | Fist | `ANIMATE` | Latch "life" mode: strokes drift and writhe |
//! | Anything else | `STANDBY` | Finish the stroke, drop the panel |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard and mouse drive a synthetic hand.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Keyboard and mouse
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse move | Move the simulated index fingertip |
//! | `D` held | Pointing pose (draw) |
//! | `P` held / wheel | Pinch pose / widen or narrow the pinch |
//! | `F` held | Fist |
//! | `H` | Show / hide the hand |
//! | Left click | Grab the panel under the pointer |
//! | `C` | Clear all paths |
//! | `1`–`6` | Animation effect (none, parasite, organism, wave, glow, float) |
//! | `L` / `K` | Start / stop life mode |
//! | `Tab` | Next neon colour |
//! | `T` | Toggle draw / pointer tool |
//! | `[` / `]` | Thinner / thicker stroke |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod error;
pub mod overlay;
pub mod perception;
pub mod raster;
pub mod visualizer;

pub use error::AppError;
