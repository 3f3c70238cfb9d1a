//! # saint_core
//!
//! Turns a stream of hand-landmark samples into an interaction mode, a
//! set of freehand vector paths, and an animated rendering of those paths
//! once "organic life" mode is triggered.
//!
//! ## Per-frame data flow
//!
//! ```text
//! PerceptionFrame ─▶ GestureFeatures ─▶ transition() ─▶ Session effects
//!                                                        │
//!                     ┌──────────────────────────────────┘
//!                     ▼
//!   PathStore / ViewportState / GrabState ─▶ step_drift ─▶ render_paths ─▶ Canvas
//! ```
//!
//! ## Gesture → Mode mapping
//!
//! | Gesture | Mode | Effect |
//! |---|---|---|
//! | Fist (all tips near wrist) | `ANIMATE` | latch life mode on |
//! | Pinch, widget held | `GRAB` | widget follows cursor |
//! | Pinch, nothing held | `ZOOM` | zoom by pinch-distance change × 5 |
//! | Index out, middle curled | `DRAW` | start/extend a stroke |
//! | Anything else / no hand | `STANDBY` | end stroke, release grab |
//!
//! The ambient [`particles::ParticleField`] runs beside all of this and
//! shares nothing with it.

pub mod classifier;
pub mod config;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod organism;
pub mod particles;
pub mod paths;
pub mod render;
pub mod session;
pub mod viewport;
pub mod widgets;

pub use classifier::{GestureFeatures, Mode};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Vec2, ViewportSize};
pub use landmarks::{LandmarkSample, PerceptionFrame};
pub use organism::{Animation, AnimationClock, AnimationEffect};
pub use particles::ParticleField;
pub use paths::{Color, Path, PathStore, StrokeStyle, Tool};
pub use render::{render_frame, render_paths, Canvas, LineStyle};
pub use session::{Command, FrameReport, Notice, Session};
pub use viewport::{Transform, ViewportState};
pub use widgets::{GrabState, WidgetBoard, WidgetId};
