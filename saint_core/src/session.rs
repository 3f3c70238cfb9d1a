//! The interaction state machine.
//!
//! `Session` is the one aggregate of mutable state: mode, path store,
//! viewport, grab, life-mode flag, and the user's current tool settings.
//! It is written by the perception callback ([`Session::process_frame`])
//! and by UI commands, and read (drift excepted) by the render loop.
//!
//! Per-frame logic is split in two:
//!
//! 1. [`transition`] — a pure function from this frame's features and the
//!    grab state to the new mode plus an ordered list of [`Effect`]s.
//! 2. [`Session::process_frame`] — applies those effects and reports
//!    [`Notice`]s for UI collaborators (toasts, trail markers, widget moves).

use rand::Rng;
use tracing::{debug, info};

use crate::classifier::{winning_rule, GestureFeatures, Mode, Rule};
use crate::config::SessionConfig;
use crate::geometry::{Point, ViewportSize};
use crate::landmarks::PerceptionFrame;
use crate::organism::{step_drift, Animation, AnimationClock, AnimationEffect};
use crate::paths::{Color, PathStore, StrokeStyle, Tool};
use crate::viewport::ViewportState;
use crate::widgets::{GrabState, WidgetBoard, WidgetId};

pub const MIN_STROKE_WIDTH: f32 = 1.0;
pub const MAX_STROKE_WIDTH: f32 = 40.0;

// ════════════════════════════════════════════════════════════════════════════
// Transition — pure mode arbitration
// ════════════════════════════════════════════════════════════════════════════

/// One state mutation requested by a transition, applied in order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Latch life mode on (no-op if already on).
    TriggerLife,
    /// End the stroke in progress, if any.
    StopDrawing,
    ReleaseGrab,
    /// Forget the previous pinch distance.
    ResetPinch,
    /// Zoom by the change in pinch distance.
    ApplyPinch(f32),
    /// Drag the held widget to follow the cursor.
    MoveGrabbed(Point),
    /// Start or extend a stroke at the cursor.
    Ink(Point),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub mode:    Mode,
    pub effects: Vec<Effect>,
}

/// Decide this frame's mode and side effects.
///
/// `features` is `None` when no hand is present.
pub fn transition(
    features: Option<&GestureFeatures>,
    holding:  bool,
    cfg:      &SessionConfig,
) -> Transition {
    use Effect::*;

    let Some(f) = features else {
        return Transition {
            mode:    Mode::Standby,
            effects: vec![StopDrawing, ReleaseGrab, ResetPinch],
        };
    };

    let rule = winning_rule(f, cfg);
    let mode = rule.mode(holding);
    let effects = match rule {
        Rule::Fist => vec![TriggerLife, StopDrawing, ReleaseGrab, ResetPinch],
        Rule::Pinch if mode == Mode::Grab => vec![StopDrawing, ResetPinch, MoveGrabbed(f.cursor)],
        Rule::Pinch => vec![StopDrawing, ApplyPinch(f.pinch_distance)],
        Rule::DrawPose => vec![ResetPinch, ReleaseGrab, Ink(f.cursor)],
        Rule::Idle => vec![ResetPinch, StopDrawing, ReleaseGrab],
    };
    Transition { mode, effects }
}

// ════════════════════════════════════════════════════════════════════════════
// Notices and commands
// ════════════════════════════════════════════════════════════════════════════

/// Something UI collaborators may want to show.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    HandFound,
    HandLost,
    ModeChanged { from: Mode, to: Mode },
    LifeActivated,
    LifeTerminated,
    DrawingStarted,
    /// A point was inked here; show a short-lived trail marker.
    Trail(Point),
    GrabAcquired(WidgetId),
    GrabReleased(WidgetId),
    /// Put the widget's top-left at `anchor`.
    WidgetMoved { id: WidgetId, anchor: Point },
    PathsCleared,
    ToolChanged(Tool),
    ColorChanged(Color),
    EffectChanged(AnimationEffect),
    StrokeWidthChanged(f32),
}

impl Notice {
    /// Toast text, for the notices that warrant one.
    pub fn toast(&self) -> Option<String> {
        let text = match self {
            Notice::LifeActivated         => "LIFE CYCLE INITIATED".to_string(),
            Notice::LifeTerminated        => "BIOLOGICAL LIFE TERMINATED".to_string(),
            Notice::DrawingStarted        => "DRAWING ACTIVE".to_string(),
            Notice::PathsCleared          => "MEMORY PURGED".to_string(),
            Notice::ToolChanged(t)        => format!("TOOL: {}", t.name().to_uppercase()),
            Notice::ColorChanged(c)       => format!("NEON: {c}"),
            Notice::EffectChanged(e)      => format!("EFFECT: {}", e.name().to_uppercase()),
            Notice::StrokeWidthChanged(w) => format!("STROKE: {w:.0}"),
            _ => return None,
        };
        Some(text)
    }
}

/// Setters exposed to the UI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    ClearPaths,
    SetTool(Tool),
    SetColor(Color),
    SetEffect(AnimationEffect),
    SetStrokeWidth(f32),
    ActivateLife,
    TerminateLife,
}

/// Outcome of one perception frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub mode:    Mode,
    /// `None` when no hand is present (cursor hidden).
    pub cursor:  Option<Point>,
    pub notices: Vec<Notice>,
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Session {
    cfg:          SessionConfig,
    mode:         Mode,
    hand_present: bool,
    cursor:       Option<Point>,
    features:     Option<GestureFeatures>,

    tool:         Tool,
    color:        Color,
    stroke_width: f32,
    effect:       AnimationEffect,
    life_active:  bool,

    paths:        PathStore,
    viewport:     ViewportState,
    grab:         Option<GrabState>,
}

impl Session {
    pub fn new(cfg: SessionConfig) -> Self {
        Session {
            mode:         Mode::Standby,
            hand_present: false,
            cursor:       None,
            features:     None,
            tool:         cfg.initial_tool,
            color:        cfg.initial_color,
            stroke_width: cfg.initial_width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH),
            effect:       cfg.initial_effect,
            life_active:  false,
            paths:        PathStore::new(),
            viewport:     ViewportState::default(),
            grab:         None,
            cfg,
        }
    }

    // ── perception callback ──────────────────────────────────────────────

    /// Consume one perception result.
    ///
    /// `now_ms` is the session-relative time, recorded on new paths.
    pub fn process_frame(
        &mut self,
        frame:  &PerceptionFrame,
        size:   ViewportSize,
        now_ms: u64,
    ) -> FrameReport {
        let mut notices = Vec::new();

        let features = frame
            .sample()
            .map(|s| GestureFeatures::extract(s, size, &self.cfg));

        let present = features.is_some();
        if present != self.hand_present {
            notices.push(if present { Notice::HandFound } else { Notice::HandLost });
            debug!(present, "hand presence changed");
        }
        self.hand_present = present;
        self.features = features;
        self.cursor = features.map(|f| f.cursor);

        let t = transition(features.as_ref(), self.grab.is_some(), &self.cfg);
        if t.mode != self.mode {
            debug!(from = %self.mode, to = %t.mode, "mode changed");
            notices.push(Notice::ModeChanged { from: self.mode, to: t.mode });
        }
        self.mode = t.mode;

        for effect in t.effects {
            self.apply(effect, now_ms, &mut notices);
        }

        FrameReport { mode: self.mode, cursor: self.cursor, notices }
    }

    fn apply(&mut self, effect: Effect, now_ms: u64, notices: &mut Vec<Notice>) {
        match effect {
            Effect::TriggerLife => {
                if !self.life_active {
                    self.life_active = true;
                    info!("life cycle initiated by gesture");
                    notices.push(Notice::LifeActivated);
                }
            }
            Effect::StopDrawing => {
                if let Some(len) = self.paths.finish() {
                    debug!(points = len, "stroke finished");
                }
            }
            Effect::ReleaseGrab => {
                if let Some(g) = self.grab.take() {
                    debug!(widget = g.widget.0, "grab released");
                    notices.push(Notice::GrabReleased(g.widget));
                }
            }
            Effect::ResetPinch => self.viewport.reset_pinch(),
            Effect::ApplyPinch(d) => self.viewport.apply_pinch(d, &self.cfg),
            Effect::MoveGrabbed(cursor) => {
                if let Some(g) = self.grab {
                    notices.push(Notice::WidgetMoved { id: g.widget, anchor: g.anchor_for(cursor) });
                }
            }
            Effect::Ink(p) => {
                if self.tool != Tool::Draw {
                    return;
                }
                if self.paths.is_drawing() {
                    self.paths.extend(p);
                } else {
                    let style = StrokeStyle { color: self.color, width: self.stroke_width };
                    let idx = self.paths.begin(p, style, now_ms);
                    debug!(path = idx, color = %self.color, "stroke started");
                    notices.push(Notice::DrawingStarted);
                }
                notices.push(Notice::Trail(p));
            }
        }
    }

    // ── external events ──────────────────────────────────────────────────

    /// Grab intent at `pointer`: pick the topmost widget under it.
    ///
    /// Replaces any existing grab.  Returns the new grab, if one was made.
    pub fn grab_intent(&mut self, pointer: Point, board: &WidgetBoard) -> Option<GrabState> {
        let g = board.grab_at(pointer)?;
        debug!(widget = g.widget.0, "grab acquired");
        self.grab = Some(g);
        Some(g)
    }

    /// Apply a UI command.  Every command yields a notice.
    pub fn command(&mut self, cmd: Command) -> Notice {
        match cmd {
            Command::ClearPaths => {
                info!(paths = self.paths.len(), "clearing all paths");
                self.paths.clear();
                Notice::PathsCleared
            }
            Command::SetTool(tool) => {
                self.tool = tool;
                if tool != Tool::Draw {
                    self.paths.finish();
                }
                Notice::ToolChanged(tool)
            }
            Command::SetColor(color) => {
                self.color = color;
                Notice::ColorChanged(color)
            }
            Command::SetEffect(effect) => {
                self.effect = effect;
                Notice::EffectChanged(effect)
            }
            Command::SetStrokeWidth(w) => {
                self.stroke_width = w.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
                Notice::StrokeWidthChanged(self.stroke_width)
            }
            Command::ActivateLife => {
                self.life_active = true;
                info!("life cycle initiated");
                Notice::LifeActivated
            }
            Command::TerminateLife => {
                self.life_active = false;
                info!("life cycle terminated");
                Notice::LifeTerminated
            }
        }
    }

    // ── render loop ──────────────────────────────────────────────────────

    /// Advance drift by one render frame and snapshot the animation inputs.
    pub fn advance_animation<R: Rng>(
        &mut self,
        size:  ViewportSize,
        clock: AnimationClock,
        rng:   &mut R,
    ) -> Animation {
        step_drift(&mut self.paths, self.life_active, size, &self.cfg, rng);
        self.animation(clock)
    }

    pub fn animation(&self, clock: AnimationClock) -> Animation {
        Animation { active: self.life_active, effect: self.effect, clock }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn config(&self)        -> &SessionConfig          { &self.cfg }
    pub fn mode(&self)          -> Mode                    { self.mode }
    pub fn hand_present(&self)  -> bool                    { self.hand_present }
    pub fn cursor(&self)        -> Option<Point>           { self.cursor }
    pub fn features(&self)      -> Option<&GestureFeatures> { self.features.as_ref() }
    pub fn tool(&self)          -> Tool                    { self.tool }
    pub fn color(&self)         -> Color                   { self.color }
    pub fn stroke_width(&self)  -> f32                     { self.stroke_width }
    pub fn effect(&self)        -> AnimationEffect         { self.effect }
    pub fn life_active(&self)   -> bool                    { self.life_active }
    pub fn paths(&self)         -> &PathStore              { &self.paths }
    pub fn viewport(&self)      -> &ViewportState          { &self.viewport }
    pub fn grab(&self)          -> Option<GrabState>       { self.grab }
    pub fn is_drawing(&self)    -> bool                    { self.paths.is_drawing() }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::landmarks::poses;

    const VP: ViewportSize = ViewportSize::new(1000.0, 800.0);

    /// Normalized index-tip position whose mirrored cursor lands on `screen`.
    fn tip_for(screen: Point) -> Point {
        Point::new(1.0 - screen.x / VP.width, screen.y / VP.height)
    }

    fn draw_at(s: &mut Session, screen: Point) -> FrameReport {
        s.process_frame(&PerceptionFrame::Hand(poses::pointing(tip_for(screen))), VP, 0)
    }

    fn pinch(s: &mut Session, gap: f32) -> FrameReport {
        s.process_frame(&PerceptionFrame::Hand(poses::pinch(Point::new(0.5, 0.5), gap)), VP, 0)
    }

    fn features_of(frame: &PerceptionFrame) -> GestureFeatures {
        GestureFeatures::extract(frame.sample().unwrap(), VP, &SessionConfig::default())
    }

    #[test]
    fn absent_hand_forces_standby() {
        let t = transition(None, true, &SessionConfig::default());
        assert_eq!(t.mode, Mode::Standby);
        assert!(t.effects.contains(&Effect::ReleaseGrab));
        assert!(t.effects.contains(&Effect::StopDrawing));
    }

    #[test]
    fn fist_transition_triggers_life_first() {
        let frame = PerceptionFrame::Hand(poses::fist(Point::new(0.5, 0.5)));
        let t = transition(Some(&features_of(&frame)), false, &SessionConfig::default());
        assert_eq!(t.mode, Mode::Animate);
        assert_eq!(t.effects.first(), Some(&Effect::TriggerLife));
    }

    #[test]
    fn grab_transition_moves_widget() {
        let frame = PerceptionFrame::Hand(poses::pinch(Point::new(0.5, 0.5), 0.02));
        let f = features_of(&frame);
        let t = transition(Some(&f), true, &SessionConfig::default());
        assert_eq!(t.mode, Mode::Grab);
        assert!(t.effects.contains(&Effect::MoveGrabbed(f.cursor)));
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::ApplyPinch(_))));
    }

    #[test]
    fn draw_continues_then_stops_on_open_palm() {
        let mut s = Session::default();
        draw_at(&mut s, Point::new(100.0, 100.0));
        draw_at(&mut s, Point::new(120.0, 100.0));
        assert!(s.is_drawing());
        s.process_frame(&PerceptionFrame::Hand(poses::open_palm(Point::new(0.5, 0.5))), VP, 0);
        assert_eq!(s.mode(), Mode::Standby);
        assert!(!s.is_drawing());
        draw_at(&mut s, Point::new(300.0, 300.0));
        assert_eq!(s.paths().len(), 2);
        assert_eq!(s.paths().get(0).unwrap().len(), 2);
    }

    #[test]
    fn each_inked_point_leaves_a_trail() {
        let mut s = Session::default();
        let r1 = draw_at(&mut s, Point::new(100.0, 100.0));
        assert!(r1.notices.contains(&Notice::DrawingStarted));
        assert_eq!(r1.notices.iter().filter(|n| matches!(n, Notice::Trail(_))).count(), 1);
        let r2 = draw_at(&mut s, Point::new(110.0, 100.0));
        assert!(!r2.notices.contains(&Notice::DrawingStarted));
        assert_eq!(r2.notices.iter().filter(|n| matches!(n, Notice::Trail(_))).count(), 1);
    }

    #[test]
    fn pointer_tool_draws_nothing() {
        let mut s = Session::default();
        s.command(Command::SetTool(Tool::Pointer));
        let r = draw_at(&mut s, Point::new(100.0, 100.0));
        assert_eq!(r.mode, Mode::Draw);
        assert!(s.paths().is_empty());
        assert!(!r.notices.iter().any(|n| matches!(n, Notice::Trail(_))));
    }

    #[test]
    fn pinch_terminates_drawing() {
        let mut s = Session::default();
        draw_at(&mut s, Point::new(100.0, 100.0));
        pinch(&mut s, 0.05);
        assert_eq!(s.mode(), Mode::Zoom);
        assert!(!s.is_drawing());
    }

    #[test]
    fn draw_pose_resets_pinch_history() {
        let mut s = Session::default();
        pinch(&mut s, 0.05);
        assert!(s.viewport().last_pinch_distance() > 0.0);
        draw_at(&mut s, Point::new(100.0, 100.0));
        assert_eq!(s.viewport().last_pinch_distance(), 0.0);
        // Next pinch starts fresh: no jump.
        pinch(&mut s, 0.02);
        assert_eq!(s.viewport().zoom_scale(), 1.0);
    }

    #[test]
    fn grab_sustains_and_releases() {
        let mut board = WidgetBoard::new();
        let id = board.register(Rect::new(400.0, 300.0, 200.0, 200.0));
        let mut s = Session::default();

        // Cursor for a pinch at normalized (0.5, 0.5) is (500, 400).
        let g = s.grab_intent(Point::new(450.0, 350.0), &board).unwrap();
        assert_eq!(g.widget, id);

        let r = pinch(&mut s, 0.02);
        assert_eq!(r.mode, Mode::Grab);
        let moved = r.notices.iter().find_map(|n| match n {
            Notice::WidgetMoved { id, anchor } => Some((*id, *anchor)),
            _ => None,
        });
        let (mid, anchor) = moved.unwrap();
        assert_eq!(mid, id);
        assert!((anchor.x - 450.0).abs() < 1e-3 && (anchor.y - 350.0).abs() < 1e-3);
        assert_eq!(s.viewport().zoom_scale(), 1.0);

        let r = draw_at(&mut s, Point::new(10.0, 10.0));
        assert!(r.notices.contains(&Notice::GrabReleased(id)));
        assert!(s.grab().is_none());
    }

    #[test]
    fn grab_intent_misses_leave_state() {
        let board = WidgetBoard::new();
        let mut s = Session::default();
        assert!(s.grab_intent(Point::new(1.0, 1.0), &board).is_none());
        assert!(s.grab().is_none());
    }

    #[test]
    fn hand_presence_notices() {
        let mut s = Session::default();
        let r = draw_at(&mut s, Point::new(100.0, 100.0));
        assert!(r.notices.contains(&Notice::HandFound));
        let r = s.process_frame(&PerceptionFrame::Absent, VP, 0);
        assert!(r.notices.contains(&Notice::HandLost));
        assert_eq!(r.cursor, None);
        let r = s.process_frame(&PerceptionFrame::Absent, VP, 0);
        assert!(r.notices.is_empty());
    }

    #[test]
    fn stroke_width_is_clamped() {
        let mut s = Session::default();
        assert_eq!(s.command(Command::SetStrokeWidth(500.0)), Notice::StrokeWidthChanged(40.0));
        assert_eq!(s.stroke_width(), 40.0);
    }

    #[test]
    fn toasts_use_fixed_wording() {
        assert_eq!(Notice::PathsCleared.toast().as_deref(), Some("MEMORY PURGED"));
        assert_eq!(Notice::ColorChanged(Color::CYAN).toast().as_deref(), Some("NEON: #00f5ff"));
        assert_eq!(Notice::ToolChanged(Tool::Draw).toast().as_deref(), Some("TOOL: DRAW"));
        assert_eq!(Notice::Trail(Point::ZERO).toast(), None);
    }

    #[test]
    fn terminate_then_fist_reactivates() {
        let mut s = Session::default();
        let fist = PerceptionFrame::Hand(poses::fist(Point::new(0.5, 0.5)));
        s.process_frame(&fist, VP, 0);
        assert!(s.life_active());
        s.command(Command::TerminateLife);
        assert!(!s.life_active());
        let r = s.process_frame(&fist, VP, 0);
        assert!(s.life_active());
        assert!(r.notices.contains(&Notice::LifeActivated));
    }
}
