//! Top-level application state.
//!
//! `AppState` owns the interaction [`Session`], the widget side table, the
//! ambient particle field and the transient overlays.  It folds perception
//! frames and UI actions into the session and hands the visualizer
//! everything it needs to draw a frame.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use saint_core::render::render_frame;
use saint_core::{
    AnimationClock, Canvas, Color, Command, LandmarkSample, Notice, ParticleField,
    PerceptionFrame, Point, Rect, Session, SessionConfig, Tool, ViewportSize, WidgetBoard,
    WidgetId,
};

use crate::error::{AppError, Result};
use crate::overlay::{PerceptionStats, ToastQueue, TrailLayer};
use crate::perception::{spawn_landmark_source, SimInput, SimLandmarkSource, TimedFrame};
use crate::raster::Layer;
use crate::visualizer::Visualizer;

/// Neon swatches offered by the palette panel, cycled with Tab.
pub const PALETTE: [Color; 5] = [Color::CYAN, Color::MAGENTA, Color::LIME, Color::AMBER, Color::WHITE];

/// Stroke width change per `[` / `]` press.
const STROKE_STEP: f32 = 1.0;

/// How long the mode pill flashes after a mode change.
pub const MODE_FLASH_MS: u64 = 250;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where landmark samples come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    /// Keyboard and mouse drive a synthetic hand.
    #[default]
    Sim,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub width:          usize,
    pub height:         usize,
    pub session:        SessionConfig,
    pub particle_count: usize,
    /// How long a cursor trail marker stays on screen.
    pub trail_ms:       u64,
    /// Toast hold time, then fade time.
    pub toast_ms:       u64,
    pub fade_ms:        u64,
    pub source:         SourceKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:          1280,
            height:         720,
            session:        SessionConfig::default(),
            particle_count: saint_core::config::PARTICLE_COUNT,
            trail_ms:       500,
            toast_ms:       2000,
            fade_ms:        300,
            source:         SourceKind::Sim,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UI actions
// ════════════════════════════════════════════════════════════════════════════

/// Discrete UI input, independent of the landmark feed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiAction {
    Command(Command),
    CycleColor,
    ToggleTool,
    /// Widen (positive) or narrow the stroke.
    AdjustStroke(f32),
    /// Mouse press at a screen position.
    GrabIntent(Point),
    Quit,
}

/// Widget handles for the three draggable panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Panels {
    pub hud:     WidgetId,
    pub preview: WidgetId,
    pub palette: WidgetId,
}

pub const HUD_SIZE:     (f32, f32) = (250.0, 128.0);
pub const PREVIEW_SIZE: (f32, f32) = (200.0, 160.0);
pub const PALETTE_SIZE: (f32, f32) = (236.0, 64.0);

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── interaction ──────────────────────────────────────────────────────
    session:     Session,
    board:       WidgetBoard,
    panels:      Panels,
    size:        ViewportSize,

    // ── ambient / overlays ───────────────────────────────────────────────
    particles:   ParticleField,
    trails:      TrailLayer,
    toasts:      ToastQueue,
    stats:       PerceptionStats,
    last_sample: Option<LandmarkSample>,
    mode_since:  Option<u64>,

    palette_idx: usize,
    rng:         StdRng,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_os_rng())
    }

    /// Deterministic variant for tests.
    pub fn with_rng(cfg: &AppConfig, rng: StdRng) -> Self {
        let size = ViewportSize::new(cfg.width as f32, cfg.height as f32);

        // Registration order is stacking order: the palette sits on top.
        let mut board = WidgetBoard::new();
        let hud = board.register(Rect::new(16.0, 16.0, HUD_SIZE.0, HUD_SIZE.1));
        let preview = board.register(Rect::new(
            (size.width - PREVIEW_SIZE.0 - 16.0).max(0.0),
            16.0,
            PREVIEW_SIZE.0,
            PREVIEW_SIZE.1,
        ));
        let palette = board.register(Rect::new(
            16.0,
            (size.height - PALETTE_SIZE.1 - 40.0).max(0.0),
            PALETTE_SIZE.0,
            PALETTE_SIZE.1,
        ));

        let session = Session::new(cfg.session.clone());
        let palette_idx = PALETTE.iter().position(|&c| c == session.color()).unwrap_or(0);

        AppState {
            session,
            board,
            panels: Panels { hud, preview, palette },
            size,
            particles:   ParticleField::new(cfg.particle_count),
            trails:      TrailLayer::new(cfg.trail_ms),
            toasts:      ToastQueue::new(cfg.toast_ms, cfg.fade_ms),
            stats:       PerceptionStats::default(),
            last_sample: None,
            mode_since:  None,
            palette_idx,
            rng,
        }
    }

    /// Track the window size; the session reads it on every frame.
    pub fn set_viewport(&mut self, size: ViewportSize) {
        self.size = size;
    }

    // ── perception ───────────────────────────────────────────────────────

    /// Fold in a frame that arrived on this tick.
    pub fn handle_frame(&mut self, frame: PerceptionFrame, now: u64) {
        self.handle_frame_at(frame, now, now);
    }

    /// Fold in a frame the source produced at `arrived`.  The frame rate
    /// is measured between arrivals, not between render ticks.
    pub fn handle_frame_at(&mut self, frame: PerceptionFrame, arrived: u64, now: u64) {
        self.stats.record(arrived);
        self.last_sample = frame.sample().cloned();
        let report = self.session.process_frame(&frame, self.size, now);
        self.handle_notices(report.notices, now);
    }

    // ── UI actions ───────────────────────────────────────────────────────

    /// Apply one UI action.  Returns false when the app should quit.
    pub fn handle_action(&mut self, action: UiAction, now: u64) -> bool {
        let notice = match action {
            UiAction::Quit => return false,
            UiAction::Command(cmd) => Some(self.session.command(cmd)),
            UiAction::CycleColor => {
                self.palette_idx = (self.palette_idx + 1) % PALETTE.len();
                Some(self.session.command(Command::SetColor(PALETTE[self.palette_idx])))
            }
            UiAction::ToggleTool => {
                let next = match self.session.tool() {
                    Tool::Draw    => Tool::Pointer,
                    Tool::Pointer => Tool::Draw,
                };
                Some(self.session.command(Command::SetTool(next)))
            }
            UiAction::AdjustStroke(delta) => {
                let w = self.session.stroke_width() + delta * STROKE_STEP;
                Some(self.session.command(Command::SetStrokeWidth(w)))
            }
            UiAction::GrabIntent(p) => {
                match self.session.grab_intent(p, &self.board) {
                    Some(g) => Some(Notice::GrabAcquired(g.widget)),
                    None    => {
                        debug!(x = p.x, y = p.y, "grab intent missed every widget");
                        None
                    }
                }
            }
        };
        if let Some(n) = notice {
            self.handle_notices(vec![n], now);
        }
        true
    }

    fn handle_notices(&mut self, notices: Vec<Notice>, now: u64) {
        for notice in notices {
            match &notice {
                Notice::Trail(p) => self.trails.push(*p, now),
                Notice::WidgetMoved { id, anchor } => {
                    self.board.move_to(*id, *anchor);
                }
                Notice::ModeChanged { .. } => self.mode_since = Some(now),
                Notice::HandFound => info!("hand linked"),
                Notice::HandLost  => info!("hand lost"),
                _ => {}
            }
            if let Some(text) = notice.toast() {
                self.toasts.show(text, now);
            }
        }
    }

    // ── per-frame ────────────────────────────────────────────────────────

    pub fn tick(&mut self, now: u64) {
        self.particles.tick(self.size, &mut self.rng);
        self.trails.tick(now);
        self.toasts.tick(now);
    }

    /// Redraw the two scene layers.  Returns the number of paths drawn.
    pub fn draw_scene(&mut self, particles: &mut Layer, paths: &mut Layer, clock: AnimationClock) -> usize {
        particles.clear();
        self.particles.draw(particles);
        render_frame(paths, &mut self.session, self.size, clock, &mut self.rng)
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn session(&self)     -> &Session                { &self.session }
    pub fn board(&self)       -> &WidgetBoard            { &self.board }
    pub fn panels(&self)      -> Panels                  { self.panels }
    pub fn viewport(&self)    -> ViewportSize            { self.size }
    pub fn trails(&self)      -> &TrailLayer             { &self.trails }
    pub fn toasts(&self)      -> &ToastQueue             { &self.toasts }
    pub fn stats(&self)       -> &PerceptionStats        { &self.stats }
    pub fn last_sample(&self) -> Option<&LandmarkSample> { self.last_sample.as_ref() }
    pub fn palette_idx(&self) -> usize                   { self.palette_idx }

    /// Mode pill flash strength: 1 right after a mode change, fading to 0
    /// over [`MODE_FLASH_MS`].
    pub fn mode_flash(&self, now: u64) -> f32 {
        match self.mode_since {
            Some(at) => {
                let age = now.saturating_sub(at);
                (1.0 - age as f32 / MODE_FLASH_MS as f32).clamp(0.0, 1.0)
            }
            None => 0.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "leap")]
fn leap_source() -> Result<Receiver<TimedFrame>> {
    Ok(spawn_landmark_source(crate::perception::LeapLandmarkSource))
}

#[cfg(not(feature = "leap"))]
fn leap_source() -> Result<Receiver<TimedFrame>> {
    Err(AppError::SourceUnavailable("leap"))
}

/// Run the full application.
///
/// Creates the landmark source (its own thread), the window, and the app
/// state, then drives input → perception → tick → render at ~60 fps until
/// the window closes or the user quits.
pub fn run(cfg: AppConfig) -> Result<()> {
    // ── Landmark source ───────────────────────────────────────────────────
    let (sim_tx, frames) = match cfg.source {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel::<SimInput>();
            (Some(tx), spawn_landmark_source(SimLandmarkSource::new(rx)))
        }
        SourceKind::Leap => (None, leap_source()?),
    };

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(&cfg, sim_tx)?;
    let mut app = AppState::new(&cfg);
    let start = Instant::now();
    info!(width = cfg.width, height = cfg.height, source = ?cfg.source, "window open");

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        let now = start.elapsed().as_millis() as u64;
        app.set_viewport(vis.viewport());

        // 1. Window input
        for action in vis.poll_input() {
            if !app.handle_action(action, now) {
                info!("quit requested");
                return Ok(());
            }
        }

        // 2. Drain perception frames
        loop {
            match frames.try_recv() {
                Ok(timed) => {
                    let arrived = timed.at.saturating_duration_since(start).as_millis() as u64;
                    app.handle_frame_at(timed.frame, arrived, now);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("landmark source stopped");
                    return Err(AppError::SourceDisconnected);
                }
            }
        }

        // 3. Per-frame logic
        app.tick(now);

        // 4. Render
        vis.render(&mut app, now, AnimationClock::from_elapsed(start.elapsed()))?;
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use saint_core::landmarks::poses;
    use saint_core::{AnimationEffect, Mode};

    fn make_app() -> AppState {
        AppState::with_rng(&AppConfig::default(), StdRng::seed_from_u64(7))
    }

    fn tip_for(app: &AppState, screen: Point) -> Point {
        let vp = app.viewport();
        Point::new(1.0 - screen.x / vp.width, screen.y / vp.height)
    }

    fn pointing(app: &AppState, screen: Point) -> PerceptionFrame {
        PerceptionFrame::Hand(poses::pointing(tip_for(app, screen)))
    }

    fn pinch(app: &AppState, screen: Point) -> PerceptionFrame {
        PerceptionFrame::Hand(poses::pinch(tip_for(app, screen), 0.04))
    }

    fn toast_texts(app: &AppState, now: u64) -> Vec<String> {
        app.toasts().visible(now).map(|(t, _)| t.to_string()).collect()
    }

    #[test]
    fn drawing_leaves_trails_and_one_toast() {
        let mut app = make_app();
        for (i, x) in [400.0, 420.0, 440.0].into_iter().enumerate() {
            let f = pointing(&app, Point::new(x, 300.0));
            app.handle_frame(f, i as u64 * 33);
        }
        assert_eq!(app.session().mode(), Mode::Draw);
        assert_eq!(app.trails().len(), 3);
        assert_eq!(toast_texts(&app, 100), vec!["DRAWING ACTIVE"]);

        app.tick(66 + 500);
        assert_eq!(app.trails().len(), 0);
    }

    #[test]
    fn fist_toasts_life_cycle() {
        let mut app = make_app();
        app.handle_frame(PerceptionFrame::Hand(poses::fist(Point::new(0.5, 0.5))), 0);
        assert!(app.session().life_active());
        assert_eq!(toast_texts(&app, 0), vec!["LIFE CYCLE INITIATED"]);
    }

    #[test]
    fn grabbed_panel_follows_pinch() {
        let mut app = make_app();
        let hud = app.panels().hud;
        assert!(app.handle_action(UiAction::GrabIntent(Point::new(20.0, 20.0)), 0));
        assert_eq!(app.session().grab().map(|g| g.widget), Some(hud));

        let f = pinch(&app, Point::new(300.0, 200.0));
        app.handle_frame(f, 10);
        assert_eq!(app.session().mode(), Mode::Grab);
        let r = app.board().bounds(hud).unwrap();
        assert!((r.x - 296.0).abs() < 1e-3 && (r.y - 196.0).abs() < 1e-3, "{r:?}");

        // Any non-pinch frame drops the grab.
        app.handle_frame(PerceptionFrame::Absent, 20);
        assert!(app.session().grab().is_none());
    }

    #[test]
    fn grab_intent_on_empty_canvas_does_nothing() {
        let mut app = make_app();
        app.handle_action(UiAction::GrabIntent(Point::new(640.0, 360.0)), 0);
        assert!(app.session().grab().is_none());
        assert!(app.toasts().is_empty());
    }

    #[test]
    fn palette_cycles_and_wraps() {
        let mut app = make_app();
        assert_eq!(app.palette_idx(), 0);
        app.handle_action(UiAction::CycleColor, 0);
        assert_eq!(app.session().color(), Color::MAGENTA);
        assert_eq!(toast_texts(&app, 0), vec!["NEON: #ff00e5"]);
        for _ in 0..PALETTE.len() - 1 {
            app.handle_action(UiAction::CycleColor, 0);
        }
        assert_eq!(app.session().color(), Color::CYAN);
    }

    #[test]
    fn tool_toggle_and_stroke_clamp() {
        let mut app = make_app();
        app.handle_action(UiAction::ToggleTool, 0);
        assert_eq!(app.session().tool(), Tool::Pointer);
        assert_eq!(toast_texts(&app, 0), vec!["TOOL: POINTER"]);

        for _ in 0..100 {
            app.handle_action(UiAction::AdjustStroke(1.0), 0);
        }
        assert_eq!(app.session().stroke_width(), 40.0);
        for _ in 0..100 {
            app.handle_action(UiAction::AdjustStroke(-1.0), 0);
        }
        assert_eq!(app.session().stroke_width(), 1.0);
    }

    #[test]
    fn clear_and_effect_commands() {
        let mut app = make_app();
        for x in [100.0, 120.0] {
            let f = pointing(&app, Point::new(x, 100.0));
            app.handle_frame(f, 0);
        }
        app.handle_action(UiAction::Command(Command::SetEffect(AnimationEffect::Wave)), 0);
        app.handle_action(UiAction::Command(Command::ClearPaths), 0);
        assert!(app.session().paths().is_empty());
        assert_eq!(app.session().effect(), AnimationEffect::Wave);
        assert!(toast_texts(&app, 0).contains(&"MEMORY PURGED".to_string()));
    }

    #[test]
    fn quit_action_stops() {
        let mut app = make_app();
        assert!(!app.handle_action(UiAction::Quit, 0));
    }

    #[test]
    fn perception_rate_and_preview_sample() {
        let mut app = make_app();
        let f = pointing(&app, Point::new(10.0, 10.0));
        app.handle_frame(f.clone(), 1000);
        app.handle_frame(f, 1050);
        assert_eq!(app.stats().fps(), 20);
        assert!(app.last_sample().is_some());
        app.handle_frame(PerceptionFrame::Absent, 1100);
        assert!(app.last_sample().is_none());
    }

    #[test]
    fn rate_uses_arrival_times_when_drained_together() {
        let mut app = make_app();
        let f = pointing(&app, Point::new(10.0, 10.0));
        app.handle_frame_at(f.clone(), 1000, 1000);
        // Two frames 33 ms apart, both picked up by the same render tick.
        app.handle_frame_at(f.clone(), 1033, 1040);
        app.handle_frame_at(f.clone(), 1066, 1040);
        assert_eq!(app.stats().fps(), 30);

        // Same tick, no arrival stamps: the reading must not spike.
        app.handle_frame(f.clone(), 1100);
        app.handle_frame(f, 1100);
        assert!(app.stats().fps() < 100, "{}", app.stats().fps());
    }

    #[test]
    fn mode_change_flashes_pill() {
        let mut app = make_app();
        assert_eq!(app.mode_flash(0), 0.0);
        let f = pointing(&app, Point::new(200.0, 200.0));
        app.handle_frame(f.clone(), 100);
        assert_eq!(app.mode_flash(100), 1.0);
        assert_eq!(app.mode_flash(100 + MODE_FLASH_MS), 0.0);

        // Staying in DRAW does not restart the flash.
        app.handle_frame(f, 200);
        assert!(app.mode_flash(200) < 1.0);
    }

    #[test]
    fn scene_draws_particles_and_paths() {
        let mut app = make_app();
        app.set_viewport(ViewportSize::new(200.0, 100.0));
        for x in [50.0, 100.0, 150.0] {
            let f = pointing(&app, Point::new(x, 50.0));
            app.handle_frame(f, 0);
        }
        for _ in 0..5 {
            app.tick(0);
        }
        let mut particles = Layer::new(200, 100);
        let mut paths = Layer::new(200, 100);
        let drawn = app.draw_scene(&mut particles, &mut paths, AnimationClock(0.0));
        assert_eq!(drawn, 1);
        assert!(paths.pixels().iter().any(|&p| p >> 24 == 0xFF));
        assert_eq!(app.particles.particles().len(), 5);
    }
}
