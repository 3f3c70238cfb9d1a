//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ ┌ HUD ────────────┐    [toasts]             ┌ LANDMARKS ──────┐  │
//! │ │ MODE  FPS  HAND │                         │  hand skeleton  │  │
//! │ │ tool / effect   │                         └─────────────────┘  │
//! │ └─────────────────┘                                              │
//! │              particles + glowing paths + trail markers           │
//! │                              ◎ cursor                            │
//! │ ┌ PALETTE ────────┐                                              │
//! │ └─────────────────┘                                              │
//! │ key legend                                                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each frame is built from three layers: the opaque background frame,
//! the ambient particle layer and the path layer.  Panels and overlays
//! are painted straight onto the frame after compositing.

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use saint_core::landmarks::HAND_CONNECTIONS;
use saint_core::{
    AnimationClock, AnimationEffect, Canvas, Color, Command, Mode, Point, Rect, ViewportSize,
};

use crate::app::{AppConfig, AppState, UiAction, PALETTE};
use crate::error::Result;
use crate::perception::{SimInput, SimPose};
use crate::raster::{text_width, Layer};

// ════════════════════════════════════════════════════════════════════════════
// Style constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:      Color = Color::rgb(0x05, 0x05, 0x0A);
const PANEL_BG:      Color = Color::rgb(0x0A, 0x12, 0x1C);
const PANEL_ALPHA:   f32   = 0.85;
const BORDER_COLOR:  Color = Color::CYAN;
const GRAB_COLOR:    Color = Color::AMBER;
const DIM_TEXT:      Color = Color::rgb(0x70, 0x80, 0x90);
const TEXT:          Color = Color::rgb(0xE0, 0xF8, 0xFF);
const ANIMATE_COLOR: Color = Color::MAGENTA;

const TEXT_SCALE:    usize = 2;
const LINE_H:        f32   = 16.0;
const TRAIL_RADIUS:  f32   = 4.0;
const CURSOR_RADIUS: f32   = 12.0;

/// Pinch gap change per mouse-wheel notch in simulation.
const WHEEL_GAP_STEP: f32 = 0.004;

const LEGEND: &str =
    "D=DRAW P=PINCH F=FIST H=HAND WHEEL=GAP CLICK=GRAB C=CLEAR 1-6=EFFECT L/K=LIFE TAB=NEON T=TOOL [ ]=STROKE Q=QUIT";

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:      Window,
    frame:       Layer,
    particles:   Layer,
    paths:       Layer,
    sim_tx:      Option<Sender<SimInput>>,

    // ── simulator input state ────────────────────────────────────────────
    hand_shown:  bool,
    last_pose:   Option<SimPose>,
    last_mouse:  Option<(f32, f32)>,
    mouse_down:  bool,
}

impl Visualizer {
    pub fn new(cfg: &AppConfig, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            "SAINT PRIME",
            cfg.width,
            cfg.height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            frame:      Layer::new(cfg.width, cfg.height),
            particles:  Layer::new(cfg.width, cfg.height),
            paths:      Layer::new(cfg.width, cfg.height),
            sim_tx,
            hand_shown: true,
            last_pose:  None,
            last_mouse: None,
            mouse_down: false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Current drawable size in pixels.
    pub fn viewport(&self) -> ViewportSize {
        let (w, h) = self.window.get_size();
        ViewportSize::new(w as f32, h as f32)
    }

    fn send(&self, input: SimInput) {
        if let Some(tx) = &self.sim_tx {
            let _ = tx.send(input);
        }
    }

    /// Poll keyboard and mouse.  Hand-shape input goes to the simulator;
    /// everything else comes back as [`UiAction`]s.
    pub fn poll_input(&mut self) -> Vec<UiAction> {
        let mut actions = Vec::new();
        if !self.window.is_open() {
            return actions;
        }

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            self.send(SimInput::Quit);
            actions.push(UiAction::Quit);
            return actions;
        }

        if one_shot(Key::C)   { actions.push(UiAction::Command(Command::ClearPaths)); }
        if one_shot(Key::L)   { actions.push(UiAction::Command(Command::ActivateLife)); }
        if one_shot(Key::K)   { actions.push(UiAction::Command(Command::TerminateLife)); }
        if one_shot(Key::Tab) { actions.push(UiAction::CycleColor); }
        if one_shot(Key::T)   { actions.push(UiAction::ToggleTool); }

        let effect_keys = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];
        for (key, effect) in effect_keys.into_iter().zip(AnimationEffect::ALL) {
            if one_shot(key) {
                actions.push(UiAction::Command(Command::SetEffect(effect)));
            }
        }

        // Stroke width repeats while held
        if self.window.is_key_pressed(Key::LeftBracket, KeyRepeat::Yes) {
            actions.push(UiAction::AdjustStroke(-1.0));
        }
        if self.window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes) {
            actions.push(UiAction::AdjustStroke(1.0));
        }

        let toggle_hand = one_shot(Key::H);

        // ── mouse ─────────────────────────────────────────────────────────
        let pressed = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.window.get_mouse_pos(MouseMode::Clamp);
        if pressed && !self.mouse_down {
            if let Some((x, y)) = pos {
                actions.push(UiAction::GrabIntent(Point::new(x, y)));
            }
        }
        self.mouse_down = pressed;

        // ── simulated hand ────────────────────────────────────────────────
        if self.sim_tx.is_some() {
            if toggle_hand {
                self.hand_shown = !self.hand_shown;
            }
            let down = |k: Key| self.window.is_key_down(k);
            let pose = if !self.hand_shown {
                SimPose::Absent
            } else if down(Key::F) {
                SimPose::Fist
            } else if down(Key::P) {
                SimPose::Pinch
            } else if down(Key::D) {
                SimPose::Pointing
            } else {
                SimPose::OpenPalm
            };
            if self.last_pose != Some(pose) {
                self.send(SimInput::Pose(pose));
                self.last_pose = Some(pose);
            }

            if let Some((x, y)) = pos {
                if self.last_mouse != Some((x, y)) {
                    let vp = self.viewport();
                    self.send(SimInput::Pointer(Point::new(
                        x / vp.width.max(1.0),
                        y / vp.height.max(1.0),
                    )));
                    self.last_mouse = Some((x, y));
                }
            }

            if let Some((_, dy)) = self.window.get_scroll_wheel() {
                if dy != 0.0 {
                    self.send(SimInput::PinchDelta(WHEEL_GAP_STEP * dy.signum()));
                }
            }
        }

        actions
    }

    /// Render one frame.
    pub fn render(&mut self, app: &mut AppState, now: u64, clock: AnimationClock) -> Result<()> {
        let (w, h) = self.window.get_size();
        if w == 0 || h == 0 {
            // Minimised; keep pumping events without drawing.
            self.window.update();
            return Ok(());
        }
        self.frame.resize(w, h);
        self.particles.resize(w, h);
        self.paths.resize(w, h);

        app.draw_scene(&mut self.particles, &mut self.paths, clock);

        self.frame.fill(BG_COLOR);
        self.particles.composite_onto(&mut self.frame);
        self.paths.composite_onto(&mut self.frame);
        draw_chrome(&mut self.frame, app, now);

        self.window.update_with_buffer(self.frame.pixels(), w, h)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Chrome — everything drawn over the scene
// ════════════════════════════════════════════════════════════════════════════

/// Panels, trail markers, cursor, toasts and key legend.
pub fn draw_chrome(frame: &mut Layer, app: &AppState, now: u64) {
    let session = app.session();

    // ── Trail markers ─────────────────────────────────────────────────────
    for (p, alpha) in app.trails().visible(now) {
        fill_disk(frame, p, TRAIL_RADIUS, session.color(), alpha * 0.8);
    }

    // ── Panels ────────────────────────────────────────────────────────────
    let panels = app.panels();
    let grabbed = session.grab().map(|g| g.widget);
    for &(id, bounds) in app.board().iter() {
        let highlight = grabbed == Some(id);
        panel_frame(frame, bounds, highlight);
        if id == panels.hud {
            draw_hud(frame, app, bounds, now);
        } else if id == panels.preview {
            draw_preview(frame, app, bounds);
        } else if id == panels.palette {
            draw_palette(frame, app, bounds);
        }
    }

    // ── Cursor ────────────────────────────────────────────────────────────
    if let Some(c) = session.cursor() {
        let color = mode_color(session.mode());
        ring(frame, c, CURSOR_RADIUS, color);
        fill_disk(frame, c, 3.0, color, 1.0);
    }

    // ── Toasts ────────────────────────────────────────────────────────────
    let cx = frame.width() as f32 / 2.0;
    let mut y = 24.0;
    for (text, alpha) in app.toasts().visible(now) {
        let tw = text_width(text, TEXT_SCALE) as f32;
        let bg = Rect::new(cx - tw / 2.0 - 10.0, y - 6.0, tw + 20.0, 22.0);
        frame.fill_rect(bg, PANEL_BG, PANEL_ALPHA * alpha);
        frame.stroke_rect(bg, BORDER_COLOR, alpha);
        frame.draw_text(text, cx - tw / 2.0, y, TEXT_SCALE, TEXT, alpha);
        y += 28.0;
    }

    // ── Key legend ────────────────────────────────────────────────────────
    let ly = frame.height() as f32 - 14.0;
    frame.draw_text(LEGEND, 10.0, ly, 1, DIM_TEXT, 1.0);
}

fn mode_color(mode: Mode) -> Color {
    match mode {
        Mode::Standby => DIM_TEXT,
        Mode::Animate => ANIMATE_COLOR,
        _             => Color::CYAN,
    }
}

fn panel_frame(frame: &mut Layer, r: Rect, highlight: bool) {
    frame.fill_rect(r, PANEL_BG, PANEL_ALPHA);
    let border = if highlight { GRAB_COLOR } else { BORDER_COLOR };
    frame.stroke_rect(r, border, if highlight { 1.0 } else { 0.5 });
    if highlight {
        let inner = Rect::new(r.x + 1.0, r.y + 1.0, r.w - 2.0, r.h - 2.0);
        frame.stroke_rect(inner, border, 0.6);
    }
}

fn draw_hud(frame: &mut Layer, app: &AppState, r: Rect, now: u64) {
    let session = app.session();
    let x = r.x + 10.0;
    let mut y = r.y + 10.0;

    frame.draw_text("SAINT PRIME", x, y, TEXT_SCALE, Color::CYAN, 1.0);
    y += LINE_H + 4.0;

    // Mode pill
    let mode = session.mode();
    let label = mode.label();
    let pill = Rect::new(x - 4.0, y - 4.0, text_width(label, TEXT_SCALE) as f32 + 8.0, 18.0);
    if mode == Mode::Standby {
        frame.stroke_rect(pill, DIM_TEXT, 1.0);
        frame.draw_text(label, x, y, TEXT_SCALE, DIM_TEXT, 1.0);
    } else {
        frame.fill_rect(pill, mode_color(mode), 1.0);
        frame.draw_text(label, x, y, TEXT_SCALE, BG_COLOR, 1.0);
    }
    let flash = app.mode_flash(now);
    if flash > 0.0 {
        let halo = Rect::new(pill.x - 2.0, pill.y - 2.0, pill.w + 4.0, pill.h + 4.0);
        frame.stroke_rect(halo, Color::WHITE, flash);
    }

    let hand = if session.hand_present() { "LINKED" } else { "--" };
    let status = format!("FPS {}  HAND {}", app.stats().fps(), hand);
    frame.draw_text(&status, pill.right() + 10.0, y, TEXT_SCALE, TEXT, 1.0);
    y += LINE_H + 6.0;

    let rows = [
        format!("TOOL {}  STROKE {:.0}", session.tool().name().to_uppercase(), session.stroke_width()),
        format!("EFFECT {}", session.effect().name().to_uppercase()),
        format!("LIFE {}  ZOOM {:.2}", if session.life_active() { "ON" } else { "OFF" }, session.viewport().zoom_scale()),
        format!("PATHS {}", session.paths().len()),
    ];
    for row in &rows {
        frame.draw_text(row, x, y, TEXT_SCALE, TEXT, 0.9);
        y += LINE_H;
    }
}

/// Latest landmark sample as a skeleton, unmirrored, scaled to the panel.
fn draw_preview(frame: &mut Layer, app: &AppState, r: Rect) {
    frame.draw_text("LANDMARKS", r.x + 8.0, r.y + 8.0, 1, DIM_TEXT, 1.0);
    let Some(sample) = app.last_sample() else { return };
    let inner = Rect::new(r.x + 4.0, r.y + 18.0, r.w - 8.0, r.h - 22.0);
    let to_panel = |p: Point| Point::new(inner.x + p.x * inner.w, inner.y + p.y * inner.h);

    for chain in HAND_CONNECTIONS {
        for pair in chain.windows(2) {
            let a = to_panel(sample.point(pair[0]));
            let b = to_panel(sample.point(pair[1]));
            frame.draw_line(a, b, 1.0, Color::CYAN, 1.0);
        }
    }
}

fn draw_palette(frame: &mut Layer, app: &AppState, r: Rect) {
    frame.draw_text("NEON", r.x + 8.0, r.y + 8.0, 1, DIM_TEXT, 1.0);
    let size = 36.0;
    let gap = 8.0;
    for (i, &color) in PALETTE.iter().enumerate() {
        let sw = Rect::new(r.x + 8.0 + i as f32 * (size + gap), r.y + 20.0, size, size);
        frame.fill_rect(sw, color, 1.0);
        if i == app.palette_idx() {
            frame.stroke_rect(Rect::new(sw.x - 3.0, sw.y - 3.0, sw.w + 6.0, sw.h + 6.0), Color::WHITE, 1.0);
        }
    }
}

fn fill_disk(frame: &mut Layer, c: Point, radius: f32, color: Color, alpha: f32) {
    frame.fill_circle(c, radius, color, alpha);
}

fn ring(frame: &mut Layer, c: Point, radius: f32, color: Color) {
    const SEGMENTS: usize = 32;
    let at = |k: usize| {
        let a = k as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
        Point::new(c.x + radius * a.cos(), c.y + radius * a.sin())
    };
    for k in 0..SEGMENTS {
        frame.draw_line(at(k), at(k + 1), 2.0, color, 0.9);
    }
}
