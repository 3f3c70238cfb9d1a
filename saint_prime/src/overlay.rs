//! Transient UI state drawn over the canvas: cursor trail markers,
//! toasts, and perception frame-rate.
//!
//! Nothing here feeds back into the session; entries simply age out.
//! Times are milliseconds since application start.

use std::collections::VecDeque;

use saint_core::Point;

// ════════════════════════════════════════════════════════════════════════════
// TrailLayer — fire-and-forget markers where ink was laid
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailDot {
    pub pos:  Point,
    pub born: u64,
}

#[derive(Debug)]
pub struct TrailLayer {
    dots:        VecDeque<TrailDot>,
    lifetime_ms: u64,
}

impl TrailLayer {
    pub fn new(lifetime_ms: u64) -> Self {
        TrailLayer { dots: VecDeque::new(), lifetime_ms: lifetime_ms.max(1) }
    }

    pub fn push(&mut self, pos: Point, now: u64) {
        self.dots.push_back(TrailDot { pos, born: now });
    }

    /// Drop expired markers.  Dots are pushed in time order, so only the
    /// front ever needs checking.
    pub fn tick(&mut self, now: u64) {
        while let Some(d) = self.dots.front() {
            if now.saturating_sub(d.born) >= self.lifetime_ms {
                self.dots.pop_front();
            } else {
                break;
            }
        }
    }

    /// Live markers with their remaining opacity (1 → 0).
    pub fn visible(&self, now: u64) -> impl Iterator<Item = (Point, f32)> + '_ {
        let life = self.lifetime_ms as f32;
        self.dots.iter().map(move |d| {
            let age = now.saturating_sub(d.born) as f32;
            (d.pos, (1.0 - age / life).clamp(0.0, 1.0))
        })
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ToastQueue — short notifications stacked in a corner
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub text: String,
    pub born: u64,
}

#[derive(Debug)]
pub struct ToastQueue {
    toasts:  Vec<Toast>,
    hold_ms: u64,
    fade_ms: u64,
}

/// Keep at most this many toasts on screen.
const MAX_TOASTS: usize = 6;

impl ToastQueue {
    pub fn new(hold_ms: u64, fade_ms: u64) -> Self {
        ToastQueue { toasts: Vec::new(), hold_ms, fade_ms }
    }

    pub fn show(&mut self, text: impl Into<String>, now: u64) {
        self.toasts.push(Toast { text: text.into(), born: now });
        if self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
    }

    pub fn tick(&mut self, now: u64) {
        let total = self.hold_ms + self.fade_ms;
        self.toasts.retain(|t| now.saturating_sub(t.born) < total);
    }

    /// Toasts with opacity: 1 while held, then linear fade out.
    pub fn visible(&self, now: u64) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.toasts.iter().map(move |t| {
            let age = now.saturating_sub(t.born);
            let alpha = if age <= self.hold_ms || self.fade_ms == 0 {
                1.0
            } else {
                1.0 - (age - self.hold_ms) as f32 / self.fade_ms as f32
            };
            (t.text.as_str(), alpha.clamp(0.0, 1.0))
        })
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PerceptionStats — frame-rate of the landmark feed
// ════════════════════════════════════════════════════════════════════════════

/// Rate at which perception frames arrive, from the last interval only.
/// A repeated timestamp carries no interval and leaves the rate alone.
#[derive(Debug, Default)]
pub struct PerceptionStats {
    last: Option<u64>,
    fps:  u32,
}

impl PerceptionStats {
    pub fn record(&mut self, now: u64) {
        if let Some(prev) = self.last {
            let dt = now.saturating_sub(prev);
            if dt == 0 {
                return;
            }
            self.fps = (1000.0 / dt as f64).round() as u32;
        }
        self.last = Some(now);
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_dots_expire() {
        let mut trails = TrailLayer::new(500);
        trails.push(Point::new(1.0, 1.0), 0);
        trails.push(Point::new(2.0, 1.0), 300);
        trails.tick(499);
        assert_eq!(trails.len(), 2);
        trails.tick(500);
        assert_eq!(trails.len(), 1);
        trails.tick(800);
        assert!(trails.is_empty());
    }

    #[test]
    fn trail_fades_linearly() {
        let mut trails = TrailLayer::new(500);
        trails.push(Point::new(1.0, 1.0), 100);
        let (_, a) = trails.visible(350).next().unwrap();
        assert!((a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn toast_holds_then_fades() {
        let mut q = ToastQueue::new(2000, 300);
        q.show("MEMORY PURGED", 0);
        assert_eq!(q.visible(1999).next().unwrap().1, 1.0);
        let (_, a) = q.visible(2150).next().unwrap();
        assert!((a - 0.5).abs() < 1e-6);
        q.tick(2300);
        assert!(q.is_empty());
    }

    #[test]
    fn toast_queue_is_bounded() {
        let mut q = ToastQueue::new(2000, 300);
        for i in 0..10 { q.show(format!("t{i}"), 0); }
        assert_eq!(q.len(), MAX_TOASTS);
        assert_eq!(q.visible(0).next().unwrap().0, "t4");
    }

    #[test]
    fn fps_from_last_interval() {
        let mut s = PerceptionStats::default();
        s.record(1000);
        assert_eq!(s.fps(), 0);
        s.record(1033);
        assert_eq!(s.fps(), 30);
    }

    #[test]
    fn repeated_timestamp_keeps_rate() {
        let mut s = PerceptionStats::default();
        s.record(1000);
        s.record(1050);
        s.record(1050);
        assert_eq!(s.fps(), 20);
        s.record(1083);
        assert_eq!(s.fps(), 30);
    }
}
