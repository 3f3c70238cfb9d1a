//! Side table of grabbable widget bounds.
//!
//! Widgets themselves belong to the UI; the core only knows an opaque
//! [`WidgetId`] and a bounding rectangle per widget, plus the grab state.

use crate::geometry::{Point, Rect, Vec2};

/// Opaque handle handed out by [`WidgetBoard::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub u32);

/// A held widget and where the pointer sat inside it at grab time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrabState {
    pub widget: WidgetId,
    /// Pointer minus widget top-left, captured at grab time.
    pub offset: Vec2,
}

impl GrabState {
    /// Where the widget's top-left should sit for the given pointer.
    pub fn anchor_for(&self, pointer: Point) -> Point {
        pointer - self.offset
    }
}

/// Registration-ordered widget bounds.  Later registrations are "on top".
#[derive(Debug, Default)]
pub struct WidgetBoard {
    entries: Vec<(WidgetId, Rect)>,
    next_id: u32,
}

impl WidgetBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, bounds: Rect) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, bounds));
        id
    }

    pub fn bounds(&self, id: WidgetId) -> Option<Rect> {
        self.entries.iter().find(|(w, _)| *w == id).map(|(_, r)| *r)
    }

    /// Move a widget so its top-left is at `anchor`.
    pub fn move_to(&mut self, id: WidgetId, anchor: Point) -> bool {
        match self.entries.iter_mut().find(|(w, _)| *w == id) {
            Some((_, r)) => {
                r.x = anchor.x;
                r.y = anchor.y;
                true
            }
            None => false,
        }
    }

    /// Topmost (last-registered) widget containing `p`.
    pub fn hit_test(&self, p: Point) -> Option<(WidgetId, Rect)> {
        self.entries.iter().rev().find(|(_, r)| r.contains(p)).copied()
    }

    /// Resolve a grab intent at `p` into a grab, if any widget is hit.
    pub fn grab_at(&self, p: Point) -> Option<GrabState> {
        self.hit_test(p).map(|(widget, r)| GrabState { widget, offset: p - r.origin() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &(WidgetId, Rect)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grab_records_offset() {
        let mut board = WidgetBoard::new();
        let id = board.register(Rect::new(100.0, 50.0, 200.0, 100.0));
        let g = board.grab_at(Point::new(130.0, 70.0)).unwrap();
        assert_eq!(g.widget, id);
        assert_eq!(g.offset, Vec2::new(30.0, 20.0));
        assert_eq!(g.anchor_for(Point::new(230.0, 170.0)), Point::new(200.0, 150.0));
    }

    #[test]
    fn overlap_picks_last_registered() {
        let mut board = WidgetBoard::new();
        let _below = board.register(Rect::new(0.0, 0.0, 100.0, 100.0));
        let above  = board.register(Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(board.hit_test(Point::new(75.0, 75.0)).map(|(id, _)| id), Some(above));
    }

    #[test]
    fn miss_yields_nothing() {
        let mut board = WidgetBoard::new();
        board.register(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(board.grab_at(Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn move_to_updates_bounds() {
        let mut board = WidgetBoard::new();
        let id = board.register(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(board.move_to(id, Point::new(40.0, 60.0)));
        assert_eq!(board.bounds(id), Some(Rect::new(40.0, 60.0, 10.0, 10.0)));
        assert!(!board.move_to(WidgetId(99), Point::ZERO));
    }
}
