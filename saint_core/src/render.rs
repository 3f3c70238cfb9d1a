//! Render pipeline: view transform plus one glowing polyline per path.
//!
//! Drawing goes through the [`Canvas`] trait so the pipeline can target a
//! software framebuffer, or a recorder in tests.

use rand::Rng;

use crate::config::SessionConfig;
use crate::geometry::{Point, ViewportSize};
use crate::organism::{Animation, AnimationClock};
use crate::paths::{Color, PathStore};
use crate::session::Session;
use crate::viewport::{Transform, ViewportState};

/// Stroke parameters for one polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f32,
    /// Blur radius of the halo drawn around the line, in the line's units.
    pub glow:  f32,
}

/// Minimal 2-D drawing surface.
pub trait Canvas {
    /// Wipe the whole surface.
    fn clear(&mut self);

    /// Transform applied to every subsequent coordinate (and line width).
    fn set_transform(&mut self, transform: Transform);

    /// Connected polyline with round joins and round caps.
    fn stroke_polyline(&mut self, points: &[Point], style: &LineStyle);

    /// Filled disk with `alpha` in `[0, 1]`.
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color, alpha: f32);
}

/// Draw every path with at least two points, in insertion order.
///
/// Returns the number of polylines drawn.
pub fn render_paths<C: Canvas, R: Rng>(
    canvas:   &mut C,
    paths:    &PathStore,
    viewport: &ViewportState,
    size:     ViewportSize,
    anim:     &Animation,
    cfg:      &SessionConfig,
    rng:      &mut R,
) -> usize {
    canvas.clear();
    canvas.set_transform(viewport.transform(size));

    let glow = anim.glow_radius(cfg);
    let mut drawn = 0;
    for path in paths.iter() {
        if path.len() < 2 {
            continue;
        }
        let points = anim.rendered_points(path, rng);
        let style = LineStyle { color: path.style.color, width: path.style.width, glow };
        canvas.stroke_polyline(&points, &style);
        drawn += 1;
    }

    canvas.set_transform(Transform::IDENTITY);
    drawn
}

/// One render-loop tick: advance drift, then draw.
pub fn render_frame<C: Canvas, R: Rng>(
    canvas:  &mut C,
    session: &mut Session,
    size:    ViewportSize,
    clock:   AnimationClock,
    rng:     &mut R,
) -> usize {
    let anim = session.advance_animation(size, clock, rng);
    render_paths(canvas, session.paths(), session.viewport(), size, &anim, session.config(), rng)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::organism::AnimationEffect;
    use crate::paths::StrokeStyle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Clear,
        Transform(Transform),
        Polyline(Vec<Point>, LineStyle),
        Circle(Point, f32),
    }

    #[derive(Default)]
    pub struct Recorder {
        pub ops: Vec<Op>,
    }

    impl Canvas for Recorder {
        fn clear(&mut self) { self.ops.push(Op::Clear); }
        fn set_transform(&mut self, t: Transform) { self.ops.push(Op::Transform(t)); }
        fn stroke_polyline(&mut self, points: &[Point], style: &LineStyle) {
            self.ops.push(Op::Polyline(points.to_vec(), *style));
        }
        fn fill_circle(&mut self, c: Point, r: f32, _color: Color, _alpha: f32) {
            self.ops.push(Op::Circle(c, r));
        }
    }

    fn style(color: Color) -> StrokeStyle {
        StrokeStyle { color, width: 3.0 }
    }

    const VP: ViewportSize = ViewportSize::new(640.0, 480.0);

    #[test]
    fn singletons_are_skipped_and_order_kept() {
        let mut store = PathStore::new();
        store.begin(Point::new(0.0, 0.0), style(Color::CYAN), 0);
        store.extend(Point::new(5.0, 5.0));
        store.begin(Point::new(9.0, 9.0), style(Color::LIME), 0);
        store.begin(Point::new(1.0, 1.0), style(Color::AMBER), 0);
        store.extend(Point::new(2.0, 2.0));
        store.finish();

        let anim = Animation { active: false, effect: AnimationEffect::None, clock: AnimationClock(0.0) };
        let mut canvas = Recorder::default();
        let drawn = render_paths(
            &mut canvas, &store, &ViewportState::default(), VP, &anim,
            &SessionConfig::default(), &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(drawn, 2);

        let colors: Vec<Color> = canvas.ops.iter().filter_map(|op| match op {
            Op::Polyline(_, s) => Some(s.color),
            _ => None,
        }).collect();
        assert_eq!(colors, vec![Color::CYAN, Color::AMBER]);
        assert_eq!(canvas.ops.first(), Some(&Op::Clear));
        assert_eq!(canvas.ops.last(), Some(&Op::Transform(Transform::IDENTITY)));
    }

    #[test]
    fn default_glow_when_idle() {
        let mut store = PathStore::new();
        store.begin(Point::new(0.0, 0.0), style(Color::CYAN), 0);
        store.extend(Point::new(5.0, 5.0));
        let anim = Animation { active: false, effect: AnimationEffect::Glow, clock: AnimationClock(1.0) };
        let mut canvas = Recorder::default();
        render_paths(
            &mut canvas, &store, &ViewportState::default(), VP, &anim,
            &SessionConfig::default(), &mut StdRng::seed_from_u64(1),
        );
        let glow = canvas.ops.iter().find_map(|op| match op {
            Op::Polyline(_, s) => Some(s.glow),
            _ => None,
        });
        assert_eq!(glow, Some(15.0));
    }

    #[test]
    fn zoom_transform_is_installed() {
        let cfg = SessionConfig::default();
        let mut viewport = ViewportState::default();
        viewport.apply_pinch(0.02, &cfg);
        viewport.apply_pinch(0.06, &cfg);
        let anim = Animation { active: false, effect: AnimationEffect::None, clock: AnimationClock(0.0) };
        let mut canvas = Recorder::default();
        render_paths(
            &mut canvas, &PathStore::new(), &viewport, VP, &anim, &cfg,
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(canvas.ops[1], Op::Transform(viewport.transform(VP)));
        match canvas.ops[1] {
            Op::Transform(t) => assert!((t.scale - 1.2).abs() < 1e-5),
            _ => unreachable!(),
        }
    }
}
