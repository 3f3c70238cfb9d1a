//! Software raster layers.
//!
//! A [`Layer`] is an ARGB pixel grid with straight (non-premultiplied)
//! alpha.  It implements [`Canvas`] so the core render pipeline and the
//! particle field can draw into it, and carries the few primitives the UI
//! chrome needs (rects, lines, bitmap text).  Layers stack with
//! [`Layer::composite_onto`] using the usual "over" operator.

use saint_core::render::{Canvas, LineStyle};
use saint_core::{Color, Point, Rect, Transform};

/// Peak opacity of the halo around a stroke.
const GLOW_STRENGTH: f32 = 0.45;

// ════════════════════════════════════════════════════════════════════════════
// Layer
// ════════════════════════════════════════════════════════════════════════════

pub struct Layer {
    width:     usize,
    height:    usize,
    px:        Vec<u32>,
    /// Scratch coverage for one polyline; zero outside `stroke_polyline`.
    coverage:  Vec<f32>,
    transform: Transform,
}

impl Layer {
    /// Fully transparent layer.
    pub fn new(width: usize, height: usize) -> Self {
        Layer {
            width,
            height,
            px:        vec![0; width * height],
            coverage:  vec![0.0; width * height],
            transform: Transform::IDENTITY,
        }
    }

    /// Resize, discarding contents.  No-op when the size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Layer::new(width, height);
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn pixels(&self) -> &[u32] {
        &self.px
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.px[y * self.width + x]
    }

    /// Fill with an opaque colour.
    pub fn fill(&mut self, color: Color) {
        self.px.fill(color.argb());
    }

    /// Blend `color` at `alpha` over the pixel at `(x, y)`.
    pub fn blend_pixel(&mut self, x: isize, y: isize, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height || alpha <= 0.0 {
            return;
        }
        let i = y as usize * self.width + x as usize;
        self.px[i] = over(self.px[i], color, alpha.min(1.0));
    }

    /// Stack this layer on top of `dst`.
    pub fn composite_onto(&self, dst: &mut Layer) {
        debug_assert_eq!((self.width, self.height), (dst.width, dst.height));
        for (d, &s) in dst.px.iter_mut().zip(&self.px) {
            let a = (s >> 24) & 0xFF;
            if a == 0 {
                continue;
            }
            *d = over(*d, unpack(s), a as f32 / 255.0);
        }
    }

    // ── chrome primitives (screen space, transform ignored) ──────────────

    pub fn fill_rect(&mut self, r: Rect, color: Color, alpha: f32) {
        let Some((x0, y0, x1, y1)) = self.clip(r.x, r.y, r.right(), r.bottom()) else { return };
        for y in y0..y1 {
            for x in x0..x1 {
                let i = y * self.width + x;
                self.px[i] = over(self.px[i], color, alpha);
            }
        }
    }

    /// One-pixel outline just inside `r`.
    pub fn stroke_rect(&mut self, r: Rect, color: Color, alpha: f32) {
        let (x0, y0) = (r.x.floor() as isize, r.y.floor() as isize);
        let (x1, y1) = (r.right().ceil() as isize - 1, r.bottom().ceil() as isize - 1);
        for x in x0..=x1 {
            self.blend_pixel(x, y0, color, alpha);
            self.blend_pixel(x, y1, color, alpha);
        }
        for y in (y0 + 1)..y1 {
            self.blend_pixel(x0, y, color, alpha);
            self.blend_pixel(x1, y, color, alpha);
        }
    }

    /// Anti-aliased line segment of the given width, no glow.
    pub fn draw_line(&mut self, a: Point, b: Point, width: f32, color: Color, alpha: f32) {
        let style = LineStyle { color, width, glow: 0.0 };
        let saved = std::mem::replace(&mut self.transform, Transform::IDENTITY);
        self.stroke_with_alpha(&[a, b], &style, alpha);
        self.transform = saved;
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, scale: usize, color: Color, alpha: f32) {
        let scale = scale.max(1);
        let mut cx = x.round() as isize;
        let cy = y.round() as isize;
        for ch in text.chars() {
            let bits = glyph(ch);
            for row in 0..5 {
                for col in 0..3 {
                    if bits & (1 << (14 - (row * 3 + col))) == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            self.blend_pixel(
                                cx + (col * scale + dx) as isize,
                                cy + (row * scale + dy) as isize,
                                color,
                                alpha,
                            );
                        }
                    }
                }
            }
            cx += (4 * scale) as isize;
        }
    }

    // ── internals ────────────────────────────────────────────────────────

    /// Integer pixel range covering `[x0,x1)×[y0,y1)`, or `None` if empty.
    fn clip(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(usize, usize, usize, usize)> {
        let cx = |v: f32| v.clamp(0.0, self.width as f32) as usize;
        let cy = |v: f32| v.clamp(0.0, self.height as f32) as usize;
        let r = (cx(x0.floor()), cy(y0.floor()), cx(x1.ceil()), cy(y1.ceil()));
        (r.0 < r.2 && r.1 < r.3).then_some(r)
    }

    fn stroke_with_alpha(&mut self, points: &[Point], style: &LineStyle, alpha: f32) {
        if points.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }
        let t = self.transform;
        let pts: Vec<Point> = points.iter().map(|&p| t.apply(p)).collect();
        let half = (style.width * t.scale * 0.5).max(0.5);
        let glow = (style.glow * t.scale).max(0.0);

        let mut dirty: Option<(usize, usize, usize, usize)> = None;
        if pts.len() == 1 {
            self.cover_segment(pts[0], pts[0], half, glow, &mut dirty);
        }
        for w in pts.windows(2) {
            self.cover_segment(w[0], w[1], half, glow, &mut dirty);
        }

        let Some((x0, y0, x1, y1)) = dirty else { return };
        for y in y0..y1 {
            for x in x0..x1 {
                let i = y * self.width + x;
                let c = self.coverage[i];
                if c > 0.0 {
                    self.px[i] = over(self.px[i], style.color, c * alpha);
                    self.coverage[i] = 0.0;
                }
            }
        }
    }

    /// Max-accumulate the capsule `a→b` (core plus halo) into `coverage`.
    fn cover_segment(
        &mut self,
        a:     Point,
        b:     Point,
        half:  f32,
        glow:  f32,
        dirty: &mut Option<(usize, usize, usize, usize)>,
    ) {
        let reach = half + glow + 1.0;
        let Some((x0, y0, x1, y1)) = self.clip(
            a.x.min(b.x) - reach,
            a.y.min(b.y) - reach,
            a.x.max(b.x) + reach,
            a.y.max(b.y) + reach,
        ) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = segment_distance(p, a, b);
                let core = (half + 0.5 - d).clamp(0.0, 1.0);
                let halo = if glow > 0.0 && d > half {
                    let k = 1.0 - ((d - half) / glow).clamp(0.0, 1.0);
                    GLOW_STRENGTH * k * k
                } else {
                    0.0
                };
                let c = core.max(halo);
                let i = y * self.width + x;
                if c > self.coverage[i] {
                    self.coverage[i] = c;
                }
            }
        }

        *dirty = Some(match *dirty {
            None => (x0, y0, x1, y1),
            Some((a0, b0, a1, b1)) => (a0.min(x0), b0.min(y0), a1.max(x1), b1.max(y1)),
        });
    }
}

impl Canvas for Layer {
    fn clear(&mut self) {
        self.px.fill(0);
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &LineStyle) {
        self.stroke_with_alpha(points, style, 1.0);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color, alpha: f32) {
        let c = self.transform.apply(center);
        let r = radius * self.transform.scale;
        let Some((x0, y0, x1, y1)) = self.clip(c.x - r - 1.0, c.y - r - 1.0, c.x + r + 1.0, c.y + r + 1.0)
        else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Point::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let cov = (r + 0.5 - d).clamp(0.0, 1.0);
                if cov > 0.0 {
                    let i = y * self.width + x;
                    self.px[i] = over(self.px[i], color, cov * alpha);
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pixel math
// ────────────────────────────────────────────────────────────────────────────

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len2 = ab.x * ab.x + ab.y * ab.y;
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len2).clamp(0.0, 1.0);
    p.distance(a + ab.scale(t))
}

fn unpack(px: u32) -> Color {
    Color::rgb((px >> 16) as u8, (px >> 8) as u8, px as u8)
}

/// Porter-Duff "over" of `src` at `alpha` onto the straight-alpha `dst`.
fn over(dst: u32, src: Color, alpha: f32) -> u32 {
    let a = alpha.clamp(0.0, 1.0);
    let da = ((dst >> 24) & 0xFF) as f32 / 255.0;
    let oa = a + da * (1.0 - a);
    if oa <= 0.0 {
        return 0;
    }
    let d = unpack(dst);
    let mix = |s: u8, d: u8| {
        ((s as f32 * a + d as f32 * da * (1.0 - a)) / oa).round().clamp(0.0, 255.0) as u32
    };
    ((oa * 255.0).round() as u32) << 24 | mix(src.r, d.r) << 16 | mix(src.g, d.g) << 8 | mix(src.b, d.b)
}

/// Width in pixels of `text` rendered at `scale`.
pub fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 { 0 } else { n * 4 * scale.max(1) - scale.max(1) }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font, rows packed top to bottom, 3 bits each
// ────────────────────────────────────────────────────────────────────────────

fn glyph(c: char) -> u16 {
    match c.to_ascii_uppercase() {
        '0' => 0b111_101_101_101_111,
        '1' => 0b010_110_010_010_111,
        '2' => 0b111_001_111_100_111,
        '3' => 0b111_001_111_001_111,
        '4' => 0b101_101_111_001_001,
        '5' => 0b111_100_111_001_111,
        '6' => 0b111_100_111_101_111,
        '7' => 0b111_001_001_001_001,
        '8' => 0b111_101_111_101_111,
        '9' => 0b111_101_111_001_111,
        'A' => 0b111_101_111_101_101,
        'B' => 0b110_101_110_101_110,
        'C' => 0b111_100_100_100_111,
        'D' => 0b110_101_101_101_110,
        'E' => 0b111_100_111_100_111,
        'F' => 0b111_100_111_100_100,
        'G' => 0b111_100_101_101_111,
        'H' => 0b101_101_111_101_101,
        'I' => 0b111_010_010_010_111,
        'J' => 0b001_001_001_101_111,
        'K' => 0b101_101_110_101_101,
        'L' => 0b100_100_100_100_111,
        'M' => 0b101_111_101_101_101,
        'N' => 0b111_101_101_101_101,
        'O' => 0b111_101_101_101_111,
        'P' => 0b111_101_111_100_100,
        'Q' => 0b111_101_101_111_001,
        'R' => 0b110_101_110_101_101,
        'S' => 0b111_100_111_001_111,
        'T' => 0b111_010_010_010_010,
        'U' => 0b101_101_101_101_111,
        'V' => 0b101_101_101_010_010,
        'W' => 0b101_101_101_111_101,
        'X' => 0b101_101_010_101_101,
        'Y' => 0b101_101_111_010_010,
        'Z' => 0b111_001_010_100_111,
        '#' => 0b101_111_101_111_101,
        '[' => 0b110_100_100_100_110,
        ']' => 0b011_001_001_001_011,
        '(' => 0b010_100_100_100_010,
        ')' => 0b010_001_001_001_010,
        '!' => 0b010_010_010_000_010,
        '/' => 0b001_001_010_100_100,
        '-' => 0b000_000_111_000_000,
        '_' => 0b000_000_000_000_111,
        '.' => 0b000_000_000_000_010,
        ',' => 0b000_000_000_010_100,
        ':' => 0b000_010_000_010_000,
        '=' => 0b000_111_000_111_000,
        '+' => 0b000_010_111_010_000,
        ' ' => 0,
        _   => 0b000_000_010_000_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(px: u32) -> u32 {
        px >> 24
    }

    #[test]
    fn stroke_covers_core_and_leaves_far_pixels() {
        let mut layer = Layer::new(40, 20);
        let style = LineStyle { color: Color::CYAN, width: 4.0, glow: 0.0 };
        layer.stroke_polyline(&[Point::new(5.0, 10.0), Point::new(35.0, 10.0)], &style);
        assert_eq!(layer.pixel(20, 10), Color::CYAN.argb());
        assert_eq!(layer.pixel(20, 2), 0);
        assert!(layer.coverage.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn glow_is_partial_and_fades() {
        let mut layer = Layer::new(40, 40);
        let style = LineStyle { color: Color::MAGENTA, width: 2.0, glow: 10.0 };
        layer.stroke_polyline(&[Point::new(5.0, 20.0), Point::new(35.0, 20.0)], &style);
        let near = alpha(layer.pixel(20, 23));
        let far = alpha(layer.pixel(20, 28));
        assert!(near > 0 && near < 255);
        assert!(far < near);
        assert_eq!(alpha(layer.pixel(20, 39)), 0);
    }

    #[test]
    fn overlapping_segments_do_not_double_blend() {
        let mut layer = Layer::new(40, 40);
        let style = LineStyle { color: Color::WHITE, width: 2.0, glow: 8.0 };
        // A sharp hairpin: both segments cover the same halo pixels.
        layer.stroke_polyline(
            &[Point::new(5.0, 20.0), Point::new(30.0, 20.0), Point::new(5.0, 20.5)],
            &style,
        );
        let mut single = Layer::new(40, 40);
        single.stroke_polyline(&[Point::new(5.0, 20.0), Point::new(30.0, 20.0)], &style);
        assert_eq!(alpha(layer.pixel(15, 25)), alpha(single.pixel(15, 25)));
    }

    #[test]
    fn transform_scales_geometry() {
        let mut layer = Layer::new(100, 100);
        layer.set_transform(Transform { scale: 2.0, translate: Point::new(10.0, 0.0) });
        layer.fill_circle(Point::new(20.0, 20.0), 3.0, Color::LIME, 1.0);
        // Centre lands at (50, 40) with radius 6.
        assert_eq!(layer.pixel(50, 40), Color::LIME.argb());
        assert_eq!(layer.pixel(50, 44), Color::LIME.argb());
        assert_eq!(layer.pixel(50, 48), 0);
    }

    #[test]
    fn faint_layer_composites_over_opaque() {
        let mut base = Layer::new(4, 4);
        base.fill(Color::rgb(0, 0, 0));
        let mut top = Layer::new(4, 4);
        top.fill_circle(Point::new(2.0, 2.0), 2.0, Color::CYAN, 0.1);
        top.composite_onto(&mut base);
        let px = base.pixel(2, 2);
        assert_eq!(alpha(px), 255);
        let g = (px >> 8) & 0xFF;
        assert!((20..=30).contains(&g), "green {g}");
    }

    #[test]
    fn text_metrics() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("ZOOM", 1), 15);
        assert_eq!(text_width("ZOOM", 2), 30);
        let mut layer = Layer::new(20, 10);
        layer.draw_text("1", 0.0, 0.0, 1, Color::WHITE, 1.0);
        // Top row of '1' is 010.
        assert_eq!(layer.pixel(0, 0), 0);
        assert_eq!(layer.pixel(1, 0), Color::WHITE.argb());
    }

    #[test]
    fn resize_clears() {
        let mut layer = Layer::new(4, 4);
        layer.fill(Color::WHITE);
        layer.resize(4, 4);
        assert_eq!(layer.pixel(0, 0), Color::WHITE.argb());
        layer.resize(8, 2);
        assert_eq!((layer.width(), layer.height()), (8, 2));
        assert!(layer.pixels().iter().all(|&p| p == 0));
    }
}
