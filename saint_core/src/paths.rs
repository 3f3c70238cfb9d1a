//! The durable set of user-drawn strokes.
//!
//! Points are append-only: once a stroke ends its point list is frozen,
//! and only the drift fields (owned by the organism engine) keep changing.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::geometry::{Point, Vec2};

// ════════════════════════════════════════════════════════════════════════════
// Color
// ════════════════════════════════════════════════════════════════════════════

/// An opaque RGB stroke colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const CYAN:    Color = Color::rgb(0x00, 0xF5, 0xFF);
    pub const MAGENTA: Color = Color::rgb(0xFF, 0x00, 0xE5);
    pub const LIME:    Color = Color::rgb(0x39, 0xFF, 0x14);
    pub const AMBER:   Color = Color::rgb(0xFF, 0xB0, 0x00);
    pub const WHITE:   Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Packed `0xFFRRGGBB`.
    pub fn argb(self) -> u32 {
        0xFF00_0000 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::InvalidColor(s.to_string()))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tool
// ════════════════════════════════════════════════════════════════════════════

/// Active tool.  Only `Draw` lays down ink; `Pointer` moves the cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Draw,
    Pointer,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Draw    => "draw",
            Tool::Pointer => "pointer",
        }
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draw"    => Ok(Tool::Draw),
            "pointer" => Ok(Tool::Pointer),
            _         => Err(Error::UnknownTool(s.to_string())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Path
// ════════════════════════════════════════════════════════════════════════════

/// Stroke appearance, fixed when the path is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

/// Per-path roaming state.
///
/// `velocity` goes from `None` to `Some` exactly once, the first time life
/// mode touches the path, and is kept from then on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Drift {
    pub offset:   Vec2,
    pub velocity: Option<Vec2>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    points:         Vec<Point>,
    pub style:      StrokeStyle,
    pub drift:      Drift,
    /// Milliseconds since session start.
    pub created_at: u64,
}

impl Path {
    pub fn new(first: Point, style: StrokeStyle, created_at: u64) -> Self {
        Path { points: vec![first], style, drift: Drift::default(), created_at }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a path is born with one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First stored point plus current drift.
    pub fn anchor(&self) -> Point {
        self.points[0] + self.drift.offset
    }

    fn push(&mut self, p: Point) {
        self.points.push(p);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PathStore
// ════════════════════════════════════════════════════════════════════════════

/// Insertion-ordered paths plus the stroke currently being drawn.
#[derive(Debug, Default)]
pub struct PathStore {
    paths:   Vec<Path>,
    /// Index of the in-progress stroke, if any.
    current: Option<usize>,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke seeded with `first`.  Ends any stroke in progress.
    pub fn begin(&mut self, first: Point, style: StrokeStyle, now_ms: u64) -> usize {
        self.paths.push(Path::new(first, style, now_ms));
        let idx = self.paths.len() - 1;
        self.current = Some(idx);
        idx
    }

    /// Append to the in-progress stroke.  Returns false when none is open.
    pub fn extend(&mut self, p: Point) -> bool {
        match self.current.and_then(|i| self.paths.get_mut(i)) {
            Some(path) => {
                path.push(p);
                true
            }
            None => false,
        }
    }

    /// Freeze the in-progress stroke.  Returns its final length, if any.
    pub fn finish(&mut self) -> Option<usize> {
        self.current.take().map(|i| self.paths[i].len())
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Path> {
        self.current.map(|i| &self.paths[i])
    }

    /// Drop every path, including one in progress.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter()
    }

    /// Mutable access for the organism engine.  Only drift may be changed;
    /// the point list has no public mutator.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Path> {
        self.paths.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index)
    }
}
