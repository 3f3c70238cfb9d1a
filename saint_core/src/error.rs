//! Error type for the few fallible entry points of the core.
//!
//! Per-frame processing never fails; only input shaping (landmark count)
//! and parsing of user-facing settings can.

/// Errors produced by `saint_core`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A landmark sample did not carry exactly the expected number of points.
    #[error("landmark sample has {found} points, expected {expected}")]
    LandmarkCount { expected: usize, found: usize },

    /// A colour string was not of the form `#rrggbb`.
    #[error("invalid colour {0:?} (expected #rrggbb)")]
    InvalidColor(String),

    #[error("unknown animation effect {0:?}")]
    UnknownEffect(String),

    #[error("unknown tool {0:?}")]
    UnknownTool(String),
}

pub type Result<T> = std::result::Result<T, Error>;
