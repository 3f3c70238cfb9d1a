use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] saint_core::Error),

    #[error("landmark source `{0}` is not available in this build (enable the `leap` feature)")]
    SourceUnavailable(&'static str),

    #[error("landmark source disconnected")]
    SourceDisconnected,
}

pub type Result<T> = std::result::Result<T, AppError>;
