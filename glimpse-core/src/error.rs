use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the playback state machine.
///
/// Out-of-range navigation is deliberately absent: retreating at the first
/// story or advancing at the last one is a silent no-op, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// A session cannot exist without at least one story.
    #[error("Cannot start a story session without any stories")]
    InvalidSession,

    /// `start` was called while a session was still playing.
    #[error("A story session is already playing; close it before starting another")]
    SessionActive,

    /// Playback timing is unusable (zero interval, or a tick longer than the story).
    #[error("Invalid playback timing: {reason}")]
    InvalidTiming { reason: String },
}

#[derive(Debug, Error)]
pub enum GlimpseError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - edit it if needed and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Feed errors
    #[error("Story feed {feed} failed: {reason}")]
    Feed { feed: String, reason: String },

    #[error("Failed to decode story feed: {0}")]
    Json(#[from] serde_json::Error),

    // Playback errors
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GlimpseError>;
