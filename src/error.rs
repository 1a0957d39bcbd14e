//! Error types
//!
//! One enum per concern. Everything below the main loop is recoverable and
//! gets logged where it happens; only `GameError` reaches the outer loop.

use thiserror::Error;

/// Fatal errors that end the session.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("save error: {0}")]
    Save(#[from] SaveError),
    #[error("scene stack is empty")]
    EmptySceneStack,
    #[error("frame panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Other(String),
}

/// Problems reading `assets/config.ron`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("unknown scene {0:?}")]
    UnknownScene(String),
}

/// Problems writing or restoring a world snapshot.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] ron::Error),
    #[error("decode error: {0}")]
    Decode(#[from] ron::error::SpannedError),
    #[error("slot {0} is empty")]
    EmptySlot(String),
    #[error("snapshot does not match the current map (seed {expected}, got {found})")]
    SeedMismatch { expected: u64, found: u64 },
    #[error("save storage is not available on this platform")]
    Unavailable,
}

/// Failures inside a dinosaur brain. Logged per entity, never fatal.
#[derive(Debug, Error, PartialEq)]
pub enum AiError {
    #[error("state {0} has no behaviour")]
    UnknownState(String),
    #[error("agent position is not finite ({x}, {y})")]
    NonFinitePosition { x: f32, y: f32 },
}

/// Error returned by an event handler. Logged by the bus, never propagated.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
