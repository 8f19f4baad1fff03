//! Error types for level loading and configuration.

use std::path::PathBuf;

/// Error raised while loading or decoding a level image.
///
/// Unknown pixel colors are not errors: they are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read level image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("level has no player spawn")]
    MissingPlayerSpawn,
    #[error(
        "level has more than one player spawn: pixel ({}, {}) and pixel ({}, {})",
        first.0, first.1, second.0, second.1
    )]
    DuplicatePlayerSpawn { first: (u32, u32), second: (u32, u32) },
}

/// Error raised while parsing or validating a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
