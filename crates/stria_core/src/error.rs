//! Error types

use std::path::PathBuf;

/// Errors raised while loading or saving the settings file.
///
/// Nothing in the rendering core itself is fatal: bad values are clamped
/// and bad samples sanitized at the point of entry. Configuration I/O is
/// the only fallible boundary this crate owns.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
