use std::path::PathBuf;
use thiserror::Error;

/// Errors generated by the core data model and archiver.
#[derive(Debug, Error)]
pub enum Error {
    /// Error generated when a library name fails the identifier rules.
    #[error("invalid library name '{0}'")]
    InvalidLibraryName(String),

    /// Error generated when a semver version string is malformed.
    #[error(transparent)]
    Semver(#[from] semver::Error),

    /// Error generated when a fee expression cannot be parsed.
    #[error("invalid fee expression '{0}', expected '<amount> <unit>' with unit in eth, ether, gwei, wei")]
    InvalidFee(String),

    /// Error generated when a path is not a directory.
    #[error("not a directory {0}")]
    NotDirectory(PathBuf),

    /// Error generated by the io module.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error generated deserializing from JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for the core library.
pub type Result<T> = std::result::Result<T, Error>;
