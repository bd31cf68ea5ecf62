use thiserror::Error;

/// Errors surfaced by the `tpkm` executable itself, on top of whatever
/// the client core returns.
#[derive(Debug, Error)]
pub enum Error {
    /// Error generated by the client core.
    #[error(transparent)]
    Client(#[from] tacopkm_client::Error),

    /// Error generated by the io module.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error generated deserializing or serializing JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classification for the command layer's exit message, falling
    /// back to `Unknown` for errors this crate raised itself.
    pub fn kind(&self) -> tacopkm_client::Kind {
        match self {
            Error::Client(e) => e.kind(),
            _ => tacopkm_client::Kind::Unknown,
        }
    }
}

/// Result type for the executable.
pub type Result<T> = std::result::Result<T, Error>;
