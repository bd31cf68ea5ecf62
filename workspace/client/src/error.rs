//! Client error type and the classification taxonomy (`§7`) the
//! command layer uses to choose an exit message without re-parsing text.
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a client error, independent of its message.
///
/// Assigned once, at the chain/IPFS boundary ([`crate::chain::translate`])
/// or at validation time; never re-derived from the rendered message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    /// No usable network configuration could be assembled.
    ConfigMissing,
    /// Wrong password, or a required password was not supplied.
    Auth,
    /// The keystore file does not exist.
    KeystoreMissing,
    /// The keystore file exists but could not be parsed.
    KeystoreCorrupt,
    /// A malformed name, version, address, fee or identifier, caught
    /// before any network call.
    Validation,
    /// The library or version does not exist on-chain.
    NotFound,
    /// A conflicting state: version conflict, name taken, version
    /// exists, or a license already owned.
    Conflict,
    /// The caller lacks the permission the operation requires.
    Permission,
    /// The operation violates a registry policy invariant.
    Policy,
    /// Insufficient funds or insufficient value sent with a call.
    Funds,
    /// A transaction-submission failure (nonce, gas, user denial).
    Tx,
    /// A CID could not be resolved on IPFS.
    IpfsNotFound,
    /// The IPFS daemon is unreachable.
    IpfsUnreachable,
    /// The RPC endpoint is unreachable.
    RpcUnreachable,
    /// An on-chain version record carries an empty or sentinel CID.
    BadRecord,
    /// Anything not covered by the table above.
    Unknown,
}

impl Kind {
    /// A one-line hint shown below the classified message (`§7`:
    /// "one line of classified message, optional hint line"), for the
    /// kinds where a fixed next step applies regardless of the
    /// specific error text.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Kind::ConfigMissing => Some("run `config add` to create a network profile, or set RPC_URL/CONTRACT_ADDRESS"),
            Kind::KeystoreMissing => Some("run `wallet create` or `wallet import` first"),
            Kind::Auth => Some("check the password, or set TPKM_WALLET_PASSWORD"),
            Kind::IpfsUnreachable => Some("make sure the IPFS daemon is reachable at the configured IPFS_API_URL"),
            Kind::RpcUnreachable => Some("check the active network profile, or set RPC_URL"),
            _ => None,
        }
    }
}

/// Client-level error: every public operation returns this type so the
/// command layer can render one classified line plus an optional hint.
#[derive(Debug, Error)]
pub enum Error {
    /// Wraps the underlying cause with a stable [`Kind`] and a
    /// human-readable, already-cleaned message.
    #[error("{message}")]
    Classified {
        /// Stable classification for the command layer.
        kind: Kind,
        /// Cleaned, human-readable message.
        message: String,
    },

    /// A path expected to be a directory was not one.
    #[error("not a directory: {0}")]
    NotDirectory(PathBuf),

    /// A path expected to be a file was not one.
    #[error("not a file: {0}")]
    NotFile(PathBuf),

    /// A path that must not already exist did.
    #[error("refusing to overwrite existing path: {0}")]
    AlreadyExists(PathBuf),

    /// The two password entries during create/import did not match.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// An empty password was supplied where one is required.
    #[error("password must not be empty")]
    EmptyPassword,

    /// Destructive confirmation text did not match what was required.
    #[error("confirmation text did not match, aborting")]
    ConfirmationFailed,

    /// Error generated by the data model / archiver crate.
    #[error(transparent)]
    Core(#[from] tacopkm_core::Error),

    /// Error generated by the io module.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error generated deserializing or serializing JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error generated parsing or joining a URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Error generated reading the line-editor.
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),

    /// Error generated constructing a signing key from raw bytes.
    #[error(transparent)]
    Ecdsa(#[from] k256::ecdsa::Error),

    /// Error generated by the IPFS client.
    #[error(transparent)]
    Ipfs(#[from] ipfs_api_backend_hyper::Error),
}

impl Error {
    /// Classification for any error, derived where it was not assigned
    /// explicitly: most pre-network validation failures are
    /// [`Kind::Validation`], I/O and core errors are [`Kind::Unknown`]
    /// unless more is known.
    pub fn kind(&self) -> Kind {
        match self {
            Error::Classified { kind, .. } => *kind,
            Error::NotDirectory(_)
            | Error::NotFile(_)
            | Error::AlreadyExists(_)
            | Error::PasswordMismatch
            | Error::EmptyPassword
            | Error::ConfirmationFailed => Kind::Validation,
            Error::Core(tacopkm_core::Error::InvalidLibraryName(_))
            | Error::Core(tacopkm_core::Error::Semver(_))
            | Error::Core(tacopkm_core::Error::InvalidFee(_)) => Kind::Validation,
            Error::Ecdsa(_) => Kind::Auth,
            _ => Kind::Unknown,
        }
    }

    /// Construct a classified error directly, e.g. from
    /// [`crate::chain::translate`].
    pub fn classified(kind: Kind, message: impl Into<String>) -> Self {
        Error::Classified {
            kind,
            message: message.into(),
        }
    }
}

/// Result type for the client library.
pub type Result<T> = std::result::Result<T, Error>;
