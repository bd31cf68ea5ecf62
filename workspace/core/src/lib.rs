//! Common data model for the TacoPKM client core: library identifiers,
//! on-chain record shapes, fee parsing and the deterministic archiver.
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod fee;
mod identifier;
mod library;
pub mod tarball;
mod version;

pub use error::Error;
pub use fee::parse_fee;
pub use identifier::{validate as validate_library_name, LibraryName, MAX_LENGTH};
pub use library::{InstallTarget, LibraryRecord, VersionRecord};
pub use version::{latest_stable, max_satisfying, VersionConstraint};

/// Result type for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Default install directory name relative to the caller's working
/// directory: `./tpkm_installed_libs/<name>/<version>/`.
pub const INSTALL_ROOT: &str = "tpkm_installed_libs";

/// Environment variable carrying the wallet keystore password.
pub const WALLET_PASSWORD_ENV: &str = "TPKM_WALLET_PASSWORD";

/// Environment variable that turns on stack traces for unclassified errors.
pub const DEBUG_ENV: &str = "DEBUG";
