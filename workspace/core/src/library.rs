//! On-chain record shapes read and written by the chain client.
use alloy_primitives::Address;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{LibraryName, VersionConstraint};

/// Library descriptor as read from the registry contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LibraryRecord {
    /// Address that registered the library.
    pub owner: Address,
    /// Opaque free-text description.
    pub description: String,
    /// Opaque free-text language tag.
    pub language: String,
    /// Display-only tags, in contract order.
    pub tags: Vec<String>,
    /// Whether the library is private (ACL-gated).
    pub is_private: bool,
    /// License fee, in wei. Zero when no license is required.
    pub license_fee: u128,
    /// Whether purchasing a license is required for non-owner reads.
    pub license_required: bool,
}

impl LibraryRecord {
    /// Check the invariant the contract is expected to enforce:
    /// a private library can never also require a license.
    pub fn is_valid(&self) -> bool {
        !(self.is_private && self.license_required)
    }
}

/// A single published version, keyed by `(LibraryName, Version)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VersionRecord {
    /// IPFS content identifier of the published archive.
    pub ipfs_hash: String,
    /// Address that published this version.
    pub publisher: Address,
    /// Unix-second publish timestamp.
    pub published_at: u64,
    /// Whether this version has been marked deprecated.
    pub deprecated: bool,
    /// Dependencies declared at publish time, in contract order.
    pub dependencies: Vec<(LibraryName, VersionConstraint)>,
}

impl VersionRecord {
    /// A version record is usable only when it carries a concrete,
    /// non-sentinel content identifier.
    pub fn has_valid_artifact(&self) -> bool {
        const ZERO_ADDRESS_CID: &str = "0x0000000000000000000000000000000000000000";
        !self.ipfs_hash.trim().is_empty() && self.ipfs_hash.trim() != ZERO_ADDRESS_CID
    }
}

/// A `(name, specifier)` pair as given by the user on the command
/// line: either a concrete version, or "latest stable" when absent.
#[derive(Clone, Debug)]
pub struct InstallTarget {
    /// Name of the library to install.
    pub name: LibraryName,
    /// Concrete version requested, if any.
    pub version: Option<Version>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(is_private: bool, license_required: bool) -> LibraryRecord {
        LibraryRecord {
            owner: Address::ZERO,
            description: String::new(),
            language: String::new(),
            tags: Vec::new(),
            is_private,
            license_fee: 0,
            license_required,
        }
    }

    #[test]
    fn private_and_license_required_is_invalid() {
        assert!(!record(true, true).is_valid());
        assert!(record(true, false).is_valid());
        assert!(record(false, true).is_valid());
        assert!(record(false, false).is_valid());
    }

    #[test]
    fn empty_or_sentinel_cid_is_invalid() {
        let mut v = VersionRecord {
            ipfs_hash: String::new(),
            publisher: Address::ZERO,
            published_at: 0,
            deprecated: false,
            dependencies: Vec::new(),
        };
        assert!(!v.has_valid_artifact());

        v.ipfs_hash = "0x0000000000000000000000000000000000000000".into();
        assert!(!v.has_valid_artifact());

        v.ipfs_hash = "QmHash".into();
        assert!(v.has_valid_artifact());
    }
}
