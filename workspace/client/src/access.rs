//! Access and license gate (`§4.8`): the single source of truth for
//! whether a caller may read a given library, shared by the installer,
//! the info renderer, and the purchase/authorize commands.
use alloy::primitives::Address;

use tacopkm_core::{LibraryName, LibraryRecord};

use crate::chain::ReadOnlyClient;
use crate::Result;

/// One of the seven states a (library, caller) pair can occupy.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessState {
    /// Caller registered this library.
    Owner,
    /// Public, no license required: anyone may read it.
    PublicOpen,
    /// Public, license required, and the caller already holds one.
    PublicLicensedOwned,
    /// Public, license required, and the caller does not hold one.
    PublicLicensedUnowned,
    /// Private, and the caller is on the authorization list.
    PrivateAuthorized,
    /// Private, and the caller is not on the authorization list.
    PrivateUnauthorized,
    /// No wallet loaded; visibility only.
    NoWallet,
}

impl AccessState {
    /// Whether this state permits reading version contents (as opposed
    /// to metadata-only visibility).
    pub fn can_read(self) -> bool {
        matches!(
            self,
            AccessState::Owner | AccessState::PublicOpen | AccessState::PublicLicensedOwned | AccessState::PrivateAuthorized
        )
    }
}

/// Evaluate the access gate for `caller` against `record`. `record`
/// must already have been fetched via `getLibraryInfo`.
pub async fn evaluate(
    chain: &ReadOnlyClient,
    name: &LibraryName,
    record: &LibraryRecord,
    caller: Option<Address>,
) -> Result<AccessState> {
    let caller = match caller {
        Some(caller) => caller,
        None => return Ok(AccessState::NoWallet),
    };

    if caller == record.owner {
        return Ok(AccessState::Owner);
    }

    if !chain.has_access(name, caller).await? {
        return Ok(if record.license_required {
            AccessState::PublicLicensedUnowned
        } else {
            AccessState::PrivateUnauthorized
        });
    }

    if chain.has_user_license(name, caller).await? {
        return Ok(AccessState::PublicLicensedOwned);
    }

    Ok(if record.is_private {
        AccessState::PrivateAuthorized
    } else {
        AccessState::PublicOpen
    })
}

/// Whether a library is visible (metadata only) to a caller with no
/// wallet loaded: public and not license-gated.
pub fn visible_without_wallet(record: &LibraryRecord) -> bool {
    !record.is_private && !record.license_required
}

/// Compose a denial message naming why `name` was not readable, for
/// the resolver's access-gate aborts (`§4.6` steps 2 and 4).
pub fn denial_reason(name: &LibraryName, record: &LibraryRecord) -> String {
    if record.is_private {
        format!("'{name}' is private; owner {} has not authorized you", record.owner)
    } else if record.license_required {
        format!("'{name}' requires a license; purchase one from owner {}", record.owner)
    } else {
        format!("access to '{name}' was denied")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: Address, is_private: bool, license_required: bool) -> LibraryRecord {
        LibraryRecord {
            owner,
            description: String::new(),
            language: String::new(),
            tags: Vec::new(),
            is_private,
            license_fee: 0,
            license_required,
        }
    }

    #[test]
    fn visibility_requires_public_and_unlicensed() {
        assert!(visible_without_wallet(&record(Address::ZERO, false, false)));
        assert!(!visible_without_wallet(&record(Address::ZERO, true, false)));
        assert!(!visible_without_wallet(&record(Address::ZERO, false, true)));
    }

    #[test]
    fn denial_reason_distinguishes_private_and_licensed() {
        let owner: Address = "0x0000000000000000000000000000000000000001".parse().unwrap();
        let name: LibraryName = "priv".parse().unwrap();
        assert!(denial_reason(&name, &record(owner, true, false)).contains("private"));

        let name: LibraryName = "licensed".parse().unwrap();
        assert!(denial_reason(&name, &record(owner, false, true)).contains("license"));
    }
}
