//! Chain client (`§4.5`): a read-only handle used by every command,
//! and a signing handle available after `loadWallet`. Every contract
//! call funnels through these two types so [`super::translate`] has a
//! single choke point.
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use semver::Version;
use url::Url;

use tacopkm_core::{LibraryName, LibraryRecord, VersionConstraint, VersionRecord};

use super::abi::TacoRegistry;
use super::translate::classify;
use crate::error::Kind;
use crate::{Error, Result};

type RegistryInstance = TacoRegistry::TacoRegistryInstance<DynProvider>;

/// Read-only contract handle: a provider plus the contract at the
/// effective address. Reachable via every query-shaped method in
/// `§4.5`.
pub struct ReadOnlyClient {
    contract: RegistryInstance,
    contract_address: Address,
}

impl ReadOnlyClient {
    /// Connect a read-only handle to `rpc_url`, targeting `contract_address`.
    pub async fn connect(rpc_url: &Url, contract_address: Address) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect(rpc_url.as_str())
            .await
            .map_err(|e| Error::classified(Kind::RpcUnreachable, format!("could not reach RPC: {e}")))?
            .erased();
        let contract = TacoRegistry::new(contract_address, provider);
        Ok(ReadOnlyClient {
            contract,
            contract_address,
        })
    }

    /// Confirm RPC reachability and canonicalize the contract address
    /// by issuing the cheapest available read call (`owner()`).
    pub async fn get_address(&self) -> Result<Address> {
        let owner = self
            .contract
            .owner()
            .call()
            .await
            .map_err(|e| self.translate(e))?;
        let _ = owner;
        Ok(self.contract_address)
    }

    fn translate(&self, err: alloy::contract::Error) -> Error {
        classify(&err.to_string())
    }

    /// The native balance of `address` on this chain, in wei.
    pub async fn balance_of(&self, address: Address) -> Result<U256> {
        self.contract
            .provider()
            .get_balance(address)
            .await
            .map_err(|e| Error::classified(Kind::RpcUnreachable, format!("could not read balance: {e}")))
    }

    /// `getLibraryInfo`.
    pub async fn get_library_info(&self, name: &LibraryName) -> Result<LibraryRecord> {
        let ret = self
            .contract
            .getLibraryInfo(name.to_string())
            .call()
            .await
            .map_err(|e| self.translate(e))?;
        let record = LibraryRecord {
            owner: ret.owner,
            description: ret.description,
            language: ret.language,
            tags: ret.tags,
            is_private: ret.isPrivate,
            license_fee: u128::try_from(ret.licenseFee).unwrap_or(u128::MAX),
            license_required: ret.licenseRequired,
        };
        // `§3`: `isPrivate ⇒ ¬licenseRequired` is enforced by the
        // contract; a record that violates it anyway is corrupt, not a
        // valid state for any caller to act on.
        if !record.is_valid() {
            return Err(Error::classified(
                Kind::BadRecord,
                format!("'{name}' has an inconsistent record: private and license-required at once"),
            ));
        }
        Ok(record)
    }

    /// `getVersionNumbers`, parsed into [`Version`]s. Entries that fail
    /// to parse are dropped with a warning rather than aborting the
    /// whole call: a single malformed on-chain entry should not make a
    /// library entirely unreachable.
    pub async fn get_version_numbers(&self, name: &LibraryName) -> Result<Vec<Version>> {
        let raw = self
            .contract
            .getVersionNumbers(name.to_string())
            .call()
            .await
            .map_err(|e| self.translate(e))?;
        Ok(raw
            .into_iter()
            .filter_map(|v| match Version::parse(&v) {
                Ok(version) => Some(version),
                Err(_) => {
                    tracing::warn!(version = %v, name = %name, "ignoring unparseable on-chain version");
                    None
                }
            })
            .collect())
    }

    /// `getVersionInfo`.
    pub async fn get_version_info(&self, name: &LibraryName, version: &Version) -> Result<VersionRecord> {
        let ret = self
            .contract
            .getVersionInfo(name.to_string(), version.to_string())
            .call()
            .await
            .map_err(|e| self.translate(e))?;

        let mut dependencies = Vec::with_capacity(ret.dependencyNames.len());
        for (dep_name, dep_constraint) in ret.dependencyNames.into_iter().zip(ret.dependencyConstraints) {
            let name = match dep_name.parse::<LibraryName>() {
                Ok(name) => name,
                Err(_) => {
                    tracing::warn!(dependency = %dep_name, "ignoring malformed dependency name");
                    continue;
                }
            };
            let constraint: VersionConstraint = match dep_constraint.parse() {
                Ok(constraint) => constraint,
                Err(_) => {
                    tracing::warn!(dependency = %dep_name, constraint = %dep_constraint, "ignoring malformed dependency constraint");
                    continue;
                }
            };
            dependencies.push((name, constraint));
        }

        Ok(VersionRecord {
            ipfs_hash: ret.ipfsHash,
            publisher: ret.publisher,
            published_at: u64::try_from(ret.publishedAt).unwrap_or(0),
            deprecated: ret.deprecated,
            dependencies,
        })
    }

    /// `hasAccess`.
    pub async fn has_access(&self, name: &LibraryName, user: Address) -> Result<bool> {
        self.contract
            .hasAccess(name.to_string(), user)
            .call()
            .await
            .map_err(|e| self.translate(e))
    }

    /// `hasUserLicense`.
    pub async fn has_user_license(&self, name: &LibraryName, user: Address) -> Result<bool> {
        self.contract
            .hasUserLicense(name.to_string(), user)
            .call()
            .await
            .map_err(|e| self.translate(e))
    }

    /// `getAllLibraryNames`. Open question (`§9`): unbounded; today's
    /// behavior is best-effort, surfaced to the caller as-is.
    pub async fn get_all_library_names(&self) -> Result<Vec<String>> {
        self.contract
            .getAllLibraryNames()
            .call()
            .await
            .map_err(|e| self.translate(e))
    }

    /// `owner()` — the registry contract's own admin address, used by
    /// `abandon-registry`.
    pub async fn registry_owner(&self) -> Result<Address> {
        self.contract.owner().call().await.map_err(|e| self.translate(e))
    }

    /// Upgrade this handle into a signing one by attaching a wallet.
    pub async fn load_wallet(&self, rpc_url: &Url, signer: PrivateKeySigner) -> Result<SigningClient> {
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect(rpc_url.as_str())
            .await
            .map_err(|e| Error::classified(Kind::RpcUnreachable, format!("could not reach RPC: {e}")))?
            .erased();
        let contract = TacoRegistry::new(self.contract_address, provider);
        Ok(SigningClient { contract, address })
    }
}

/// Signing contract handle, available once a wallet has been loaded.
/// Every write call awaits one confirmation before returning.
pub struct SigningClient {
    contract: RegistryInstance,
    address: Address,
}

impl SigningClient {
    /// The signer's address.
    pub fn address(&self) -> Address {
        self.address
    }

    fn translate(&self, err: alloy::contract::Error) -> Error {
        classify(&err.to_string())
    }

    /// `registerLibrary`.
    pub async fn register_library(
        &self,
        name: &LibraryName,
        description: &str,
        tags: Vec<String>,
        language: &str,
        is_private: bool,
    ) -> Result<()> {
        let receipt = self
            .contract
            .registerLibrary(name.to_string(), description.to_string(), tags, language.to_string(), is_private)
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }

    /// `publishVersion`. Dependency constraints are sent verbatim as
    /// written by the publisher (`§4.7` step 2 tolerates malformed but
    /// non-empty constraint strings to preserve author intent).
    pub async fn publish_version(
        &self,
        name: &LibraryName,
        version: &Version,
        ipfs_hash: &str,
        dependencies: &[(LibraryName, String)],
    ) -> Result<()> {
        let dep_names = dependencies.iter().map(|(n, _)| n.to_string()).collect();
        let dep_constraints = dependencies.iter().map(|(_, c)| c.clone()).collect();
        let receipt = self
            .contract
            .publishVersion(name.to_string(), version.to_string(), ipfs_hash.to_string(), dep_names, dep_constraints)
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }

    /// `deprecateVersion`.
    pub async fn deprecate_version(&self, name: &LibraryName, version: &Version) -> Result<()> {
        let receipt = self
            .contract
            .deprecateVersion(name.to_string(), version.to_string())
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }

    /// `authorizeUser`.
    pub async fn authorize_user(&self, name: &LibraryName, user: Address) -> Result<()> {
        let receipt = self
            .contract
            .authorizeUser(name.to_string(), user)
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }

    /// `revokeAuthorization`.
    pub async fn revoke_authorization(&self, name: &LibraryName, user: Address) -> Result<()> {
        let receipt = self
            .contract
            .revokeAuthorization(name.to_string(), user)
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }

    /// `deleteLibrary`.
    pub async fn delete_library(&self, name: &LibraryName) -> Result<()> {
        let receipt = self
            .contract
            .deleteLibrary(name.to_string())
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }

    /// `setLibraryLicense`.
    pub async fn set_library_license(&self, name: &LibraryName, fee_wei: u128, required: bool) -> Result<()> {
        let receipt = self
            .contract
            .setLibraryLicense(name.to_string(), U256::from(fee_wei), required)
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }

    /// `purchaseLibraryLicense`, payable with `value_wei`.
    pub async fn purchase_library_license(&self, name: &LibraryName, value_wei: u128) -> Result<()> {
        let receipt = self
            .contract
            .purchaseLibraryLicense(name.to_string())
            .value(U256::from(value_wei))
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }

    /// `transferOwnership`.
    pub async fn transfer_ownership(&self, new_owner: Address) -> Result<()> {
        let receipt = self
            .contract
            .transferOwnership(new_owner)
            .send()
            .await
            .map_err(|e| self.translate(e))?
            .get_receipt()
            .await
            .map_err(|e| Error::classified(Kind::Tx, format!("transaction failed: {e}")))?;
        require_success(receipt)
    }
}

fn require_success(receipt: alloy::rpc::types::TransactionReceipt) -> Result<()> {
    if !receipt.status() {
        return Err(Error::classified(Kind::Tx, "transaction reverted".into()));
    }
    Ok(())
}
