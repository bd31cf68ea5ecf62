//! Named network profiles and the effective-configuration precedence
//! chain (`§4.1`).
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::Kind;
use crate::{Error, Result};

const SCHEMES: &[&str] = &["http", "https", "ws", "wss"];
const DEFAULT_IPFS_URL: &str = "http://127.0.0.1:5001/api/v0";

/// A single named `{rpcUrl, contractAddress}` endpoint pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    /// JSON-RPC endpoint for the chain.
    #[serde(rename = "rpcUrl")]
    pub rpc_url: Url,
    /// Registry contract address on that chain.
    #[serde(rename = "contractAddress")]
    pub contract_address: Address,
    /// Any fields the current binary does not understand, preserved
    /// verbatim on round-trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The on-disk `networks.json` contract (`§6`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "activeNetwork")]
    active_network: Option<String>,
    networks: BTreeMap<String, Profile>,
}

impl Default for Store {
    fn default() -> Self {
        Store {
            active_network: None,
            networks: BTreeMap::new(),
        }
    }
}

impl Store {
    /// Load the store from `path`, defaulting to an empty store when
    /// the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Store::default());
        }
        let buffer = std::fs::read(path)?;
        let store: Store = serde_json::from_slice(&buffer)?;
        Ok(store)
    }

    /// Persist the store to `path`, pretty-printed with two-space
    /// indent.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut buffer,
            serde_json::ser::PrettyFormatter::with_indent(b"  "),
        );
        serde::Serialize::serialize(self, &mut serializer)?;
        std::fs::write(path, buffer)?;
        Ok(())
    }

    /// Upsert a named profile, validating the RPC scheme and address.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        rpc_url: Url,
        contract_address: Address,
        set_active: bool,
    ) -> Result<()> {
        if !SCHEMES.contains(&rpc_url.scheme()) {
            return Err(Error::classified(
                Kind::Validation,
                format!("unsupported RPC scheme: {}", rpc_url.scheme()),
            ));
        }
        let name = name.into();
        self.networks.insert(
            name.clone(),
            Profile {
                rpc_url,
                contract_address,
                extra: Map::new(),
            },
        );
        if set_active {
            self.active_network = Some(name);
        }
        Ok(())
    }

    /// Select the active profile by name.
    pub fn set_active(&mut self, name: &str) -> Result<()> {
        if !self.networks.contains_key(name) {
            return Err(Error::classified(
                Kind::NotFound,
                format!("no such network profile: {name}"),
            ));
        }
        self.active_network = Some(name.to_string());
        Ok(())
    }

    /// List all profile names in stored order.
    pub fn list(&self) -> Vec<&String> {
        self.networks.keys().collect()
    }

    /// Look up a profile by name, or the active profile when `name` is
    /// `None`.
    pub fn show(&self, name: Option<&str>) -> Option<(&String, &Profile)> {
        match name {
            Some(name) => self.networks.get_key_value(name),
            None => {
                let active = self.active_network.as_ref()?;
                self.networks.get_key_value(active)
            }
        }
    }

    /// Remove a profile. Clears the active selector if it was the
    /// removed profile, returning `true` in that case so the caller
    /// can warn.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        if self.networks.remove(name).is_none() {
            return Err(Error::classified(
                Kind::NotFound,
                format!("no such network profile: {name}"),
            ));
        }
        if self.active_network.as_deref() == Some(name) {
            self.active_network = None;
            return Ok(true);
        }
        Ok(false)
    }

    fn valid_active(&self) -> Option<&Profile> {
        let name = self.active_network.as_ref()?;
        self.networks.get(name)
    }
}

/// The effective endpoints resolved for a chain-touching command,
/// after applying the precedence chain in `§4.1`.
#[derive(Clone, Debug)]
pub struct Effective {
    /// Resolved JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Resolved registry contract address.
    pub contract_address: Address,
    /// Resolved IPFS HTTP API endpoint (always resolves, falling back
    /// to the local daemon default).
    pub ipfs_url: Url,
}

/// Resolve the effective configuration: active profile, then
/// environment variables, then (for IPFS only) a hardcoded default.
/// A partial or invalid active profile downgrades to the environment
/// with a warning rather than failing outright.
pub fn resolve(store: &Store) -> Result<Effective> {
    let from_profile = store.valid_active();

    let (rpc_url, contract_address) = if let Some(profile) = from_profile {
        (profile.rpc_url.clone(), profile.contract_address)
    } else {
        if store.active_network.is_some() {
            tracing::warn!("active network profile is invalid, falling back to environment");
        }
        let rpc_url = std::env::var("RPC_URL").map_err(|_| {
            Error::classified(
                Kind::ConfigMissing,
                "no network configured: run `config add` or set RPC_URL/CONTRACT_ADDRESS".into(),
            )
        })?;
        let rpc_url: Url = rpc_url
            .parse()
            .map_err(|_| Error::classified(Kind::Validation, format!("invalid RPC_URL: {rpc_url}")))?;
        let contract_address = std::env::var("CONTRACT_ADDRESS").map_err(|_| {
            Error::classified(Kind::ConfigMissing, "CONTRACT_ADDRESS is not set".into())
        })?;
        let contract_address: Address = contract_address.parse().map_err(|_| {
            Error::classified(
                Kind::Validation,
                format!("invalid CONTRACT_ADDRESS: {contract_address}"),
            )
        })?;
        (rpc_url, contract_address)
    };

    let ipfs_url = std::env::var("IPFS_API_URL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| DEFAULT_IPFS_URL.parse().expect("default IPFS URL is valid"));

    Ok(Effective {
        rpc_url,
        contract_address,
        ipfs_url,
    })
}

/// Default network profile store path: `<home>/.tacopkm/networks.json`.
pub fn default_path() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| Error::classified(Kind::ConfigMissing, "HOME is not set".into()))?;
    Ok(home.join(".tacopkm").join("networks.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::from(bytes)
    }

    #[test]
    fn add_rejects_unsupported_scheme() {
        let mut store = Store::default();
        let url: Url = "ftp://example.com".parse().unwrap();
        let err = store.add("x", url, addr(1), false).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn remove_active_clears_selector_and_warns() {
        let mut store = Store::default();
        let url: Url = "http://localhost:8545".parse().unwrap();
        store.add("local", url, addr(1), true).unwrap();

        let warned = store.remove("local").unwrap();
        assert!(warned);
        assert!(store.show(None).is_none());
    }

    #[test]
    fn save_and_load_roundtrip_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("networks.json");

        let mut store = Store::default();
        let url: Url = "http://localhost:8545".parse().unwrap();
        store.add("local", url.clone(), addr(2), true).unwrap();
        store.save(&path).unwrap();

        let loaded = Store::load(&path).unwrap();
        let (name, profile) = loaded.show(None).unwrap();
        assert_eq!(name, "local");
        assert_eq!(profile.rpc_url, url);
        assert_eq!(profile.contract_address, addr(2));
    }

    #[test]
    fn invalid_active_selector_falls_through_to_env() {
        std::env::set_var("RPC_URL", "http://env-rpc:8545");
        std::env::set_var("CONTRACT_ADDRESS", addr(3).to_checksum(None));
        std::env::remove_var("IPFS_API_URL");

        let store = Store::default();
        let effective = resolve(&store).unwrap();
        assert_eq!(effective.contract_address, addr(3));
        assert_eq!(effective.ipfs_url.as_str(), DEFAULT_IPFS_URL);

        std::env::remove_var("RPC_URL");
        std::env::remove_var("CONTRACT_ADDRESS");
    }
}
