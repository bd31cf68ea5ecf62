//! Encrypted local wallet (`§4.2`): a V3 JSON keystore file holding a
//! single secp256k1 signing key.
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use k256::ecdsa::SigningKey;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use web3_keystore::{decrypt, encrypt, KeyStore};

use crate::error::Kind;
use crate::input::read_password;
use crate::{Error, Result};

/// Name of the keystore file inside `<home>/.tacopkm/`.
pub const KEYSTORE_FILE: &str = "keystore.json";

fn require_nonempty(password: &SecretString) -> Result<()> {
    if password.expose_secret().is_empty() {
        return Err(Error::EmptyPassword);
    }
    Ok(())
}

/// Create a new keystore at `path`, refusing to overwrite an existing
/// file unless `overwrite` is `true`.
pub fn create(path: &Path, password: SecretString, overwrite: bool) -> Result<Address> {
    if path.exists() && !overwrite {
        return Err(Error::AlreadyExists(path.to_path_buf()));
    }
    require_nonempty(&password)?;

    let key = SigningKey::random(&mut rand::thread_rng());
    write_keystore(path, &key, &password)
}

/// Import an existing private key (32-byte hex, with or without a
/// leading `0x`) into a keystore at `path`.
pub fn import(path: &Path, private_key: &str, password: SecretString, overwrite: bool) -> Result<Address> {
    if path.exists() && !overwrite {
        return Err(Error::AlreadyExists(path.to_path_buf()));
    }
    require_nonempty(&password)?;

    let hex = private_key.trim_start_matches("0x");
    let bytes = hex::decode(hex)
        .map_err(|_| Error::classified(Kind::Validation, format!("invalid private key: {private_key}")))?;
    let key = SigningKey::from_slice(&bytes)?;
    write_keystore(path, &key, &password)
}

fn write_keystore(path: &Path, key: &SigningKey, password: &SecretString) -> Result<Address> {
    let public_key = key.verifying_key();
    let signer = PrivateKeySigner::from_signing_key(key.clone());
    let address = signer.address();

    let keystore = encrypt(
        &mut rand::thread_rng(),
        key.to_bytes(),
        password.expose_secret(),
        Some(address.to_checksum(None)),
    )
    .map_err(|e| Error::classified(Kind::Unknown, format!("failed to encrypt keystore: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let buffer = serde_json::to_vec_pretty(&keystore)?;
    std::fs::write(path, buffer)?;

    let _ = public_key;
    Ok(address)
}

/// Read the `address` field of a V3 keystore without decrypting it.
pub fn address_without_decrypt(path: &Path) -> Result<Address> {
    if !path.is_file() {
        return Err(Error::classified(
            Kind::KeystoreMissing,
            format!("no keystore at {}", path.display()),
        ));
    }
    let buffer = std::fs::read(path)?;
    let value: Value = serde_json::from_slice(&buffer)
        .map_err(|e| Error::classified(Kind::KeystoreCorrupt, e.to_string()))?;
    let address = value
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::classified(Kind::KeystoreCorrupt, "keystore is missing an address field".into()))?;
    let address: Address = address
        .parse()
        .map_err(|_| Error::classified(Kind::KeystoreCorrupt, "keystore address is not a valid address".into()))?;
    Ok(address)
}

/// Decrypt the keystore at `path` with `password`, returning a signer
/// usable directly by the chain client.
pub fn decrypt_signer(path: &Path, password: &SecretString) -> Result<PrivateKeySigner> {
    if !path.is_file() {
        return Err(Error::classified(
            Kind::KeystoreMissing,
            format!("no keystore at {}", path.display()),
        ));
    }
    let buffer = std::fs::read(path)?;
    let keystore: KeyStore = serde_json::from_slice(&buffer)
        .map_err(|e| Error::classified(Kind::KeystoreCorrupt, e.to_string()))?;

    let key_bytes: Vec<u8> = decrypt(&keystore, password.expose_secret())
        .map_err(|_| Error::classified(Kind::Auth, "incorrect keystore password".into()))?;
    let signing_key = SigningKey::from_slice(&key_bytes)?;
    Ok(PrivateKeySigner::from_signing_key(signing_key))
}

/// Prompt for a password, preferring `TPKM_WALLET_PASSWORD` when set.
pub fn prompt_password(prompt: Option<&str>) -> Result<SecretString> {
    if let Ok(value) = std::env::var(tacopkm_core::WALLET_PASSWORD_ENV) {
        return Ok(SecretString::new(value));
    }
    read_password(prompt)
}

/// Default keystore path: `<home>/.tacopkm/keystore.json`.
pub fn default_path() -> Result<PathBuf> {
    let home = dirs_home()?;
    Ok(home.join(".tacopkm").join(KEYSTORE_FILE))
}

fn dirs_home() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| Error::classified(Kind::ConfigMissing, "HOME is not set".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_address_without_decrypt_matches_decrypt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        let password = SecretString::new("hunter2".to_string());

        let created = create(&path, password.clone(), false).unwrap();
        let plain = address_without_decrypt(&path).unwrap();
        assert_eq!(created, plain);

        let signer = decrypt_signer(&path, &password).unwrap();
        assert_eq!(created, signer.address());
    }

    #[test]
    fn refuses_to_overwrite_without_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        let password = SecretString::new("hunter2".to_string());

        create(&path, password.clone(), false).unwrap();
        let err = create(&path, password, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn wrong_password_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        create(&path, SecretString::new("right".to_string()), false).unwrap();

        let err = decrypt_signer(&path, &SecretString::new("wrong".to_string())).unwrap_err();
        assert_eq!(err.kind(), Kind::Auth);
    }

    #[test]
    fn empty_password_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        let err = create(&path, SecretString::new(String::new()), false).unwrap_err();
        assert!(matches!(err, Error::EmptyPassword));
    }
}
