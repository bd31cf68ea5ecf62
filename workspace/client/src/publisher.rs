//! Publish pipeline (`§4.7`): read `lib.config.json`, validate, check
//! ownership, archive, upload, and commit a version on-chain.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::Deserialize;
use serde_json::Value;

use tacopkm_core::LibraryName;

use crate::context::Context;
use crate::error::Kind;
use crate::{Error, Result};

#[derive(Deserialize)]
struct LibConfigRaw {
    name: String,
    version: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, Value>,
}

/// A validated `lib.config.json`, ready to publish.
pub struct LibConfig {
    /// Library name, already validated.
    pub name: LibraryName,
    /// Version to publish, after any `--version` override.
    pub version: Version,
    /// Free-text description, if present.
    pub description: String,
    /// Free-text language tag, if present.
    pub language: String,
    /// Dependency constraints, sent on-chain verbatim.
    pub dependencies: Vec<(LibraryName, String)>,
}

/// Read and validate `<directory>/lib.config.json`, applying an
/// optional version override.
pub fn read_config(directory: &Path, version_override: Option<&str>) -> Result<LibConfig> {
    let path = directory.join("lib.config.json");
    if !path.is_file() {
        return Err(Error::NotFile(path));
    }
    let buffer = std::fs::read(&path)?;
    let raw: LibConfigRaw = serde_json::from_slice(&buffer)?;

    let name: LibraryName = raw.name.parse()?;

    let version_str = version_override.unwrap_or(&raw.version);
    let version = Version::parse(version_str)
        .map_err(|e| Error::classified(Kind::Validation, format!("invalid version '{version_str}': {e}")))?;

    let mut dependencies = Vec::with_capacity(raw.dependencies.len());
    for (dep_name, value) in raw.dependencies {
        let constraint = match value {
            Value::String(s) if !s.trim().is_empty() => s,
            _ => {
                tracing::warn!(dependency = %dep_name, "dropping dependency with empty or non-string constraint");
                continue;
            }
        };
        let dep_name: LibraryName = match dep_name.parse() {
            Ok(name) => name,
            Err(_) => {
                tracing::warn!(dependency = %dep_name, "dropping dependency with invalid name");
                continue;
            }
        };
        if semver::VersionReq::parse(&constraint).is_err() {
            tracing::warn!(dependency = %dep_name, constraint = %constraint, "dependency constraint does not parse as semver, publishing as written");
        }
        dependencies.push((dep_name, constraint));
    }

    Ok(LibConfig {
        name,
        version,
        description: raw.description.unwrap_or_default(),
        language: raw.language.unwrap_or_default(),
        dependencies,
    })
}

/// Write a starter `lib.config.json` template into `directory`
/// (`init` command). Refuses to overwrite an existing file.
pub fn write_template(directory: &Path, name: &LibraryName) -> Result<PathBuf> {
    let path = directory.join("lib.config.json");
    if path.exists() {
        return Err(Error::AlreadyExists(path));
    }
    let template = serde_json::json!({
        "name": name.as_str(),
        "version": "0.1.0",
        "description": "",
        "language": "",
        "dependencies": {},
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&template)?)?;
    Ok(path)
}

/// Run the publish pipeline against an already-validated config.
pub async fn publish(ctx: &Context, directory: &Path, config: LibConfig) -> Result<()> {
    let signer = ctx.require_signer()?;

    let info = ctx.chain.get_library_info(&config.name).await.map_err(|err| {
        if err.kind() == Kind::NotFound {
            Error::classified(
                Kind::NotFound,
                format!("'{}' is not registered; run `register` first", config.name),
            )
        } else {
            err
        }
    })?;
    if info.owner != signer.address() {
        return Err(Error::classified(
            Kind::Permission,
            format!("'{}' is owned by {}, not the loaded wallet", config.name, info.owner),
        ));
    }

    let temp_path = temp_archive_path(signer.address());
    let result = publish_inner(ctx, directory, &config, &temp_path).await;

    if let Err(io_err) = std::fs::remove_file(&temp_path) {
        if io_err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %temp_path.display(), error = %io_err, "failed to clean up temp archive");
        }
    }

    result
}

async fn publish_inner(ctx: &Context, directory: &Path, config: &LibConfig, temp_path: &Path) -> Result<()> {
    let signer = ctx.require_signer()?;

    let file = std::fs::File::create(temp_path)?;
    tacopkm_core::tarball::archive(directory, file)?;

    let bytes = std::fs::read(temp_path)?;
    let cid = ctx.ipfs.add(bytes).await?;
    if cid.trim().is_empty() {
        return Err(Error::classified(Kind::BadRecord, "IPFS returned an empty CID".into()));
    }

    signer
        .publish_version(&config.name, &config.version, &cid, &config.dependencies)
        .await
}

fn temp_archive_path(signer: alloy::primitives::Address) -> PathBuf {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("tpkm-publish-{signer}-{now}.tar.gz"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_validates_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lib.config.json"),
            r#"{"name":"left-pad","version":"1.0.0","dependencies":{"right-pad":"^1.0.0","bad":123,"":"^1.0.0"}}"#,
        )
        .unwrap();

        let config = read_config(dir.path(), None).unwrap();
        assert_eq!("left-pad", config.name.as_str());
        assert_eq!(Version::parse("1.0.0").unwrap(), config.version);
        assert_eq!(1, config.dependencies.len());
        assert_eq!("right-pad", config.dependencies[0].0.as_str());
    }

    #[test]
    fn version_override_replaces_declared_version() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.config.json"), r#"{"name":"left-pad","version":"1.0.0"}"#).unwrap();

        let config = read_config(dir.path(), Some("2.0.0")).unwrap();
        assert_eq!(Version::parse("2.0.0").unwrap(), config.version);
    }

    #[test]
    fn missing_config_file_is_not_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_config(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::NotFile(_)));
    }

    #[test]
    fn template_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let name: LibraryName = "left-pad".parse().unwrap();
        write_template(dir.path(), &name).unwrap();
        let err = write_template(dir.path(), &name).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }
}
