//! Dependency resolver and installer (`§4.6`): depth-first, strictly
//! sequential version resolution over the on-chain dependency graph,
//! with `resolved` acting as both memo and conflict oracle.
use std::collections::BTreeMap;
use std::path::Path;

use futures::future::BoxFuture;
use futures::StreamExt;
use semver::Version;
use tokio::io::AsyncWriteExt;

use tacopkm_core::{max_satisfying, InstallTarget, LibraryName, VersionConstraint, INSTALL_ROOT};

use crate::access::denial_reason;
use crate::context::Context;
use crate::error::Kind;
use crate::{Error, Result};

/// Exact versions chosen for each library touched during one install
/// run. Discarded at the end of the run, successful or not.
#[derive(Debug, Default)]
pub struct ResolvedSet(BTreeMap<LibraryName, Version>);

impl ResolvedSet {
    /// An empty resolved set.
    pub fn new() -> Self {
        ResolvedSet::default()
    }

    /// The version chosen for `name`, if resolution has reached it.
    pub fn get(&self, name: &LibraryName) -> Option<&Version> {
        self.0.get(name)
    }

    /// Every `(name, version)` pair resolved this run, in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&LibraryName, &Version)> {
        self.0.iter()
    }
}

fn exact(version: &Version) -> Result<VersionConstraint> {
    VersionConstraint::parse(&format!("={version}")).map_err(|e| Error::Core(e.into()))
}

/// Resolve and install `target` under `install_root`, per `§4.6`.
pub async fn install(ctx: &Context, target: InstallTarget, install_root: &Path) -> Result<ResolvedSet> {
    let constraint = match &target.version {
        Some(version) => exact(version)?,
        None => {
            let available = ctx.chain.get_version_numbers(&target.name).await?;
            let latest = tacopkm_core::latest_stable(&available).ok_or_else(|| {
                Error::classified(Kind::NotFound, format!("'{}' has no stable versions published", target.name))
            })?;
            exact(latest)?
        }
    };

    if let Some(caller) = ctx.caller() {
        if !ctx.chain.has_access(&target.name, caller).await? {
            let record = ctx.chain.get_library_info(&target.name).await?;
            return Err(Error::classified(Kind::Permission, denial_reason(&target.name, &record)));
        }
    }

    let mut resolved = ResolvedSet::new();
    resolve(ctx, target.name, constraint, &mut resolved, install_root).await?;
    Ok(resolved)
}

fn resolve<'a>(
    ctx: &'a Context,
    name: LibraryName,
    constraint: VersionConstraint,
    resolved: &'a mut ResolvedSet,
    install_root: &'a Path,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        if let Some(existing) = resolved.get(&name) {
            if constraint.matches(existing) {
                return Ok(());
            }
            return Err(Error::classified(
                Kind::Conflict,
                format!(
                    "version conflict on '{name}': already resolved to {existing}, which does not satisfy {constraint}"
                ),
            ));
        }

        let available = ctx.chain.get_version_numbers(&name).await?;
        if available.is_empty() {
            return Err(Error::classified(Kind::NotFound, format!("'{name}' does not exist")));
        }

        let chosen = max_satisfying(&available, &constraint)
            .cloned()
            .ok_or_else(|| {
                Error::classified(
                    Kind::NotFound,
                    format!("no version of '{name}' satisfies {constraint}"),
                )
            })?;

        if let Some(caller) = ctx.caller() {
            if !ctx.chain.has_access(&name, caller).await? {
                let record = ctx.chain.get_library_info(&name).await?;
                return Err(Error::classified(Kind::Permission, denial_reason(&name, &record)));
            }
        }

        resolved.0.insert(name.clone(), chosen.clone());

        let info = match ctx.chain.get_version_info(&name, &chosen).await {
            Ok(info) => info,
            Err(err) => {
                resolved.0.remove(&name);
                return Err(err);
            }
        };

        if !info.has_valid_artifact() {
            resolved.0.remove(&name);
            return Err(Error::classified(
                Kind::BadRecord,
                format!("'{name}@{chosen}' has no usable artifact on-chain"),
            ));
        }
        if info.deprecated {
            tracing::warn!(name = %name, version = %chosen, "installing a deprecated version");
        }

        let target_dir = install_root.join(name.as_str()).join(chosen.to_string());
        let archive = download_to_temp(ctx, &info.ipfs_hash).await?;
        let file = std::fs::File::open(archive.path())?;
        tacopkm_core::tarball::extract(file, &target_dir)?;

        for (dep_name, dep_constraint) in info.dependencies {
            resolve(ctx, dep_name, dep_constraint, resolved, install_root).await?;
        }

        Ok(())
    })
}

/// Stream an IPFS object to a temp file, chunk by chunk, so the archive
/// is never held in memory whole before extraction (`§4.3`). The file
/// is reopened for reading and fed into `tarball::extract`, which
/// itself streams the gzip/tar decode.
async fn download_to_temp(ctx: &Context, cid: &str) -> Result<tempfile::NamedTempFile> {
    let temp = tempfile::NamedTempFile::new()?;
    let mut file = tokio::fs::File::create(temp.path()).await?;
    let mut stream = ctx.ipfs.cat_stream(cid);
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| Error::classified(Kind::IpfsNotFound, format!("could not fetch {cid}: {e}")))?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(temp)
}

/// Default install root, relative to the current working directory.
pub fn default_install_root() -> &'static Path {
    Path::new(INSTALL_ROOT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_constraint_matches_only_that_version() {
        let v = Version::parse("1.2.3").unwrap();
        let constraint = exact(&v).unwrap();
        assert!(constraint.matches(&v));
        assert!(!constraint.matches(&Version::parse("1.2.4").unwrap()));
    }

    #[test]
    fn resolved_set_starts_empty() {
        let set = ResolvedSet::new();
        let name: LibraryName = "x".parse().unwrap();
        assert!(set.get(&name).is_none());
    }
}
