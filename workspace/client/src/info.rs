//! Info renderer (`§4.5`/`§4.8`): assembles a library's metadata, an
//! optional version's metadata, and the caller's access state into one
//! value the command layer prints.
use semver::Version;

use tacopkm_core::{LibraryName, LibraryRecord, VersionRecord};

use crate::access::{self, AccessState};
use crate::context::Context;
use crate::Result;

/// Everything `info <name>[@<version>]` needs to render.
pub struct LibraryInfo {
    /// The library's name.
    pub name: LibraryName,
    /// Library metadata as read from the registry.
    pub record: LibraryRecord,
    /// The caller's access state against this library.
    pub access: AccessState,
    /// Version metadata, present when a version was requested.
    pub version: Option<(Version, VersionRecord)>,
    /// Every published version number, present when `--versions` was asked for.
    pub versions: Option<Vec<Version>>,
}

/// Assemble library (and optional version) info for rendering.
pub async fn gather(
    ctx: &Context,
    name: &LibraryName,
    version: Option<&Version>,
    include_versions: bool,
) -> Result<LibraryInfo> {
    let record = ctx.chain.get_library_info(name).await?;
    let caller = ctx.caller();
    let access = access::evaluate(&ctx.chain, name, &record, caller).await?;

    let version = match version {
        Some(v) => {
            let record = ctx.chain.get_version_info(name, v).await?;
            Some((v.clone(), record))
        }
        None => None,
    };

    let versions = if include_versions {
        Some(ctx.chain.get_version_numbers(name).await?)
    } else {
        None
    };

    Ok(LibraryInfo {
        name: name.clone(),
        record,
        access,
        version,
        versions,
    })
}
