//! Deterministic directory archiving and streaming extraction (`§4.3`).
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::{
    fs,
    io::{Read, Write},
    path::Path,
};
use tar::{Builder, Header};
use walkdir::WalkDir;

use crate::Result;

/// Build a gzipped tar archive of `source_dir`'s *contents* (no
/// wrapping directory) and write it to `writer`.
///
/// Entries are visited in sorted path order and stamped with a zeroed
/// mtime and uid/gid so that two archives of identical trees produce
/// byte-identical (and therefore identical-CID) output. Symlinks that
/// point at a missing target are skipped with a warning; any other
/// error aborts the archive.
pub fn archive<W: Write>(source_dir: &Path, writer: W) -> Result<()> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = Builder::new(encoder);

    let mut entries: Vec<_> = WalkDir::new(source_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path() != source_dir)
        .collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    for entry in entries {
        let path = entry.path();
        let relative = path.strip_prefix(source_dir).expect("path under source_dir");

        let link_metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };

        // Resolve symlinks to what they point at: the header's size and
        // the bytes actually written must describe the same file, and a
        // symlink's own metadata describes its target path string, not
        // its target's contents.
        let metadata = if link_metadata.file_type().is_symlink() {
            match fs::metadata(path) {
                Ok(metadata) => metadata,
                Err(_) => {
                    tracing::warn!(path = %path.display(), "symlink target missing, skipping");
                    continue;
                }
            }
        } else {
            link_metadata
        };

        if metadata.is_dir() {
            let mut header = deterministic_header(0);
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            builder.append_data(&mut header, relative, std::io::empty())?;
        } else {
            let size = metadata.len();
            let mut header = deterministic_header(size);
            let file = fs::File::open(path)?;
            builder.append_data(&mut header, relative, file)?;
        }
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

fn deterministic_header(size: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_size(size);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mode(0o644);
    header.set_cksum();
    header
}

/// Create `target_dir` (including parents) and stream-extract a
/// gzipped tar archive into it.
///
/// This is a streaming pipeline: the archive is never fully
/// materialized in memory, only the current entry.
pub fn extract<R: Read>(reader: R, target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    let decoder = GzDecoder::new(reader);
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(target_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Cursor;

    fn write_tree(root: &Path) -> Result<()> {
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src/lib.rs"), b"pub fn hi() {}")?;
        fs::write(root.join("Cargo.toml"), b"[package]\nname = \"x\"")?;
        Ok(())
    }

    #[test]
    fn archive_and_extract_roundtrip() -> Result<()> {
        let source = tempfile::tempdir()?;
        write_tree(source.path())?;

        let mut buffer = Vec::new();
        archive(source.path(), &mut buffer)?;

        let target = tempfile::tempdir()?;
        extract(Cursor::new(buffer), target.path())?;

        assert_eq!(
            "pub fn hi() {}",
            fs::read_to_string(target.path().join("src/lib.rs"))?
        );
        assert_eq!(
            "[package]\nname = \"x\"",
            fs::read_to_string(target.path().join("Cargo.toml"))?
        );
        Ok(())
    }

    #[test]
    fn archive_is_deterministic() -> Result<()> {
        let source = tempfile::tempdir()?;
        write_tree(source.path())?;

        let mut first = Vec::new();
        archive(source.path(), &mut first)?;

        let mut second = Vec::new();
        archive(source.path(), &mut second)?;

        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn extract_creates_nested_target() -> Result<()> {
        let source = tempfile::tempdir()?;
        write_tree(source.path())?;

        let mut buffer = Vec::new();
        archive(source.path(), &mut buffer)?;

        let target_parent = tempfile::tempdir()?;
        let target = target_parent.path().join("nested").join("deeper");
        extract(Cursor::new(buffer), &target)?;

        assert!(target.join("src/lib.rs").exists());
        Ok(())
    }

    #[test]
    fn symlink_to_real_file_archives_its_target_contents() -> Result<()> {
        let source = tempfile::tempdir()?;
        write_tree(source.path())?;
        // Deliberately longer than the symlink's own target path string,
        // so a header size taken from the link itself would disagree
        // with the bytes actually copied from the target.
        let long_content = b"x".repeat(4096);
        fs::write(source.path().join("real.bin"), &long_content)?;
        std::os::unix::fs::symlink(source.path().join("real.bin"), source.path().join("link.bin"))?;

        let mut buffer = Vec::new();
        archive(source.path(), &mut buffer)?;

        let target = tempfile::tempdir()?;
        extract(Cursor::new(buffer), target.path())?;

        assert_eq!(long_content, fs::read(target.path().join("link.bin"))?);
        // Entries after the symlink must still be intact: a corrupted
        // header size would desynchronize the rest of the tar stream.
        assert_eq!(
            "pub fn hi() {}",
            fs::read_to_string(target.path().join("src/lib.rs"))?
        );
        Ok(())
    }

    #[test]
    fn dangling_symlink_is_skipped_without_corrupting_the_archive() -> Result<()> {
        let source = tempfile::tempdir()?;
        write_tree(source.path())?;
        std::os::unix::fs::symlink(source.path().join("does-not-exist"), source.path().join("dangling"))?;

        let mut buffer = Vec::new();
        archive(source.path(), &mut buffer)?;

        let target = tempfile::tempdir()?;
        extract(Cursor::new(buffer), target.path())?;

        assert!(!target.join("dangling").exists());
        assert_eq!(
            "pub fn hi() {}",
            fs::read_to_string(target.path().join("src/lib.rs"))?
        );
        Ok(())
    }
}
