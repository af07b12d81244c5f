//! Distribution scanner: walks `files_dir`, classifies and reads each
//! candidate archive, and produces the records the index store commits.
//!
//! This module never touches the store itself — it only discovers files and
//! turns them into `(sub_index, project, version, ProjectFile)` tuples plus
//! the sidecar side effect. The caller (the store crate's `update`) drives
//! the idempotency check and the insert.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use filetime::{set_file_times, FileTime};
use ignore::WalkBuilder;

use crate::archive::{self, ArchiveKind};
use crate::error::ScanError;
use crate::hash::{sha256_bytes, sha256_file};
use crate::metadata::parse_metadata;
use crate::model::ProjectFile;

/// A file discovered under `files_dir`, tagged with the sub-index it belongs
/// to (the "" root index, or its immediate parent directory name).
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub index: String,
    pub path: PathBuf,
}

/// The result of successfully reading one distribution archive.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub project: String,
    pub version: String,
    pub file: ProjectFile,
}

/// Recursively walk `files_dir`, skipping `cache_dir` if nested inside it,
/// yielding every regular file tagged with its sub-index.
///
/// The sub-index is the file's immediate containing directory, relative to
/// `files_dir`, with a leading `./` stripped — *not* every prefix of the
/// relative path. Sub-indexes are flat; nesting is offered at query time via
/// the GLOB prefix match, not by multiplying store rows.
pub fn walk(files_dir: &Path, cache_dir: &Path) -> Vec<DiscoveredFile> {
    let cache_dir = fs::canonicalize(cache_dir).unwrap_or_else(|_| cache_dir.to_path_buf());
    let mut out = Vec::new();

    let mut builder = WalkBuilder::new(files_dir);
    builder
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .standard_filters(false);

    for entry in builder.build() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if let Ok(canon) = fs::canonicalize(path) {
            if canon.starts_with(&cache_dir) {
                continue;
            }
        }
        let index = sub_index_of(files_dir, path);
        out.push(DiscoveredFile {
            index,
            path: path.to_path_buf(),
        });
    }

    out
}

fn sub_index_of(files_dir: &Path, path: &Path) -> String {
    let parent = path.parent().unwrap_or(files_dir);
    let rel = parent.strip_prefix(files_dir).unwrap_or(Path::new(""));
    if rel.as_os_str().is_empty() {
        return String::new();
    }
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Classify, read and hash one archive, and write its metadata sidecar.
/// Returns `ScanError::UnhandledFileType` for files the scanner doesn't
/// recognize — callers must treat that case as "skip silently", never log
/// it as a failure.
pub fn ingest(files_dir: &Path, cache_dir: &Path, path: &Path) -> Result<Ingested, ScanError> {
    let kind = archive::classify(path).ok_or_else(|| ScanError::UnhandledFileType(path.to_path_buf()))?;

    let metadata_bytes = archive::read_metadata(path, kind)?;
    let meta = parse_metadata(&metadata_bytes, path)?;

    let file_meta = fs::metadata(path).map_err(|e| ScanError::io(path, e))?;
    let size = file_meta.len();
    let sha256 = sha256_file(path).map_err(|e| ScanError::io(path, e))?;

    let rel_url = path
        .strip_prefix(files_dir)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let core_metadata_sha256 = sha256_bytes(&metadata_bytes);
    write_sidecar(files_dir, cache_dir, path, &metadata_bytes)?;

    let mut hashes = std::collections::BTreeMap::new();
    hashes.insert("sha256".to_string(), sha256);

    let mut core_metadata = std::collections::BTreeMap::new();
    core_metadata.insert("sha256".to_string(), core_metadata_sha256);

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ScanError::invalid(path, "filename is not valid UTF-8"))?
        .to_string();

    let file = ProjectFile {
        filename: file_name,
        size,
        url: rel_url,
        hashes,
        requires_python: meta.requires_python,
        core_metadata: Some(core_metadata),
        yanked: None,
        gpg_sig: None,
    };

    Ok(Ingested {
        project: meta.canonical_name,
        version: meta.canonical_version,
        file,
    })
}

/// Write the sidecar via a temp-file-then-rename so a cancelled or crashed
/// write never leaves a half-written `.metadata` file behind, and copy the
/// source archive's atime/mtime onto it.
fn write_sidecar(
    files_dir: &Path,
    cache_dir: &Path,
    path: &Path,
    metadata_bytes: &[u8],
) -> Result<(), ScanError> {
    let rel = path.strip_prefix(files_dir).unwrap_or(path);
    let sidecar_path = {
        let mut p = cache_dir.join(rel);
        let mut name = p.file_name().unwrap_or_default().to_os_string();
        name.push(".metadata");
        p.set_file_name(name);
        p
    };

    let parent = sidecar_path.parent().unwrap_or(cache_dir);
    fs::create_dir_all(parent).map_err(|e| ScanError::io(path, e))?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        sidecar_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("sidecar")
    ));
    {
        let mut tmp = fs::File::create(&tmp_path).map_err(|e| ScanError::io(path, e))?;
        tmp.write_all(metadata_bytes)
            .map_err(|e| ScanError::io(path, e))?;
        tmp.sync_all().map_err(|e| ScanError::io(path, e))?;
    }
    fs::rename(&tmp_path, &sidecar_path).map_err(|e| ScanError::io(path, e))?;

    let source_meta = fs::metadata(path).map_err(|e| ScanError::io(path, e))?;
    let atime = FileTime::from_last_access_time(&source_meta);
    let mtime = FileTime::from_last_modification_time(&source_meta);
    set_file_times(&sidecar_path, atime, mtime).map_err(|e| ScanError::io(path, e))?;

    Ok(())
}
