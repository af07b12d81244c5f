//! Archive classification and embedded-metadata extraction for wheels and
//! sdists. Neither archive is ever loaded wholesale into memory — only the
//! single metadata entry is read out.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;
use zip::ZipArchive;

use crate::error::ScanError;

/// The two archive shapes the scanner accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Wheel,
    Sdist,
}

/// Classify a path by its filename suffix (case-sensitive). `None` means
/// "not ours" — the caller should skip the file silently.
pub fn classify(path: &Path) -> Option<ArchiveKind> {
    let name = path.file_name()?.to_str()?;
    if name.ends_with(".whl") {
        Some(ArchiveKind::Wheel)
    } else if name.ends_with(".tar.gz") {
        Some(ArchiveKind::Sdist)
    } else {
        None
    }
}

/// Read the embedded `METADATA` (wheel) or `PKG-INFO` (sdist) bytes out of a
/// classified archive.
pub fn read_metadata(path: &Path, kind: ArchiveKind) -> Result<Vec<u8>, ScanError> {
    match kind {
        ArchiveKind::Wheel => read_wheel_metadata(path),
        ArchiveKind::Sdist => read_sdist_metadata(path),
    }
}

fn file_name(path: &Path) -> Result<&str, ScanError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ScanError::invalid(path, "filename is not valid UTF-8"))
}

/// `{distribution}-{version}(-{build})?-{python}-{abi}-{platform}.whl` —
/// the dist-info directory name is built from the literal first two
/// dash-separated fields, not their canonicalized forms.
fn wheel_dist_info_entry(path: &Path) -> Result<String, ScanError> {
    let name = file_name(path)?;
    let stem = name
        .strip_suffix(".whl")
        .ok_or_else(|| ScanError::invalid(path, "missing .whl suffix"))?;
    let fields: Vec<&str> = stem.split('-').collect();
    if fields.len() < 5 || fields.iter().any(|f| f.is_empty()) {
        return Err(ScanError::invalid(
            path,
            format!("can't parse wheel filename {name:?}"),
        ));
    }
    Ok(format!("{}-{}.dist-info/METADATA", fields[0], fields[1]))
}

fn read_wheel_metadata(path: &Path) -> Result<Vec<u8>, ScanError> {
    let entry_name = wheel_dist_info_entry(path)?;
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| ScanError::invalid(path, format!("not a zip archive: {e}")))?;
    let mut entry = archive
        .by_name(&entry_name)
        .map_err(|_| ScanError::invalid(path, format!("missing {entry_name} in wheel")))?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| ScanError::io(path, e))?;
    Ok(bytes)
}

/// `{name}-{version}.tar.gz` — the enclosing directory inside the tar is the
/// filename with the `.tar.gz` suffix stripped.
fn sdist_pkg_info_entry(path: &Path) -> Result<String, ScanError> {
    let name = file_name(path)?;
    let stem = name
        .strip_suffix(".tar.gz")
        .ok_or_else(|| ScanError::invalid(path, "missing .tar.gz suffix"))?;
    if stem.is_empty() || stem.rsplit_once('-').is_none() {
        return Err(ScanError::invalid(
            path,
            format!("can't parse sdist filename {name:?}"),
        ));
    }
    Ok(format!("{stem}/PKG-INFO"))
}

fn read_sdist_metadata(path: &Path) -> Result<Vec<u8>, ScanError> {
    let entry_name = sdist_pkg_info_entry(path)?;
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut tar = Archive::new(decoder);
    let entries = tar.entries().map_err(|e| ScanError::io(path, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| ScanError::io(path, e))?;
        let entry_path = entry.path().map_err(|e| ScanError::io(path, e))?;
        if entry_path.as_os_str() == entry_name.as_str() {
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| ScanError::io(path, e))?;
            return Ok(bytes);
        }
    }
    Err(ScanError::invalid(
        path,
        format!("missing {entry_name} in sdist"),
    ))
}
