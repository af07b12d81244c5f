//! Name and version canonicalization (PEP 503 / PEP 440).

use std::fmt::Write as _;
use std::str::FromStr;

use pep440_rs::Version;

use crate::error::ScanError;

/// Lowercase the name and collapse any run of `-`, `_`, `.` to a single `-`.
pub fn canonicalize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut last_was_sep = false;
    for c in lower.chars() {
        if c == '-' || c == '_' || c == '.' {
            if !last_was_sep {
                out.push('-');
            }
            last_was_sep = true;
        } else {
            out.push(c);
            last_was_sep = false;
        }
    }
    out.trim_matches('-').to_string()
}

/// Parse a PEP 440 version string and re-emit its normalized form, trimming
/// trailing `.0` release segments (`8.3.0` -> `8.3`, `1.0.0` -> `1`).
/// Epoch, pre/post/dev and local segments are kept in their canonical
/// spelling via `pep440_rs`'s own rendering.
pub fn canonicalize_version(raw: &str) -> Result<String, ScanError> {
    let version = Version::from_str(raw.trim())
        .map_err(|e| ScanError::invalid(raw, format!("invalid version {raw:?}: {e}")))?;
    Ok(render_canonical(&version))
}

fn render_canonical(version: &Version) -> String {
    let mut out = String::new();

    if version.epoch() != 0 {
        let _ = write!(out, "{}!", version.epoch());
    }

    let release = version.release();
    let last_nonzero = release.iter().rposition(|&segment| segment != 0);
    let trimmed = match last_nonzero {
        Some(idx) => &release[..=idx],
        None => &release[..release.len().min(1)],
    };
    let parts: Vec<String> = trimmed.iter().map(u64::to_string).collect();
    out.push_str(&parts.join("."));

    if let Some(pre) = version.pre() {
        let _ = write!(out, "{pre}");
    }
    if let Some(post) = version.post() {
        let _ = write!(out, ".post{post}");
    }
    if let Some(dev) = version.dev() {
        let _ = write!(out, ".dev{dev}");
    }
    let local = version.local();
    if !local.is_empty() {
        let parts: Vec<String> = local.iter().map(ToString::to_string).collect();
        let _ = write!(out, "+{}", parts.join("."));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators_and_lowercases() {
        assert_eq!(canonicalize_name("Friendly-Bard"), "friendly-bard");
        assert_eq!(canonicalize_name("Friendly_Bard"), "friendly-bard");
        assert_eq!(canonicalize_name("FRIENDLY...bard"), "friendly-bard");
        assert_eq!(canonicalize_name("pytest"), "pytest");
    }

    #[test]
    fn trims_trailing_zero_release_segments() {
        assert_eq!(canonicalize_version("8.3.0").unwrap(), "8.3");
        assert_eq!(canonicalize_version("1.0.0").unwrap(), "1");
        assert_eq!(canonicalize_version("8.3.4").unwrap(), "8.3.4");
        assert_eq!(canonicalize_version("2.0.0").unwrap(), "2");
    }

    #[test]
    fn keeps_pre_post_dev_segments() {
        assert_eq!(canonicalize_version("1.0.0a1").unwrap(), "1a1");
        assert_eq!(canonicalize_version("1.0.0.post1").unwrap(), "1.post1");
    }

    #[test]
    fn rejects_garbage() {
        assert!(canonicalize_version("not-a-version").is_err());
    }
}
