//! RFC 822-style metadata parsing (the format used by both wheel
//! `METADATA` and sdist `PKG-INFO` files) and canonicalization of the
//! `Name`/`Version` headers it yields.

use std::collections::HashMap;
use std::path::Path;

use crate::canonical::{canonicalize_name, canonicalize_version};
use crate::error::ScanError;

/// A parsed RFC 822-style header block. Keys are preserved in their
/// original case; lookups are case-sensitive on the exact header name,
/// matching the core-metadata spec's fixed vocabulary (`Name`,
/// `Version`, `Requires-Python`, ...).
#[derive(Debug, Default)]
pub struct Rfc822 {
    fields: HashMap<String, Vec<String>>,
}

impl Rfc822 {
    /// Parse headers up to the first blank line (the body, if any, is the
    /// package long description and is not needed here).
    pub fn parse(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }
            if (line.starts_with(' ') || line.starts_with('\t')) && current.is_some() {
                let (_, value) = current.as_mut().unwrap();
                value.push('\n');
                value.push_str(line.trim_start());
                continue;
            }
            if let Some((key, value)) = current.take() {
                fields.entry(key).or_default().push(value);
            }
            if let Some((key, value)) = line.split_once(':') {
                current = Some((key.trim().to_string(), value.trim().to_string()));
            }
        }
        if let Some((key, value)) = current.take() {
            fields.entry(key).or_default().push(value);
        }

        Rfc822 { fields }
    }

    /// Take the single required occurrence of `key`.
    pub fn take(&self, key: &str) -> Result<String, String> {
        match self.fields.get(key).map(Vec::as_slice) {
            Some([single]) => Ok(single.clone()),
            Some([]) | None => Err(format!("missing key {key}")),
            Some(_) => Err(format!("duplicate key {key}")),
        }
    }

    /// Take an optional header, erroring only if it appears more than once.
    pub fn maybe_take(&self, key: &str) -> Result<Option<String>, String> {
        match self.fields.get(key).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([single]) => Ok(Some(single.clone())),
            Some(_) => Err(format!("duplicate key {key}")),
        }
    }

    /// Take every occurrence of a repeatable header (e.g. `Requires-Dist`).
    pub fn take_all(&self, key: &str) -> Vec<String> {
        self.fields.get(key).cloned().unwrap_or_default()
    }
}

/// The subset of core metadata the index store cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    pub canonical_name: String,
    pub version: String,
    pub canonical_version: String,
    pub requires_python: Option<String>,
}

/// Parse core metadata bytes, validating and canonicalizing `Name` and
/// `Version`. `Requires-Python` is passed through unmodified (it's a PEP 440
/// specifier string, not a version).
pub fn parse_metadata(bytes: &[u8], source: &Path) -> Result<Metadata, ScanError> {
    let parsed = Rfc822::parse(bytes);

    let name = parsed
        .take("Name")
        .map_err(|e| ScanError::invalid(source, e))?;
    let version = parsed
        .take("Version")
        .map_err(|e| ScanError::invalid(source, e))?;
    let requires_python = parsed
        .maybe_take("Requires-Python")
        .map_err(|e| ScanError::invalid(source, e))?;

    if name.trim().is_empty() {
        return Err(ScanError::invalid(source, "empty Name header"));
    }

    let canonical_name = canonicalize_name(&name);
    let canonical_version = canonicalize_version(&version)?;

    Ok(Metadata {
        name,
        canonical_name,
        version,
        canonical_version,
        requires_python,
    })
}
