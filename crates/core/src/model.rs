//! Wire types shared by the index store, the query engine, and the
//! renderers. Field names and `Option` semantics mirror the Simple API
//! response shapes (PEP 503 / PEP 691 / PEP 700) exactly: absent optional
//! fields are omitted from JSON rather than serialized as `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "1.1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meta {
    pub api_version: String,
}

impl Default for Meta {
    fn default() -> Self {
        Meta {
            api_version: API_VERSION.to_string(),
        }
    }
}

/// A single distribution archive belonging to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectFile {
    pub filename: String,
    pub size: u64,
    pub url: String,
    /// Always contains exactly `{"sha256": <hex>}` — additional algorithms
    /// could be added later without changing the wire shape.
    pub hashes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_python: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_metadata: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanked: Option<String>,
    /// Present in the wire format but never populated by the scanner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpg_sig: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectListEntry {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectList {
    pub meta: Meta,
    pub projects: Vec<ProjectListEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectDetail {
    pub meta: Meta,
    pub name: String,
    pub versions: Vec<String>,
    pub files: Vec<ProjectFile>,
}
