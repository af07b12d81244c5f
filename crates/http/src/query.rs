//! Query engine: turns the store's raw rows into the two response models
//! the Simple API defines. Empty results are returned as empty lists; the
//! HTTP boundary decides whether that means 404.

use std::collections::BTreeSet;

use simple_index_core::model::{Meta, ProjectDetail, ProjectList, ProjectListEntry};
use simple_index_store::Store;

use crate::error::ApiError;

/// `list_projects(index)`, deduplicated (the store already returns
/// `DISTINCT` rows, but a second pass costs nothing and documents the
/// invariant) and sorted ascending by canonical name.
pub fn get_project_list(store: &Store, index: &str) -> Result<ProjectList, ApiError> {
    let mut names: BTreeSet<String> = store.list_projects(index)?.into_iter().collect();
    let projects: Vec<ProjectListEntry> = names
        .iter_mut()
        .map(|name| ProjectListEntry { name: name.clone() })
        .collect();
    Ok(ProjectList {
        meta: Meta::default(),
        projects,
    })
}

/// `list_files(project, index)`, already deduplicated-by-filename and
/// filename-ordered by the store's `GROUP BY ... HAVING ROWID = MIN(ROWID)`
/// query; this layer only collects the distinct version set, sorts it, and
/// turns each file's store-relative `url` into a request-absolute one by
/// prepending `files_url`.
pub fn get_project_detail(
    store: &Store,
    index: &str,
    canonical_project: &str,
    files_url: &str,
) -> Result<ProjectDetail, ApiError> {
    let rows = store.list_files(canonical_project, index)?;
    let mut versions: BTreeSet<String> = BTreeSet::new();
    let mut files = Vec::with_capacity(rows.len());
    for (version, mut file) in rows {
        versions.insert(version);
        file.url = format!("{}/{}", files_url.trim_end_matches('/'), file.url);
        files.push(file);
    }
    Ok(ProjectDetail {
        meta: Meta::default(),
        name: canonical_project.to_string(),
        versions: versions.into_iter().collect(),
        files,
    })
}
