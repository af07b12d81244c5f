//! The index store: a persistent mapping `(index, project, filename) ->
//! ProjectFile`, backed by an embedded SQLite database, plus the
//! scan-driving loop that feeds it. Walking and reading archives lives in
//! `simple_index_core::scanner`; this crate only decides what to do with
//! what the scanner finds.

mod error;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{named_params, params, Connection};
use tracing::{debug, error, warn};

use simple_index_core::model::ProjectFile;
use simple_index_core::scanner;

pub use error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS distribution (
    "index"  TEXT NOT NULL,
    project  TEXT NOT NULL,
    filename TEXT NOT NULL,
    version  TEXT NOT NULL,
    file     BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS project_lookup ON distribution(project, "index");
CREATE UNIQUE INDEX IF NOT EXISTS file_lookup ON distribution("index", filename);
CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
"#;

/// `stats()`'s three counters: total distributions, distinct projects,
/// distinct sub-indexes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub distributions: i64,
    pub projects: i64,
    pub indexes: i64,
}

/// Tally of one `scan()` pass, surfaced to the `/reload` HTTP handler and
/// to the CLI `scan` subcommand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub visited: usize,
    pub inserted: usize,
    pub skipped_existing: usize,
    pub skipped_invalid: usize,
}

/// The index store. Wraps a single `rusqlite::Connection` in a `Mutex`
/// (connections aren't `Sync`); every public method holds the lock only for
/// the duration of its own statement, so each insert and each query is its
/// own transaction.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (creating if absent) `<cache_dir>/db.sqlite` and ensure the
    /// schema exists. Failure here is fatal at startup.
    pub fn open(cache_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(cache_dir)?;
        let conn = Connection::open(cache_dir.join("db.sqlite"))?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('revision', 0)",
            [],
        )?;
        Ok(Store {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests that don't want a temp directory.
    #[cfg(test)]
    fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('revision', 0)",
            [],
        )?;
        Ok(Store {
            conn: Mutex::new(conn),
        })
    }

    pub fn exists(&self, index: &str, filename: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM distribution WHERE "index" = ?1 AND filename = ?2"#,
            params![index, filename],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Idempotent insert: a conflicting `(index, filename)` is dropped
    /// without error. Returns `true` iff a new row was committed, in which
    /// case the revision counter is advanced in the same transaction.
    pub fn insert(
        &self,
        index: &str,
        project: &str,
        filename: &str,
        version: &str,
        file: &ProjectFile,
    ) -> Result<bool, StoreError> {
        let blob = serde_json::to_vec(file)?;
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let changed = tx.execute(
            r#"INSERT OR IGNORE INTO distribution ("index", project, filename, version, file)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![index, project, filename, version, blob],
        )?;
        if changed > 0 {
            tx.execute(
                "UPDATE meta SET value = value + 1 WHERE key = 'revision'",
                [],
            )?;
        }
        tx.commit()?;
        Ok(changed > 0)
    }

    pub fn stats(&self) -> Result<Stats, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            r#"SELECT COUNT(*), COUNT(DISTINCT project), COUNT(DISTINCT "index") FROM distribution"#,
            [],
            |row| {
                Ok(Stats {
                    distributions: row.get(0)?,
                    projects: row.get(1)?,
                    indexes: row.get(2)?,
                })
            },
        )
        .map_err(StoreError::from)
    }

    /// The monotonic revision token — the sole input to the ETag layer.
    pub fn revision(&self) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT value FROM meta WHERE key = 'revision'",
            [],
            |row| row.get(0),
        )
        .map_err(StoreError::from)
    }

    /// List distinct project names visible under `index_prefix`. Empty
    /// prefix matches everything; non-empty `p` matches rows whose index
    /// equals `p` or begins with `p/`, expressed as an explicit `OR` rather
    /// than a single `GLOB '<p>/*'` since that alone would miss rows whose
    /// index is exactly `p`.
    pub fn list_projects(&self, index_prefix: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"SELECT DISTINCT project FROM distribution
               WHERE (:prefix = '' OR "index" = :prefix OR "index" GLOB :glob)
               ORDER BY project"#,
        )?;
        let glob = format!("{index_prefix}/*");
        let rows = stmt.query_map(
            named_params! { ":prefix": index_prefix, ":glob": glob },
            |row| row.get::<_, String>(0),
        )?;
        rows.map(|r| r.map_err(StoreError::from)).collect()
    }

    /// List `(version, ProjectFile)` pairs for `project` under
    /// `index_prefix`, deduplicated by filename (first occurrence by
    /// insertion order) and ordered by filename ascending — ported from
    /// `LOOKUP_PROJECT_DETAIL`'s `GROUP BY filename HAVING ROWID =
    /// MIN(ROWID)`.
    pub fn list_files(
        &self,
        project: &str,
        index_prefix: &str,
    ) -> Result<Vec<(String, ProjectFile)>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"SELECT version, file FROM distribution
               WHERE project = :project
                 AND (:prefix = '' OR "index" = :prefix OR "index" GLOB :glob)
               GROUP BY filename
               HAVING ROWID = MIN(ROWID)
               ORDER BY filename"#,
        )?;
        let glob = format!("{index_prefix}/*");
        let rows = stmt.query_map(
            named_params! { ":project": project, ":prefix": index_prefix, ":glob": glob },
            |row| {
                let version: String = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                Ok((version, blob))
            },
        )?;

        let mut out = Vec::new();
        for row in rows {
            let (version, blob) = row?;
            let file: ProjectFile = serde_json::from_slice(&blob)?;
            out.push((version, file));
        }
        Ok(out)
    }

    /// Drive one full scan pass: walk `files_dir`, skip files already
    /// indexed, classify/read/hash new ones, and commit them. Never panics
    /// on a bad archive — `InvalidFile` is logged and the scan continues.
    pub fn scan(&self, files_dir: &Path, cache_dir: &Path) -> ScanSummary {
        let discovered = scanner::walk(files_dir, cache_dir);
        let mut summary = ScanSummary {
            visited: discovered.len(),
            ..Default::default()
        };

        for file in discovered {
            let filename = match file.path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            match self.exists(&file.index, &filename) {
                Ok(true) => {
                    summary.skipped_existing += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!(path = %file.path.display(), error = %e, "failed to query store");
                    continue;
                }
            }

            match scanner::ingest(files_dir, cache_dir, &file.path) {
                Ok(ingested) => {
                    match self.insert(
                        &file.index,
                        &ingested.project,
                        &filename,
                        &ingested.version,
                        &ingested.file,
                    ) {
                        Ok(true) => summary.inserted += 1,
                        Ok(false) => summary.skipped_existing += 1,
                        Err(e) => error!(path = %file.path.display(), error = %e, "failed to insert distribution"),
                    }
                }
                Err(e) if e.is_unhandled() => {
                    debug!(path = %file.path.display(), "skipping unhandled file type");
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "invalid distribution archive");
                    summary.skipped_invalid += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_file(filename: &str) -> ProjectFile {
        let mut hashes = BTreeMap::new();
        hashes.insert("sha256".to_string(), "deadbeef".to_string());
        ProjectFile {
            filename: filename.to_string(),
            size: 123,
            url: filename.to_string(),
            hashes,
            requires_python: None,
            core_metadata: None,
            yanked: None,
            gpg_sig: None,
        }
    }

    #[test]
    fn insert_is_idempotent_and_advances_revision() {
        let store = Store::open_in_memory().unwrap();
        let file = sample_file("pytest-8.3.4.tar.gz");

        assert!(store.insert("", "pytest", "pytest-8.3.4.tar.gz", "8.3.4", &file).unwrap());
        let rev_after_first = store.revision().unwrap();
        assert!(!store.insert("", "pytest", "pytest-8.3.4.tar.gz", "8.3.4", &file).unwrap());
        assert_eq!(store.revision().unwrap(), rev_after_first);

        let stats = store.stats().unwrap();
        assert_eq!(stats.distributions, 1);
    }

    #[test]
    fn prefix_match_includes_exact_and_nested() {
        let store = Store::open_in_memory().unwrap();
        let file = sample_file("pytest-8.3.0-py3-none-any.whl");
        store
            .insert("ext", "pytest", "pytest-8.3.0-py3-none-any.whl", "8.3", &file)
            .unwrap();
        let nested_file = sample_file("pytest-8.3.4-py3-none-any.whl");
        store
            .insert("ext/sub", "pytest", "pytest-8.3.4-py3-none-any.whl", "8.3.4", &nested_file)
            .unwrap();

        let projects = store.list_projects("ext").unwrap();
        assert_eq!(projects, vec!["pytest".to_string()]);

        let files = store.list_files("pytest", "ext").unwrap();
        assert_eq!(files.len(), 2);

        assert!(store.list_projects("ex").unwrap().is_empty());
    }

    #[test]
    fn root_prefix_is_empty_string() {
        let store = Store::open_in_memory().unwrap();
        let file = sample_file("pytest-8.3.4.tar.gz");
        store
            .insert("", "pytest", "pytest-8.3.4.tar.gz", "8.3.4", &file)
            .unwrap();
        store
            .insert("ext", "pytest", "other.whl", "1", &sample_file("other.whl"))
            .unwrap();

        let projects = store.list_projects("").unwrap();
        assert_eq!(projects, vec!["pytest".to_string()]);
    }
}
