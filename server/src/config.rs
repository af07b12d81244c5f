//! Configuration: environment variables prefixed `PYPS_`, resolved with a
//! hand-rolled `env::var` + `unwrap_or_else` layering — the schema is three
//! scalars, too small to justify a config-file framework.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// `FILES_DIR` — root of the archive tree. Default `.`.
    pub files_dir: PathBuf,
    /// `CACHE_DIR` — sidecars and the index store database. Default
    /// `<files_dir>/.cache`.
    pub cache_dir: PathBuf,
    /// `FILES_URL` — URL prefix archives are exposed at. Default `/files`.
    pub files_url: String,
    pub bind_all: bool,
    pub port: u16,
}

impl Config {
    pub fn bind_host(&self) -> &'static str {
        if self.bind_all {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

/// Resolve a `Config` from CLI overrides layered over `PYPS_*` environment
/// variables layered over the defaults below.
pub fn resolve(
    files_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    files_url: Option<String>,
    bind_all: bool,
    port: u16,
) -> Config {
    let files_dir = files_dir
        .or_else(|| env::var("PYPS_FILES_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let cache_dir = cache_dir
        .or_else(|| env::var("PYPS_CACHE_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| files_dir.join(".cache"));

    let files_url = files_url
        .or_else(|| env::var("PYPS_FILES_URL").ok())
        .unwrap_or_else(|| "/files".to_string());

    Config {
        files_dir,
        cache_dir,
        files_url,
        bind_all,
        port,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_dir_defaults_under_files_dir() {
        let config = resolve(Some(PathBuf::from("/srv/archives")), None, None, false, 0);
        assert_eq!(config.cache_dir, PathBuf::from("/srv/archives/.cache"));
        assert_eq!(config.files_url, "/files");
        assert_eq!(config.bind_host(), "127.0.0.1");
    }

    #[test]
    fn bind_all_selects_wildcard_host() {
        let config = resolve(None, None, None, true, 0);
        assert_eq!(config.bind_host(), "0.0.0.0");
    }

    #[test]
    fn explicit_overrides_are_not_replaced_by_env() {
        let config = resolve(
            Some(PathBuf::from("/a")),
            Some(PathBuf::from("/b")),
            Some("/dl".to_string()),
            false,
            9000,
        );
        assert_eq!(config.files_dir, PathBuf::from("/a"));
        assert_eq!(config.cache_dir, PathBuf::from("/b"));
        assert_eq!(config.files_url, "/dl");
        assert_eq!(config.port, 9000);
    }
}
