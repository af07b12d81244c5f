use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to (de)serialize stored record: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("failed to prepare cache directory: {0}")]
    Io(#[from] std::io::Error),
}
