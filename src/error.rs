/// Crate-wide error type. Every fallible function returns `Result<T, StorageError>`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Secret store error: {0}")]
    SecretStore(String),

    /// A migration step failed. The whole open sequence aborts; the database
    /// is never handed out in a partially migrated state.
    #[error("Migration '{name}' failed: {source}")]
    Migration {
        name: &'static str,
        #[source]
        source: Box<StorageError>,
    },
}

impl StorageError {
    pub(crate) fn in_migration(name: &'static str, source: impl Into<StorageError>) -> Self {
        StorageError::Migration {
            name,
            source: Box::new(source.into()),
        }
    }
}
