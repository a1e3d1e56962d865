pub mod migrations;
pub mod models;
pub mod repos;
pub mod schema;

use std::path::Path;

use r2d2::{CustomizeConnection, Pool};
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::StorageError;
use crate::secrets::SecretStore;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Connection customizer that sets per-connection SQLite pragmas.
///
/// No foreign_keys pragma: the schema deliberately carries no cross-table
/// referential integrity; cascades are enforced in the repository layer.
#[derive(Debug)]
struct SqlitePragmaCustomizer;

impl CustomizeConnection<rusqlite::Connection, rusqlite::Error> for SqlitePragmaCustomizer {
    fn on_acquire(&self, conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            "PRAGMA busy_timeout = 5000;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -8000;",
        )?;
        Ok(())
    }
}

/// Open (creating if needed) the wallet database and walk it forward to the
/// current schema. Must complete before any repository is constructed;
/// failure here is fatal to startup, there is no partial-service mode.
///
/// The secret store is only consulted by the migration steps that need it.
pub fn init_db(app_data_dir: &Path, secrets: &dyn SecretStore) -> Result<DbPool, StorageError> {
    std::fs::create_dir_all(app_data_dir)?;
    let db_path = app_data_dir.join("wallet.sqlite");

    tracing::info!(path = %db_path.display(), "Opening wallet database");

    let manager = SqliteConnectionManager::file(&db_path);
    let pool = Pool::builder()
        .max_size(8)
        .connection_customizer(Box::new(SqlitePragmaCustomizer))
        .build(manager)?;

    // WAL journal mode is database-wide, only needs to run once
    {
        let conn = pool.get()?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    }

    {
        let mut conn = pool.get()?;
        migrations::run(&mut conn, secrets)?;
    }

    tracing::info!("Wallet database ready");
    Ok(pool)
}

/// File-backed test database: r2d2 hands out multiple connections, and each
/// in-memory connection would see its own empty database. The returned
/// `TempDir` guard owns the database file and any sidecar files; tests keep it
/// alive next to the pool and everything is removed on drop.
#[cfg(test)]
pub(crate) fn init_test_db(
    secrets: &dyn SecretStore,
) -> Result<(DbPool, tempfile::TempDir), StorageError> {
    use std::time::Duration;

    let dir = tempfile::tempdir()?;
    let manager = SqliteConnectionManager::file(dir.path().join("wallet.sqlite"));
    let pool = Pool::builder()
        .max_size(2)
        .connection_timeout(Duration::from_secs(5))
        .connection_customizer(Box::new(SqlitePragmaCustomizer))
        .build(manager)?;

    let mut conn = pool.get()?;
    migrations::run(&mut conn, secrets)?;
    drop(conn);
    Ok((pool, dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_init_test_db_removes_files_on_drop() {
        let secrets = MemorySecretStore::new();
        let (pool, dir) = init_test_db(&secrets).unwrap();

        let db_path = dir.path().join("wallet.sqlite");
        assert!(db_path.exists());

        let dir_path = dir.path().to_path_buf();
        drop(pool);
        drop(dir);
        assert!(!dir_path.exists());
    }
}
