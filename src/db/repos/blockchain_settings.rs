use rusqlite::{params, Row};

use crate::db::models::BlockchainSettingRecord;
use crate::db::DbPool;
use crate::error::StorageError;

fn row_to_setting(row: &Row) -> rusqlite::Result<BlockchainSettingRecord> {
    Ok(BlockchainSettingRecord {
        coin_type_key: row.get("coin_type_key")?,
        key: row.get("key")?,
        value: row.get("value")?,
    })
}

/// Fetch one setting. Returns None when the (coin type, key) pair is unset.
pub fn get(
    pool: &DbPool,
    coin_type_key: &str,
    setting_key: &str,
) -> Result<Option<BlockchainSettingRecord>, StorageError> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT * FROM blockchain_settings WHERE coin_type_key = ?1 AND key = ?2",
        params![coin_type_key, setting_key],
        row_to_setting,
    );

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StorageError::Database(e)),
    }
}

/// Upsert a batch of settings in one transaction.
pub fn save(pool: &DbPool, settings: &[BlockchainSettingRecord]) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    for setting in settings {
        tx.execute(
            "INSERT OR REPLACE INTO blockchain_settings (coin_type_key, key, value)
             VALUES (?1, ?2, ?3)",
            params![setting.coin_type_key, setting.key, setting.value],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// Delete the given setting across every coin type.
pub fn delete_all_with_key(pool: &DbPool, setting_key: &str) -> Result<(), StorageError> {
    let conn = pool.get()?;
    conn.execute(
        "DELETE FROM blockchain_settings WHERE key = ?1",
        params![setting_key],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::secrets::MemorySecretStore;

    fn setting(coin_type_key: &str, key: &str, value: &str) -> BlockchainSettingRecord {
        BlockchainSettingRecord {
            coin_type_key: coin_type_key.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_get_set_overwrite() {
        let secrets = MemorySecretStore::new();
        let (pool, _dir) = init_test_db(&secrets).unwrap();

        assert_eq!(get(&pool, "bitcoin", "derivation").unwrap(), None);

        save(&pool, &[setting("bitcoin", "derivation", "bip44")]).unwrap();
        save(&pool, &[setting("bitcoin", "sync_mode", "fast")]).unwrap();

        let fetched = get(&pool, "bitcoin", "derivation").unwrap().unwrap();
        assert_eq!(fetched.value, "bip44");

        // Overwrite on the same composite key
        save(&pool, &[setting("bitcoin", "derivation", "bip84")]).unwrap();
        let fetched = get(&pool, "bitcoin", "derivation").unwrap().unwrap();
        assert_eq!(fetched.value, "bip84");
    }

    #[test]
    fn test_delete_all_with_key() {
        let secrets = MemorySecretStore::new();
        let (pool, _dir) = init_test_db(&secrets).unwrap();

        save(
            &pool,
            &[
                setting("bitcoin", "derivation", "bip44"),
                setting("litecoin", "derivation", "bip49"),
                setting("bitcoin", "sync_mode", "fast"),
            ],
        )
        .unwrap();

        delete_all_with_key(&pool, "derivation").unwrap();

        assert_eq!(get(&pool, "bitcoin", "derivation").unwrap(), None);
        assert_eq!(get(&pool, "litecoin", "derivation").unwrap(), None);
        assert!(get(&pool, "bitcoin", "sync_mode").unwrap().is_some());
    }
}
