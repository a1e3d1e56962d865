use rusqlite::{params, Row};

use crate::db::models::AccountRecord;
use crate::db::DbPool;
use crate::error::StorageError;

fn row_to_account(row: &Row) -> rusqlite::Result<AccountRecord> {
    Ok(AccountRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        account_type: row.get("type")?,
        origin: row.get("origin")?,
        backed_up: row.get("backed_up")?,
        words_key: row.get("words_key")?,
        salt_key: row.get("salt_key")?,
        data_key: row.get("data_key")?,
        eos_account: row.get("eos_account")?,
    })
}

pub fn all(pool: &DbPool) -> Result<Vec<AccountRecord>, StorageError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT * FROM account_records")?;
    let rows = stmt.query_map([], row_to_account)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

/// Upsert an account. A later save with the same id supersedes the earlier row.
pub fn save(pool: &DbPool, account: &AccountRecord) -> Result<(), StorageError> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT OR REPLACE INTO account_records
         (id, name, type, origin, backed_up, words_key, salt_key, data_key, eos_account)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            account.id,
            account.name,
            account.account_type,
            account.origin,
            account.backed_up,
            account.words_key,
            account.salt_key,
            account.data_key,
            account.eos_account,
        ],
    )?;
    Ok(())
}

/// Delete an account and, in the same transaction, every enabled wallet it
/// owns. The storage engine enforces no referential integrity, so the
/// cascade lives here.
pub fn delete_by_id(pool: &DbPool, id: &str) -> Result<bool, StorageError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM enabled_wallets WHERE account_id = ?1",
        params![id],
    )?;
    let rows = tx.execute("DELETE FROM account_records WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(rows > 0)
}

/// Delete every account and every enabled wallet in one transaction.
pub fn delete_all(pool: &DbPool) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM enabled_wallets", [])?;
    tx.execute("DELETE FROM account_records", [])?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::db::models::{AccountOrigin, AccountType, EnabledWallet};
    use crate::db::repos::enabled_wallets;
    use crate::secrets::MemorySecretStore;

    fn account(id: &str) -> AccountRecord {
        AccountRecord {
            id: id.into(),
            name: format!("Wallet {id}"),
            account_type: AccountType::Mnemonic,
            origin: AccountOrigin::Created,
            backed_up: false,
            words_key: Some(format!("mnemonic_{id}_words")),
            salt_key: None,
            data_key: None,
            eos_account: None,
        }
    }

    #[test]
    fn test_save_and_fetch() {
        let secrets = MemorySecretStore::new();
        let (pool, _dir) = init_test_db(&secrets).unwrap();

        save(&pool, &account("a1")).unwrap();
        save(&pool, &account("a2")).unwrap();

        let mut fetched = all(&pool).unwrap();
        fetched.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].id, "a1");
        assert_eq!(fetched[0].account_type, AccountType::Mnemonic);
    }

    #[test]
    fn test_save_same_id_is_upsert() {
        let secrets = MemorySecretStore::new();
        let (pool, _dir) = init_test_db(&secrets).unwrap();

        save(&pool, &account("a1")).unwrap();
        let mut updated = account("a1");
        updated.backed_up = true;
        save(&pool, &updated).unwrap();

        let fetched = all(&pool).unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(fetched[0].backed_up);
    }

    #[test]
    fn test_delete_cascades_to_enabled_wallets() {
        let secrets = MemorySecretStore::new();
        let (pool, _dir) = init_test_db(&secrets).unwrap();

        save(&pool, &account("a1")).unwrap();
        save(&pool, &account("a2")).unwrap();
        enabled_wallets::save(
            &pool,
            &[
                EnabledWallet {
                    coin_id: "BTC".into(),
                    account_id: "a1".into(),
                    derivation: None,
                    sync_mode: None,
                },
                EnabledWallet {
                    coin_id: "ETH".into(),
                    account_id: "a2".into(),
                    derivation: None,
                    sync_mode: None,
                },
            ],
        )
        .unwrap();

        assert!(delete_by_id(&pool, "a1").unwrap());

        let remaining = enabled_wallets::all(&pool).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].account_id, "a2");

        // Deleting a missing account reports false
        assert!(!delete_by_id(&pool, "a1").unwrap());
    }

    #[test]
    fn test_delete_all() {
        let secrets = MemorySecretStore::new();
        let (pool, _dir) = init_test_db(&secrets).unwrap();

        save(&pool, &account("a1")).unwrap();
        enabled_wallets::save(
            &pool,
            &[EnabledWallet {
                coin_id: "BTC".into(),
                account_id: "a1".into(),
                derivation: None,
                sync_mode: None,
            }],
        )
        .unwrap();

        delete_all(&pool).unwrap();
        assert!(all(&pool).unwrap().is_empty());
        assert!(enabled_wallets::all(&pool).unwrap().is_empty());
    }
}
