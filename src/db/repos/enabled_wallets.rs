use rusqlite::{params, Row};

use crate::db::models::EnabledWallet;
use crate::db::DbPool;
use crate::error::StorageError;

fn row_to_wallet(row: &Row) -> rusqlite::Result<EnabledWallet> {
    Ok(EnabledWallet {
        coin_id: row.get("coin_id")?,
        account_id: row.get("account_id")?,
        derivation: row.get("derivation")?,
        sync_mode: row.get("sync_mode")?,
    })
}

pub fn all(pool: &DbPool) -> Result<Vec<EnabledWallet>, StorageError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT * FROM enabled_wallets")?;
    let rows = stmt.query_map([], row_to_wallet)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

/// Upsert a batch of wallets in one transaction. A repeated
/// `(coin_id, account_id)` replaces rather than duplicates.
pub fn save(pool: &DbPool, wallets: &[EnabledWallet]) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    for wallet in wallets {
        tx.execute(
            "INSERT OR REPLACE INTO enabled_wallets (coin_id, account_id, derivation, sync_mode)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                wallet.coin_id,
                wallet.account_id,
                wallet.derivation,
                wallet.sync_mode,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// Delete a batch of wallets by composite key in one transaction.
pub fn delete(pool: &DbPool, wallets: &[EnabledWallet]) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    for wallet in wallets {
        tx.execute(
            "DELETE FROM enabled_wallets WHERE coin_id = ?1 AND account_id = ?2",
            params![wallet.coin_id, wallet.account_id],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn delete_all(pool: &DbPool) -> Result<(), StorageError> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM enabled_wallets", [])?;
    Ok(())
}
