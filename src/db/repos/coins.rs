use rusqlite::{params, Row};

use crate::db::models::CoinRecord;
use crate::db::DbPool;
use crate::error::StorageError;

fn row_to_coin(row: &Row) -> rusqlite::Result<CoinRecord> {
    Ok(CoinRecord {
        coin_id: row.get("coin_id")?,
        title: row.get("title")?,
        code: row.get("code")?,
        decimal: row.get("decimal")?,
        token_type: row.get("token_type")?,
        erc20_address: row.get("erc20_address")?,
    })
}

pub fn all(pool: &DbPool) -> Result<Vec<CoinRecord>, StorageError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT * FROM coin_records ORDER BY title ASC")?;
    let rows = stmt.query_map([], row_to_coin)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

/// Upsert one coin's metadata.
pub fn save(pool: &DbPool, coin: &CoinRecord) -> Result<(), StorageError> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT OR REPLACE INTO coin_records
         (coin_id, title, code, decimal, token_type, erc20_address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            coin.coin_id,
            coin.title,
            coin.code,
            coin.decimal,
            coin.token_type,
            coin.erc20_address,
        ],
    )?;
    Ok(())
}
