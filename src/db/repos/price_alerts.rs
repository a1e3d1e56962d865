use rusqlite::{params, Row};

use crate::db::models::PriceAlertRecord;
use crate::db::DbPool;
use crate::error::StorageError;

fn row_to_alert(row: &Row) -> rusqlite::Result<PriceAlertRecord> {
    Ok(PriceAlertRecord {
        coin_code: row.get("coin_code")?,
        change_state: row.get("change_state")?,
        trend_state: row.get("trend_state")?,
    })
}

pub fn all(pool: &DbPool) -> Result<Vec<PriceAlertRecord>, StorageError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT * FROM price_alert_records")?;
    let rows = stmt.query_map([], row_to_alert)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

/// Fetch the alert for one coin. Returns None when no alert is configured.
pub fn by_coin_code(pool: &DbPool, coin_code: &str) -> Result<Option<PriceAlertRecord>, StorageError> {
    let conn = pool.get()?;
    let result = conn.query_row(
        "SELECT * FROM price_alert_records WHERE coin_code = ?1",
        params![coin_code],
        row_to_alert,
    );

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StorageError::Database(e)),
    }
}

/// Upsert a batch of alerts in one transaction.
pub fn save(pool: &DbPool, records: &[PriceAlertRecord]) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    for record in records {
        tx.execute(
            "INSERT OR REPLACE INTO price_alert_records (coin_code, change_state, trend_state)
             VALUES (?1, ?2, ?3)",
            params![record.coin_code, record.change_state, record.trend_state],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn delete_all(pool: &DbPool) -> Result<(), StorageError> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM price_alert_records", [])?;
    Ok(())
}
