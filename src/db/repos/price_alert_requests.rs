use rusqlite::{params, Row};

use crate::db::models::PriceAlertRequestRecord;
use crate::db::DbPool;
use crate::error::StorageError;

fn row_to_request(row: &Row) -> rusqlite::Result<PriceAlertRequestRecord> {
    Ok(PriceAlertRequestRecord {
        topic: row.get("topic")?,
        method: row.get("method")?,
    })
}

pub fn all(pool: &DbPool) -> Result<Vec<PriceAlertRequestRecord>, StorageError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT * FROM price_alert_request_records")?;
    let rows = stmt.query_map([], row_to_request)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

/// Upsert a batch of pending requests in one transaction.
pub fn save(pool: &DbPool, records: &[PriceAlertRequestRecord]) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    for record in records {
        tx.execute(
            "INSERT OR REPLACE INTO price_alert_request_records (topic, method) VALUES (?1, ?2)",
            params![record.topic, record.method],
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// Delete a batch of flushed requests by composite key in one transaction.
pub fn delete(pool: &DbPool, records: &[PriceAlertRequestRecord]) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    for record in records {
        tx.execute(
            "DELETE FROM price_alert_request_records WHERE topic = ?1 AND method = ?2",
            params![record.topic, record.method],
        )?;
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::secrets::MemorySecretStore;

    fn request(topic: &str, method: i32) -> PriceAlertRequestRecord {
        PriceAlertRequestRecord {
            topic: topic.into(),
            method,
        }
    }

    #[test]
    fn test_pending_queue_roundtrip() {
        let secrets = MemorySecretStore::new();
        let (pool, _dir) = init_test_db(&secrets).unwrap();

        save(&pool, &[request("BTC_24hour_2percent", 0), request("BTC_24hour_2percent", 1)]).unwrap();
        assert_eq!(all(&pool).unwrap().len(), 2);

        // Same (topic, method) replaces, not duplicates
        save(&pool, &[request("BTC_24hour_2percent", 0)]).unwrap();
        assert_eq!(all(&pool).unwrap().len(), 2);

        delete(&pool, &[request("BTC_24hour_2percent", 0)]).unwrap();
        let remaining = all(&pool).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].method, 1);
    }
}
