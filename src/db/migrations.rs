//! Migration registry and runner.
//!
//! The registry is an ordered, append-only list of named steps. Entries must
//! never be reordered or removed; new steps are only appended. Each step runs
//! exactly once per database: the runner records the step's name in
//! `applied_migrations` inside the same transaction as the step body, so a
//! crash can neither leave a step half-applied-but-marked-done nor
//! done-but-unmarked. Steps assume the cumulative effect of all prior steps
//! and nothing about later ones.

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Deserialize;

use crate::db::schema::{drop_table, rename_table, table_exists, ColumnType::*, TableDef};
use crate::error::StorageError;
use crate::secrets::SecretStore;

type StepFn = fn(&Transaction, &dyn SecretStore) -> Result<(), StorageError>;

pub struct Migration {
    pub name: &'static str,
    pub(crate) run: StepFn,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_account_records",
        run: create_account_records,
    },
    Migration {
        name: "create_enabled_wallets",
        run: create_enabled_wallets,
    },
    Migration {
        name: "migrate_auth_data",
        run: migrate_auth_data,
    },
    Migration {
        name: "recreate_price_alert_records",
        run: recreate_price_alert_records,
    },
    Migration {
        name: "create_price_alert_request_records",
        run: create_price_alert_request_records,
    },
    Migration {
        name: "rename_coin_code_to_coin_id_in_enabled_wallets",
        run: rename_coin_code_to_coin_id_in_enabled_wallets,
    },
    Migration {
        name: "move_coin_settings_from_account_to_wallet",
        run: move_coin_settings_from_account_to_wallet,
    },
    Migration {
        name: "rename_dai_coin_to_sai",
        run: rename_dai_coin_to_sai,
    },
    Migration {
        name: "create_blockchain_settings",
        run: create_blockchain_settings,
    },
    Migration {
        name: "fill_blockchain_settings_from_enabled_wallets",
        run: fill_blockchain_settings_from_enabled_wallets,
    },
    Migration {
        name: "create_coins",
        run: create_coins,
    },
];

/// Run every pending migration, in registration order.
pub fn run(conn: &mut Connection, secrets: &dyn SecretStore) -> Result<(), StorageError> {
    run_steps(conn, secrets, MIGRATIONS)
}

pub(crate) fn run_steps(
    conn: &mut Connection,
    secrets: &dyn SecretStore,
    steps: &[Migration],
) -> Result<(), StorageError> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS applied_migrations (name TEXT PRIMARY KEY)")?;

    for step in steps {
        let applied: i64 = conn.query_row(
            "SELECT COUNT(*) FROM applied_migrations WHERE name = ?1",
            params![step.name],
            |row| row.get(0),
        )?;
        if applied > 0 {
            tracing::debug!(step = step.name, "migration already applied, skipping");
            continue;
        }

        let tx = conn.transaction()?;
        (step.run)(&tx, secrets).map_err(|e| StorageError::in_migration(step.name, e))?;
        tx.execute(
            "INSERT INTO applied_migrations (name) VALUES (?1)",
            params![step.name],
        )
        .map_err(|e| StorageError::in_migration(step.name, e))?;
        tx.commit()
            .map_err(|e| StorageError::in_migration(step.name, e))?;

        tracing::info!(step = step.name, "migration applied");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Historical steps. Table shapes here are frozen snapshots of past schema
// versions; only the last step touching a table leaves it in its current
// form. Current-shape access lives in the repos, never here.
// ---------------------------------------------------------------------------

fn create_account_records(tx: &Transaction, _secrets: &dyn SecretStore) -> Result<(), StorageError> {
    TableDef::new("account_records")
        .column("id", Text)
        .column("name", Text)
        .column("type", Text)
        .column("backed_up", Boolean)
        .nullable("default_sync_mode", Text)
        .nullable("words_key", Text)
        .nullable("derivation", Text)
        .nullable("salt_key", Text)
        .nullable("data_key", Text)
        .nullable("eos_account", Text)
        .primary_key(&["id"])
        .create(tx)?;
    Ok(())
}

fn create_enabled_wallets(tx: &Transaction, _secrets: &dyn SecretStore) -> Result<(), StorageError> {
    TableDef::new("enabled_wallets")
        .column("coin_code", Text)
        .column("account_id", Text)
        .nullable("sync_mode", Text)
        .column("wallet_order", Integer)
        .primary_key(&["coin_code", "account_id"])
        .create(tx)?;
    Ok(())
}

/// Well-known key the pre-database app kept its auth payload under.
const LEGACY_AUTH_DATA_KEY: &str = "auth_data_keychain_key";

/// Shape of the legacy secret-store blob.
#[derive(Deserialize)]
struct LegacyAuthData {
    wallet_id: String,
    words: Vec<String>,
    #[serde(default)]
    is_backed_up: bool,
    #[serde(default)]
    sync_mode: Option<String>,
}

/// Cross-store secret extraction: turn the single legacy auth blob into an
/// account row, re-key the mnemonic words, and fold the legacy
/// `enabled_coins` table into `enabled_wallets`.
fn migrate_auth_data(tx: &Transaction, secrets: &dyn SecretStore) -> Result<(), StorageError> {
    let Some(raw) = secrets.get(LEGACY_AUTH_DATA_KEY)? else {
        return Ok(());
    };

    // A blob that no longer decodes is treated the same as an absent one;
    // corrupt legacy data must not brick startup.
    let auth: LegacyAuthData = match serde_json::from_slice(&raw) {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "legacy auth data present but undecodable, skipping extraction");
            return Ok(());
        }
    };

    let sync_mode = match auth.sync_mode.as_deref() {
        Some("slow") => "slow",
        Some("new") => "new",
        _ => "fast",
    };
    let words_key = format!("mnemonic_{}_words", auth.wallet_id);

    tx.execute(
        "INSERT INTO account_records
         (id, name, type, backed_up, default_sync_mode, words_key, derivation)
         VALUES (?1, ?1, 'mnemonic', ?2, ?3, ?4, 'bip44')",
        params![auth.wallet_id, auth.is_backed_up, sync_mode, words_key],
    )?;

    // Re-key the sensitive sub-payload first, then retire the legacy key.
    secrets.set(&words_key, auth.words.join(",").as_bytes())?;
    secrets.remove(LEGACY_AUTH_DATA_KEY)?;

    // Truly old installs tracked enabled coins without an account dimension.
    if table_exists(tx, "enabled_coins")? {
        tx.execute(
            "INSERT INTO enabled_wallets (coin_code, account_id, sync_mode, wallet_order)
             SELECT coin_code, ?1, ?2, coin_order FROM enabled_coins",
            params![auth.wallet_id, sync_mode],
        )?;
        drop_table(tx, "enabled_coins")?;
    }

    Ok(())
}

fn recreate_price_alert_records(
    tx: &Transaction,
    _secrets: &dyn SecretStore,
) -> Result<(), StorageError> {
    if table_exists(tx, "price_alert_records")? {
        drop_table(tx, "price_alert_records")?;
    }

    TableDef::new("price_alert_records")
        .column("coin_code", Text)
        .column("change_state", Integer)
        .column("trend_state", Text)
        .primary_key(&["coin_code"])
        .create(tx)?;
    Ok(())
}

fn create_price_alert_request_records(
    tx: &Transaction,
    _secrets: &dyn SecretStore,
) -> Result<(), StorageError> {
    TableDef::new("price_alert_request_records")
        .column("topic", Text)
        .column("method", Integer)
        .primary_key(&["topic", "method"])
        .create(tx)?;
    Ok(())
}

/// Primary-key restructuring: `coin_code` becomes `coin_id`. SQLite cannot
/// rename a primary-key column in place, so copy through a temp table.
fn rename_coin_code_to_coin_id_in_enabled_wallets(
    tx: &Transaction,
    _secrets: &dyn SecretStore,
) -> Result<(), StorageError> {
    TableDef::new("enabled_wallets_temp")
        .column("coin_id", Text)
        .column("account_id", Text)
        .nullable("sync_mode", Text)
        .column("wallet_order", Integer)
        .primary_key(&["coin_id", "account_id"])
        .create(tx)?;

    tx.execute(
        "INSERT INTO enabled_wallets_temp (coin_id, account_id, sync_mode, wallet_order)
         SELECT coin_code, account_id, sync_mode, wallet_order FROM enabled_wallets",
        [],
    )?;

    drop_table(tx, "enabled_wallets")?;
    rename_table(tx, "enabled_wallets_temp", "enabled_wallets")?;
    Ok(())
}

/// Conditional column relocation: account-level derivation/sync-mode move to
/// per-(coin, account) wallet rows, but only for the coin families the
/// settings ever applied to. Also drops `wallet_order` and replaces
/// `default_sync_mode` with the account's `origin`.
fn move_coin_settings_from_account_to_wallet(
    tx: &Transaction,
    _secrets: &dyn SecretStore,
) -> Result<(), StorageError> {
    struct OldAccount {
        id: String,
        name: String,
        account_type: String,
        backed_up: bool,
        default_sync_mode: Option<String>,
        words_key: Option<String>,
        derivation: Option<String>,
        salt_key: Option<String>,
        data_key: Option<String>,
        eos_account: Option<String>,
    }

    let old_accounts: Vec<OldAccount> = {
        let mut stmt = tx.prepare(
            "SELECT id, name, type, backed_up, default_sync_mode, words_key,
                    derivation, salt_key, data_key, eos_account
             FROM account_records",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(OldAccount {
                id: row.get(0)?,
                name: row.get(1)?,
                account_type: row.get(2)?,
                backed_up: row.get(3)?,
                default_sync_mode: row.get(4)?,
                words_key: row.get(5)?,
                derivation: row.get(6)?,
                salt_key: row.get(7)?,
                data_key: row.get(8)?,
                eos_account: row.get(9)?,
            })
        })?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    drop_table(tx, "account_records")?;

    TableDef::new("account_records")
        .column("id", Text)
        .column("name", Text)
        .column("type", Text)
        .column("origin", Text)
        .column("backed_up", Boolean)
        .nullable("words_key", Text)
        .nullable("salt_key", Text)
        .nullable("data_key", Text)
        .nullable("eos_account", Text)
        .primary_key(&["id"])
        .create(tx)?;

    let mut old_derivation: Option<String> = None;
    let mut old_sync_mode: Option<String> = None;

    for account in &old_accounts {
        let origin = if account.default_sync_mode.as_deref() == Some("new") {
            "created"
        } else {
            "restored"
        };

        tx.execute(
            "INSERT INTO account_records
             (id, name, type, origin, backed_up, words_key, salt_key, data_key, eos_account)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                account.id,
                account.name,
                account.account_type,
                origin,
                account.backed_up,
                account.words_key,
                account.salt_key,
                account.data_key,
                account.eos_account,
            ],
        )?;

        if let (Some(sync_mode), Some(derivation)) =
            (&account.default_sync_mode, &account.derivation)
        {
            old_derivation = Some(derivation.clone());
            old_sync_mode = Some(sync_mode.clone());
        }
    }

    let old_wallets: Vec<(String, String)> = {
        let mut stmt = tx.prepare("SELECT coin_id, account_id FROM enabled_wallets")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    drop_table(tx, "enabled_wallets")?;

    TableDef::new("enabled_wallets")
        .column("coin_id", Text)
        .column("account_id", Text)
        .nullable("derivation", Text)
        .nullable("sync_mode", Text)
        .primary_key(&["coin_id", "account_id"])
        .create(tx)?;

    for (coin_id, account_id) in &old_wallets {
        let derivation = match coin_id.as_str() {
            "BTC" => old_derivation.as_deref(),
            _ => None,
        };
        let sync_mode = match coin_id.as_str() {
            "BTC" | "BCH" | "DASH" => old_sync_mode.as_deref(),
            _ => None,
        };

        tx.execute(
            "INSERT INTO enabled_wallets (coin_id, account_id, derivation, sync_mode)
             VALUES (?1, ?2, ?3, ?4)",
            params![coin_id, account_id, derivation, sync_mode],
        )?;
    }

    Ok(())
}

/// Identity rename: DAI became SAI after the MakerDAO token migration.
/// The coin id is the primary key, so this is delete-old + insert-new; the
/// step transaction makes the pair atomic.
fn rename_dai_coin_to_sai(tx: &Transaction, _secrets: &dyn SecretStore) -> Result<(), StorageError> {
    let wallet: Option<(String, Option<String>, Option<String>)> = tx
        .query_row(
            "SELECT account_id, derivation, sync_mode FROM enabled_wallets WHERE coin_id = ?1",
            params!["DAI"],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((account_id, derivation, sync_mode)) = wallet else {
        return Ok(());
    };

    tx.execute(
        "DELETE FROM enabled_wallets WHERE coin_id = ?1 AND account_id = ?2",
        params!["DAI", account_id],
    )?;
    tx.execute(
        "INSERT INTO enabled_wallets (coin_id, account_id, derivation, sync_mode)
         VALUES (?1, ?2, ?3, ?4)",
        params!["SAI", account_id, derivation, sync_mode],
    )?;

    Ok(())
}

fn create_blockchain_settings(
    tx: &Transaction,
    _secrets: &dyn SecretStore,
) -> Result<(), StorageError> {
    TableDef::new("blockchain_settings")
        .column("coin_type_key", Text)
        .column("key", Text)
        .column("value", Text)
        .primary_key(&["coin_type_key", "key"])
        .create(tx)?;
    Ok(())
}

/// Coin families whose wallets historically carried derivation/sync settings,
/// mapped to their coin-type keys. Coins outside this list never had the
/// settings and contribute nothing to the backfill.
const COIN_TYPE_KEYS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("LTC", "litecoin"),
    ("BCH", "bitcoinCash"),
    ("DASH", "dash"),
];

/// Backfill: derive per-coin-type settings from the wallet rows before the
/// wallet-level columns stop being the source of truth.
fn fill_blockchain_settings_from_enabled_wallets(
    tx: &Transaction,
    _secrets: &dyn SecretStore,
) -> Result<(), StorageError> {
    let mut stmt = tx.prepare(
        "SELECT coin_id, derivation, sync_mode FROM enabled_wallets
         WHERE coin_id IN ('BTC', 'LTC', 'BCH', 'DASH')",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    for row in rows {
        let (coin_id, derivation, sync_mode) = row?;
        let Some((_, coin_type_key)) = COIN_TYPE_KEYS.iter().find(|(id, _)| *id == coin_id) else {
            continue;
        };

        if let Some(derivation) = derivation {
            tx.execute(
                "INSERT INTO blockchain_settings (coin_type_key, key, value) VALUES (?1, ?2, ?3)",
                params![coin_type_key, "derivation", derivation],
            )?;
        }
        if let Some(sync_mode) = sync_mode {
            tx.execute(
                "INSERT INTO blockchain_settings (coin_type_key, key, value) VALUES (?1, ?2, ?3)",
                params![coin_type_key, "sync_mode", sync_mode],
            )?;
        }
    }

    Ok(())
}

fn create_coins(tx: &Transaction, _secrets: &dyn SecretStore) -> Result<(), StorageError> {
    TableDef::new("coin_records")
        .column("coin_id", Text)
        .column("title", Text)
        .column("code", Text)
        .column("decimal", Integer)
        .column("token_type", Text)
        .nullable("erc20_address", Text)
        .primary_key(&["coin_id"])
        .create(tx)?;
    Ok(())
}
