//! End-to-end tests against the public crate surface: open a database in a
//! scratch directory, migrate, and drive it through the repositories.

use wallet_storage::db::models::{
    AccountOrigin, AccountType, Derivation, EnabledWallet, SyncMode,
};
use wallet_storage::db::repos::{accounts, blockchain_settings, enabled_wallets};
use wallet_storage::{init_db, MemorySecretStore};

const LEGACY_AUTH_DATA_KEY: &str = "auth_data_keychain_key";

/// Route migration-step logs through the test harness; `RUST_LOG` filters
/// them. `try_init` because only the first test in the binary wins.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_open_migrate_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let secrets = MemorySecretStore::new();
    secrets.insert(
        LEGACY_AUTH_DATA_KEY,
        br#"{"wallet_id":"w1","words":["alpha","beta","gamma"],"is_backed_up":true,"sync_mode":"fast"}"#
            .to_vec(),
    );

    {
        let pool = init_db(dir.path(), &secrets).unwrap();
        let all = accounts::all(&pool).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "w1");
        assert!(all[0].backed_up);
        assert_eq!(all[0].account_type, AccountType::Mnemonic);
        assert_eq!(all[0].origin, AccountOrigin::Restored);
        assert_eq!(all[0].words_key.as_deref(), Some("mnemonic_w1_words"));
    }

    // Legacy key retired, words re-keyed
    use wallet_storage::SecretStore;
    assert_eq!(secrets.get(LEGACY_AUTH_DATA_KEY).unwrap(), None);
    assert_eq!(
        secrets.get("mnemonic_w1_words").unwrap(),
        Some(b"alpha,beta,gamma".to_vec())
    );

    // Reopening the same file re-runs nothing: still exactly one account,
    // even though the legacy blob is gone.
    let pool = init_db(dir.path(), &secrets).unwrap();
    assert_eq!(accounts::all(&pool).unwrap().len(), 1);
}

#[test]
fn test_enabled_wallet_upsert_is_last_write_wins() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let secrets = MemorySecretStore::new();
    let pool = init_db(dir.path(), &secrets).unwrap();

    enabled_wallets::save(
        &pool,
        &[EnabledWallet {
            coin_id: "BTC".into(),
            account_id: "A1".into(),
            derivation: Some(Derivation::Bip44),
            sync_mode: None,
        }],
    )
    .unwrap();
    enabled_wallets::save(
        &pool,
        &[EnabledWallet {
            coin_id: "BTC".into(),
            account_id: "A1".into(),
            derivation: Some(Derivation::Bip49),
            sync_mode: Some(SyncMode::Fast),
        }],
    )
    .unwrap();

    let wallets = enabled_wallets::all(&pool).unwrap();
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].derivation, Some(Derivation::Bip49));
    assert_eq!(wallets[0].sync_mode, Some(SyncMode::Fast));
}

#[test]
fn test_account_removal_cascades() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let secrets = MemorySecretStore::new();
    let pool = init_db(dir.path(), &secrets).unwrap();

    accounts::save(
        &pool,
        &wallet_storage::db::models::AccountRecord {
            id: "a1".into(),
            name: "Main".into(),
            account_type: AccountType::Mnemonic,
            origin: AccountOrigin::Created,
            backed_up: true,
            words_key: Some("mnemonic_a1_words".into()),
            salt_key: None,
            data_key: None,
            eos_account: None,
        },
    )
    .unwrap();
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
                account_id: "a1".into(),
                derivation: None,
                sync_mode: None,
            },
        ],
    )
    .unwrap();

    assert!(accounts::delete_by_id(&pool, "a1").unwrap());
    assert!(accounts::all(&pool).unwrap().is_empty());
    assert!(enabled_wallets::all(&pool).unwrap().is_empty());
}

#[test]
fn test_blockchain_settings_survive_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let secrets = MemorySecretStore::new();

    {
        let pool = init_db(dir.path(), &secrets).unwrap();
        blockchain_settings::save(
            &pool,
            &[wallet_storage::db::models::BlockchainSettingRecord {
                coin_type_key: "bitcoin".into(),
                key: "derivation".into(),
                value: "bip84".into(),
            }],
        )
        .unwrap();
    }

    let pool = init_db(dir.path(), &secrets).unwrap();
    let setting = blockchain_settings::get(&pool, "bitcoin", "derivation")
        .unwrap()
        .unwrap();
    assert_eq!(setting.value, "bip84");
}
