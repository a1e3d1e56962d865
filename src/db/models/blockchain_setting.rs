use serde::{Deserialize, Serialize};

/// Generic per-coin-type setting, keyed by `(coin_type_key, key)`.
/// Currently holds derivation choices and sync modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainSettingRecord {
    pub coin_type_key: String,
    pub key: String,
    pub value: String,
}
