use serde::{Deserialize, Serialize};

/// Static coin metadata cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub coin_id: String,
    pub title: String,
    pub code: String,
    pub decimal: i32,
    pub token_type: String,
    pub erc20_address: Option<String>,
}
