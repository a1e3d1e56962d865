use serde::{Deserialize, Serialize};

/// A configured price alert, one row per coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAlertRecord {
    pub coin_code: String,
    /// Percent-change threshold state.
    pub change_state: i32,
    pub trend_state: String,
}

/// A pending push-subscription request to be flushed to the remote
/// notification service. Keyed by `(topic, method)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAlertRequestRecord {
    pub topic: String,
    pub method: i32,
}
