mod account;
mod blockchain_setting;
mod coin;
mod price_alert;
mod wallet;

pub use account::{AccountOrigin, AccountRecord, AccountType};
pub use blockchain_setting::BlockchainSettingRecord;
pub use coin::CoinRecord;
pub use price_alert::{PriceAlertRecord, PriceAlertRequestRecord};
pub use wallet::{Derivation, EnabledWallet, SyncMode};
