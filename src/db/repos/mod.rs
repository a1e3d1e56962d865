pub mod accounts;
pub mod blockchain_settings;
pub mod coins;
pub mod enabled_wallets;
pub mod price_alert_requests;
pub mod price_alerts;
