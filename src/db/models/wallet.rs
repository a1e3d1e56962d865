use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Address-derivation scheme for bitcoin-family coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    Bip44,
    Bip49,
    Bip84,
}

impl Derivation {
    pub fn as_str(self) -> &'static str {
        match self {
            Derivation::Bip44 => "bip44",
            Derivation::Bip49 => "bip49",
            Derivation::Bip84 => "bip84",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bip44" => Some(Derivation::Bip44),
            "bip49" => Some(Derivation::Bip49),
            "bip84" => Some(Derivation::Bip84),
            _ => None,
        }
    }
}

impl ToSql for Derivation {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Derivation {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::from_str(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown derivation '{s}'").into()))
    }
}

/// Initial blockchain sync strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    Fast,
    Slow,
    New,
}

impl SyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncMode::Fast => "fast",
            SyncMode::Slow => "slow",
            SyncMode::New => "new",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fast" => Some(SyncMode::Fast),
            "slow" => Some(SyncMode::Slow),
            "new" => Some(SyncMode::New),
            _ => None,
        }
    }
}

impl ToSql for SyncMode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for SyncMode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::from_str(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown sync mode '{s}'").into()))
    }
}

/// "This account has this coin enabled." Keyed by `(coin_id, account_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledWallet {
    pub coin_id: String,
    pub account_id: String,
    pub derivation: Option<Derivation>,
    pub sync_mode: Option<SyncMode>,
}
