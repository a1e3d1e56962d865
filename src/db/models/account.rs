use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Discriminator for how an account's key material is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Mnemonic,
    PrivateKey,
    PublicKey,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Mnemonic => "mnemonic",
            AccountType::PrivateKey => "private_key",
            AccountType::PublicKey => "public_key",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mnemonic" => Some(AccountType::Mnemonic),
            "private_key" => Some(AccountType::PrivateKey),
            "public_key" => Some(AccountType::PublicKey),
            _ => None,
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::from_str(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown account type '{s}'").into()))
    }
}

/// Whether the account was created fresh or restored from a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountOrigin {
    Created,
    Restored,
}

impl AccountOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountOrigin::Created => "created",
            AccountOrigin::Restored => "restored",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(AccountOrigin::Created),
            "restored" => Some(AccountOrigin::Restored),
            _ => None,
        }
    }
}

impl ToSql for AccountOrigin {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AccountOrigin {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::from_str(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown account origin '{s}'").into()))
    }
}

/// A wallet account. The `*_key` fields are opaque references into the
/// secret store, never the secrets themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub origin: AccountOrigin,
    pub backed_up: bool,
    pub words_key: Option<String>,
    pub salt_key: Option<String>,
    pub data_key: Option<String>,
    pub eos_account: Option<String>,
}
