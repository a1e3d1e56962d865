//! Embedded wallet storage with an ordered, exactly-once migration chain.
//!
//! [`db::init_db`] opens (or creates) the SQLite database, walks it forward
//! through every pending migration step, and only then hands out the
//! connection pool. The repository modules under [`db::repos`] are the sole
//! interface the rest of an application uses; no caller issues raw queries.
//!
//! Sensitive blobs live in an external [`secrets::SecretStore`], addressed
//! from the relational schema only by opaque string keys.

pub mod db;
pub mod error;
pub mod secrets;

pub use db::{init_db, DbPool};
pub use error::StorageError;
pub use secrets::{KeychainSecretStore, MemorySecretStore, SecretStore};
