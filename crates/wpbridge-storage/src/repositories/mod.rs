//! Credential store implementations

mod memory_credential_store;
mod sqlite_credential_store;

pub use memory_credential_store::MemoryCredentialStore;
pub use sqlite_credential_store::SqliteCredentialStore;
