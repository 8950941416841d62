//! WPBridge Storage Layer
//!
//! Implementations of [`wpbridge_core::CredentialStore`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              Connection Lifecycle Manager            │
//! ├──────────────────────────────────────────────────────┤
//! │           CredentialStore trait (core)               │
//! ├───────────────────────────┬──────────────────────────┤
//! │   MemoryCredentialStore   │  SqliteCredentialStore   │
//! │        (DashMap)          │  + FieldEncryptor        │
//! │                           │    (AES-256-GCM, AAD =   │
//! │                           │     session id)          │
//! └───────────────────────────┴──────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use wpbridge_storage::{Database, FieldEncryptor, SqliteCredentialStore, parse_master_key};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! let key = parse_master_key(&std::env::var("WPBRIDGE_MASTER_KEY")?)?;
//! let db = Arc::new(Mutex::new(Database::open(&path)?));
//! let encryptor = Arc::new(FieldEncryptor::new(&key)?);
//! let store = SqliteCredentialStore::new(db, encryptor);
//! ```

pub mod crypto;
mod database;
mod repositories;

pub use crypto::{generate_master_key, parse_master_key, FieldEncryptor, KEY_SIZE};
pub use database::Database;
pub use repositories::*;

