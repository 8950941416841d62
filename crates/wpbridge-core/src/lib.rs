//! # WPBridge Core Library
//!
//! Domain types and rules for bridging a web application session to a
//! remote WordPress site's MCP plugin.
//!
//! ## Modules
//!
//! - `branding` - Product constants (minimum plugin version, cookie names)
//! - `domain` - Core entities (RemoteCredential, HandshakeResult, ToolInvocation, AccessContext)
//! - `error` - Classified error kinds crossing the bridge boundary
//! - `repository` - Credential store contract
//! - `version` - Version compatibility gate

pub mod branding;
pub mod domain;
pub mod error;
pub mod repository;
pub mod version;

// Re-export commonly used types
pub use domain::*;
pub use error::{BridgeError, BridgeResult, CredentialError, StorageError};
pub use repository::{CredentialStore, StoreResult};
pub use version::{
    check_compatibility, check_compatibility_against, compare_versions, version_gte,
    CompatibilityVerdict, UNKNOWN_VERSION,
};
