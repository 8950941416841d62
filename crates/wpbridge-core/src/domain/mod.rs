//! Domain entities

mod access;
mod connection;
mod credential;
mod handshake;
mod session;
mod tool;

pub use access::AccessContext;
pub use connection::{ConnectionReport, ConnectionState};
pub use credential::RemoteCredential;
pub use handshake::{Capabilities, HandshakeResult, ServerInfo};
pub use session::SessionId;
pub use tool::{ToolInvocation, ToolResult};
