//! Caller authentication for the gateway
//!
//! Resolves the caller's session from signed tokens and enforces the
//! origin allow-list for control requests.

mod guard;
mod session;

pub use guard::{normalize_origin, AccessGuard};
pub use session::{
    issue_session_token, read_cookie, validate_session_token, SessionClaims, SessionResolver,
    SignedSessionCookieResolver,
};
