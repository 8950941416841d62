//! Core domain tests
//!
//! Version gate properties and credential invariants.

mod credential;
mod version_gate;
