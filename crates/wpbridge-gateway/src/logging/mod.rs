//! Request correlation for gateway logs
//!
//! Every inbound request gets a short trace id carried by a `request` span,
//! so lifecycle and client logs of one request can be grouped.

mod trace_context;

pub use trace_context::{generate_trace_id, RequestSpan, TraceContext};
