//! Request and Response models exchanged between peers
//!
//! The fetch pair is the logical contract of a peer lookup; the HTTP path
//! and body are just one encoding of it.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::FetchRequest;
pub use responses::{FetchResponse, HealthResponse, StatsResponse};
