//! API Module
//!
//! HTTP handlers and routing for the node.
//!
//! # Endpoints
//! - `GET <base_path><group>/<key>` - Fetch a key for a peer (raw bytes)
//! - `GET /stats/:group` - Local cache statistics of a group
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
