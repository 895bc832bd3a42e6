//! Storefront API: the HTTP surface the mobile app consumes.
//!
//! Routes are nested under `/api/`. The router is composable:
//! `storefront_router()` returns a `Router` that can be mounted on any axum
//! server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::storefront_router;
pub use server::{serve, start_server, ApiServer};
pub use types::ApiContext;
