//! Pawbook: booking backend for a pet clinic storefront.
//!
//! The appointment eligibility rules live in [`eligibility`]; everything that
//! mutates appointments routes through [`booking`], which consults them.

pub mod api;
pub mod booking;
pub mod config;
pub mod db;
pub mod eligibility;
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing from RUST_LOG, falling back to the app default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
