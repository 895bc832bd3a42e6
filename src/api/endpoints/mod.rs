//! API endpoint handlers.
//!
//! Each module corresponds to a storefront screen or feature. Handlers reuse
//! the booking flows and eligibility rules; no handler re-implements them.

pub mod appointments;
pub mod health;
pub mod pets;
pub mod services;
