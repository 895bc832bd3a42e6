//! Repository layer: entity-scoped database operations.
//!
//! Plain functions over `&rusqlite::Connection`, one sub-module per entity.
//! Status transitions for appointments are enforced here; eligibility
//! (may the *user* do this now?) lives in [`crate::eligibility`].

mod appointment;
mod pet;
mod service;

pub use appointment::*;
pub use pet::*;
pub use service::*;
