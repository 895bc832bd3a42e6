use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ServiceCategory;

/// Bookable clinic service (grooming, checkup, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub category: ServiceCategory,
    pub price_cents: i64,
    pub duration_minutes: i64,
    pub active: bool,
}
