use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

/// Appointment row as stored.
///
/// `scheduled_date` ("YYYY-MM-DD") and `scheduled_time` ("HH:MM") are kept as
/// the TEXT the client submitted. The eligibility rules parse them on every
/// evaluation and refuse the action when they cannot be interpreted, so a
/// malformed row is a refusal, not a mapping failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub service_id: Uuid,
    pub status: AppointmentStatus,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for booking a new appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub pet_id: Uuid,
    pub service_id: Uuid,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub note: Option<String>,
}

/// Appointment list row with display names joined in.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentSummary {
    pub id: Uuid,
    pub pet_name: String,
    pub service_name: String,
    pub status: AppointmentStatus,
    pub scheduled_date: String,
    pub scheduled_time: String,
}

/// Pre-filled booking form for rebooking a no-show appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingDraft {
    pub pet_id: Uuid,
    pub service_id: Uuid,
    pub note: Option<String>,
    pub source_appointment_id: Uuid,
}
