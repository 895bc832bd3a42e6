//! Booking flows: create, reschedule, cancel, rebook.
//!
//! Thin orchestration over the repository. Every mutating call site consults
//! [`crate::eligibility`] first; a refusal comes back as a verdict-carrying
//! outcome with the row untouched, never as an error the caller must catch.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::eligibility::{self, Verdict};
use crate::models::*;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

/// Result of a reschedule attempt.
#[derive(Debug)]
pub enum RescheduleOutcome {
    Rescheduled(Appointment),
    /// Eligibility refused; nothing was written.
    Refused(Verdict),
}

/// Result of a cancel attempt.
#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled {
        /// The cancellation landed inside the late-confirmation window.
        late_window: bool,
    },
    /// Eligibility refused; nothing was written.
    Refused(Verdict),
}

/// Book a new appointment in `pending` status.
pub fn book_appointment(
    conn: &Connection,
    new: &NewAppointment,
    now: DateTime<Utc>,
) -> Result<Appointment, BookingError> {
    // Resolve the references first for a clear not-found error rather than a
    // bare foreign-key failure.
    db::get_pet(conn, &new.pet_id)?;
    db::get_service(conn, &new.service_id)?;
    ensure_future_schedule(&new.scheduled_date, &new.scheduled_time, now)?;

    let ts = now.naive_utc();
    let appt = Appointment {
        id: Uuid::new_v4(),
        pet_id: new.pet_id,
        service_id: new.service_id,
        status: AppointmentStatus::Pending,
        scheduled_date: new.scheduled_date.clone(),
        scheduled_time: new.scheduled_time.clone(),
        note: new.note.clone(),
        created_at: ts,
        updated_at: ts,
    };
    db::insert_appointment(conn, &appt)?;
    tracing::info!(appointment = %appt.id, date = %appt.scheduled_date, "appointment booked");
    Ok(appt)
}

/// Move an appointment to a new date/time, if editing is currently allowed.
pub fn reschedule_appointment(
    conn: &Connection,
    id: &Uuid,
    scheduled_date: &str,
    scheduled_time: &str,
    now: DateTime<Utc>,
) -> Result<RescheduleOutcome, BookingError> {
    let appt = db::get_appointment(conn, id)?;

    let verdict = eligibility::can_edit(&appt, now);
    if !verdict.allowed {
        let code = verdict.reason.map(|r| r.code()).unwrap_or("refused");
        tracing::warn!(appointment = %id, code, "reschedule refused");
        return Ok(RescheduleOutcome::Refused(verdict));
    }

    ensure_future_schedule(scheduled_date, scheduled_time, now)?;
    db::update_schedule(conn, id, scheduled_date, scheduled_time)?;
    Ok(RescheduleOutcome::Rescheduled(db::get_appointment(conn, id)?))
}

/// Cancel an appointment, if cancellation is currently allowed.
pub fn cancel_appointment(
    conn: &Connection,
    id: &Uuid,
    now: DateTime<Utc>,
) -> Result<CancelOutcome, BookingError> {
    let appt = db::get_appointment(conn, id)?;

    let verdict = eligibility::can_cancel(&appt, now);
    if !verdict.allowed {
        let code = verdict.reason.map(|r| r.code()).unwrap_or("refused");
        tracing::warn!(appointment = %id, code, "cancel refused");
        return Ok(CancelOutcome::Refused(verdict));
    }

    db::transition_status(conn, id, AppointmentStatus::Cancelled)?;
    tracing::info!(appointment = %id, late_window = verdict.late_window, "appointment cancelled");
    Ok(CancelOutcome::Cancelled { late_window: verdict.late_window })
}

/// Pre-filled booking form for booking a no-show appointment again.
///
/// `None` unless rebooking is offered for this appointment.
pub fn rebook_draft(appt: &Appointment) -> Option<BookingDraft> {
    if !eligibility::can_rebook(appt) {
        return None;
    }
    Some(BookingDraft {
        pet_id: appt.pet_id,
        service_id: appt.service_id,
        note: appt.note.clone(),
        source_appointment_id: appt.id,
    })
}

fn ensure_future_schedule(
    date: &str,
    time: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, BookingError> {
    let at = eligibility::scheduled_instant(date, time).ok_or_else(|| {
        BookingError::InvalidSchedule(format!("cannot interpret '{date} {time}'"))
    })?;
    if at <= now {
        return Err(BookingError::InvalidSchedule(
            "the appointment time must be in the future".into(),
        ));
    }
    Ok(at)
}
