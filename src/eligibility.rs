//! Appointment eligibility rules.
//!
//! Decides whether an appointment may currently be edited, cancelled or
//! rebooked, given its status and its scheduled instant relative to a
//! caller-supplied `now`. Both the list screen and the detail screen of the
//! storefront app derive their affordances from these functions, so the rules
//! live here once and nowhere else.
//!
//! Everything is pure: no clock reads, no I/O, no shared state. `now` is
//! sampled once by the caller, so one verdict is internally consistent.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::{Appointment, AppointmentStatus};

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Stored schedules carry no timezone metadata; the clinic interprets them at
/// a fixed UTC+07:00, carried over from the upstream data format.
pub const CLINIC_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Cancellations this close to the scheduled instant are still allowed but
/// flagged so the client can ask for a stronger confirmation first.
pub const CANCEL_GRACE_HOURS: i64 = 2;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// The user-initiated action a verdict is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Edit,
    Cancel,
}

impl AppointmentAction {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Edit => "edited",
            Self::Cancel => "cancelled",
        }
    }
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    /// Only pending appointments can be edited or cancelled; carries the
    /// actual status so the message can say what state the appointment is in.
    StatusNotPending(AppointmentStatus),
    /// The scheduled instant is not in the future.
    AlreadyPast,
    /// The stored date/time could not be interpreted. Fail closed.
    TimeParse,
}

impl RefusalReason {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StatusNotPending(_) => "status_not_pending",
            Self::AlreadyPast => "already_past",
            Self::TimeParse => "time_parse_error",
        }
    }

    /// Human-facing explanation, with the action verb substituted in.
    pub fn message(&self, action: AppointmentAction) -> String {
        match self {
            Self::StatusNotPending(status) => match status {
                AppointmentStatus::Confirmed => format!(
                    "This appointment is already confirmed. Please contact the clinic to have it {}.",
                    action.verb()
                ),
                AppointmentStatus::InProgress => format!(
                    "This appointment is already in progress and cannot be {}.",
                    action.verb()
                ),
                AppointmentStatus::Completed => {
                    "This appointment has already been completed.".into()
                }
                AppointmentStatus::Cancelled => {
                    "This appointment has already been cancelled.".into()
                }
                AppointmentStatus::NoShow => {
                    "This appointment was marked as a no-show.".into()
                }
                _ => format!(
                    "This appointment cannot be {} in its current status.",
                    action.verb()
                ),
            },
            Self::AlreadyPast => "The appointment time has already passed.".into(),
            Self::TimeParse => "Could not process the appointment time.".into(),
        }
    }
}

/// Allow/refuse decision for one action on one appointment snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: bool,
    /// Present iff refused.
    pub reason: Option<RefusalReason>,
    /// Cancel verdicts only: the appointment is within [`CANCEL_GRACE_HOURS`]
    /// of its scheduled instant. Advisory; never changes `allowed`.
    pub late_window: bool,
}

impl Verdict {
    fn allow() -> Self {
        Self { allowed: true, reason: None, late_window: false }
    }

    fn refuse(reason: RefusalReason) -> Self {
        Self { allowed: false, reason: Some(reason), late_window: false }
    }
}

// ═══════════════════════════════════════════════════════════
// Schedule parsing
// ═══════════════════════════════════════════════════════════

/// Combine the stored date ("YYYY-MM-DD") and time ("HH:MM", seconds
/// tolerated) into an instant at the clinic's fixed offset.
///
/// `None` on any malformed component; callers turn that into a refusal.
pub fn scheduled_instant(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = parse_stored_time(time.trim())?;
    let offset = FixedOffset::east_opt(CLINIC_UTC_OFFSET_SECS)?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_stored_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

// ═══════════════════════════════════════════════════════════
// Verdicts
// ═══════════════════════════════════════════════════════════

/// Shared gate: pending status, parseable schedule, scheduled instant still
/// in the future. Returns the instant so cancel can derive the late window.
fn schedule_gate(appt: &Appointment, now: DateTime<Utc>) -> Result<DateTime<Utc>, RefusalReason> {
    if appt.status != AppointmentStatus::Pending {
        return Err(RefusalReason::StatusNotPending(appt.status));
    }
    let at = scheduled_instant(&appt.scheduled_date, &appt.scheduled_time)
        .ok_or(RefusalReason::TimeParse)?;
    if at <= now {
        return Err(RefusalReason::AlreadyPast);
    }
    Ok(at)
}

/// May the appointment be edited (rescheduled) right now?
pub fn can_edit(appt: &Appointment, now: DateTime<Utc>) -> Verdict {
    match schedule_gate(appt, now) {
        Ok(_) => Verdict::allow(),
        Err(reason) => Verdict::refuse(reason),
    }
}

/// May the appointment be cancelled right now?
///
/// Same gates as [`can_edit`]; an allowed verdict additionally reports
/// whether the cancellation falls inside the late-confirmation window.
pub fn can_cancel(appt: &Appointment, now: DateTime<Utc>) -> Verdict {
    match schedule_gate(appt, now) {
        Ok(at) => Verdict {
            allowed: true,
            reason: None,
            late_window: at <= now + Duration::hours(CANCEL_GRACE_HOURS),
        },
        Err(reason) => Verdict::refuse(reason),
    }
}

/// Is the scheduled instant still ahead of `now`? False when the stored
/// schedule cannot be parsed.
pub fn is_upcoming(appt: &Appointment, now: DateTime<Utc>) -> bool {
    scheduled_instant(&appt.scheduled_date, &appt.scheduled_time)
        .map(|at| at > now)
        .unwrap_or(false)
}

/// Rebooking is offered only for no-show appointments.
pub fn can_rebook(appt: &Appointment) -> bool {
    appt.status == AppointmentStatus::NoShow
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
