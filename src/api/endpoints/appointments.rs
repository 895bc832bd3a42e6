//! Appointment endpoints.
//!
//! The detail response carries an `actions` object derived from the
//! eligibility rules, so the list screen and the detail screen render their
//! buttons from the same verdicts. Mutations re-check eligibility server-side
//! and answer refusals with 409 + the machine-readable reason.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::booking::{self, CancelOutcome, RescheduleOutcome};
use crate::db;
use crate::eligibility::{self, AppointmentAction, Verdict};
use crate::models::*;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct AppointmentListItem {
    pub id: Uuid,
    pub pet_name: String,
    pub service_name: String,
    pub status: &'static str,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub upcoming: bool,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentListItem>,
}

/// `GET /api/appointments?status=` — list appointments, optionally filtered.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(AppointmentStatus::from_str)
        .transpose()
        .map_err(|_| {
            ApiError::BadRequest(format!(
                "unknown status filter '{}'",
                params.status.as_deref().unwrap_or_default()
            ))
        })?;

    let conn = ctx.open_db()?;
    let summaries = db::list_appointment_summaries(&conn, status.as_ref())?;

    let now = Utc::now();
    let appointments = summaries
        .into_iter()
        .map(|s| {
            let upcoming = eligibility::scheduled_instant(&s.scheduled_date, &s.scheduled_time)
                .map(|at| at > now)
                .unwrap_or(false);
            AppointmentListItem {
                id: s.id,
                pet_name: s.pet_name,
                service_name: s.service_name,
                status: s.status.as_str(),
                scheduled_date: s.scheduled_date,
                scheduled_time: s.scheduled_time,
                upcoming,
            }
        })
        .collect();

    Ok(Json(AppointmentsResponse { appointments }))
}

// ─── Detail ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ActionAvailability {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionAvailability {
    fn from_verdict(action: AppointmentAction, verdict: &Verdict) -> Self {
        Self {
            allowed: verdict.allowed,
            reason_code: verdict.reason.map(|r| r.code()),
            message: verdict.reason.map(|r| r.message(action)),
        }
    }
}

#[derive(Serialize)]
pub struct CancelAvailability {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Cancellation falls in the late window; ask the user again before
    /// calling the cancel endpoint.
    pub requires_confirmation: bool,
}

#[derive(Serialize)]
pub struct ActionSet {
    pub edit: ActionAvailability,
    pub cancel: CancelAvailability,
    pub rebook: bool,
}

#[derive(Serialize)]
pub struct AppointmentDetail {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub service_id: Uuid,
    pub status: &'static str,
    pub scheduled_date: String,
    pub scheduled_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub upcoming: bool,
    pub actions: ActionSet,
}

fn detail_from(appt: Appointment, now: chrono::DateTime<Utc>) -> AppointmentDetail {
    let edit = eligibility::can_edit(&appt, now);
    let cancel = eligibility::can_cancel(&appt, now);

    AppointmentDetail {
        id: appt.id,
        pet_id: appt.pet_id,
        service_id: appt.service_id,
        status: appt.status.as_str(),
        upcoming: eligibility::is_upcoming(&appt, now),
        actions: ActionSet {
            edit: ActionAvailability::from_verdict(AppointmentAction::Edit, &edit),
            cancel: CancelAvailability {
                allowed: cancel.allowed,
                reason_code: cancel.reason.map(|r| r.code()),
                message: cancel.reason.map(|r| r.message(AppointmentAction::Cancel)),
                requires_confirmation: cancel.late_window,
            },
            rebook: eligibility::can_rebook(&appt),
        },
        scheduled_date: appt.scheduled_date,
        scheduled_time: appt.scheduled_time,
        note: appt.note,
    }
}

/// `GET /api/appointments/{id}` — detail with action availability.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    let conn = ctx.open_db()?;
    let appt = db::get_appointment(&conn, &id)?;
    Ok(Json(detail_from(appt, Utc::now())))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/appointments` — book a new appointment.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewAppointment>,
) -> Result<(StatusCode, Json<AppointmentDetail>), ApiError> {
    let conn = ctx.open_db()?;
    let now = Utc::now();
    let appt = booking::book_appointment(&conn, &new, now)?;
    Ok((StatusCode::CREATED, Json(detail_from(appt, now))))
}

// ─── Reschedule ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReschedulePayload {
    pub scheduled_date: String,
    pub scheduled_time: String,
}

/// `PUT /api/appointments/{id}/schedule` — move an appointment.
///
/// 409 with the refusal reason when editing is not allowed.
pub async fn reschedule(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<Json<AppointmentDetail>, ApiError> {
    let conn = ctx.open_db()?;
    let now = Utc::now();

    match booking::reschedule_appointment(
        &conn,
        &id,
        &payload.scheduled_date,
        &payload.scheduled_time,
        now,
    )? {
        RescheduleOutcome::Rescheduled(appt) => Ok(Json(detail_from(appt, now))),
        RescheduleOutcome::Refused(verdict) => {
            Err(ApiError::refusal(AppointmentAction::Edit, &verdict))
        }
    }
}

// ─── Cancel ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
    pub late_window: bool,
}

/// `POST /api/appointments/{id}/cancel` — cancel an appointment.
///
/// 409 with the refusal reason when cancellation is not allowed.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelResponse>, ApiError> {
    let conn = ctx.open_db()?;

    match booking::cancel_appointment(&conn, &id, Utc::now())? {
        CancelOutcome::Cancelled { late_window } => Ok(Json(CancelResponse {
            cancelled: true,
            late_window,
        })),
        CancelOutcome::Refused(verdict) => {
            Err(ApiError::refusal(AppointmentAction::Cancel, &verdict))
        }
    }
}

// ─── Rebook ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RebookResponse {
    pub draft: BookingDraft,
}

/// `GET /api/appointments/{id}/rebook` — pre-filled booking form for a
/// no-show appointment. 409 for every other status.
pub async fn rebook(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<RebookResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let appt = db::get_appointment(&conn, &id)?;

    match booking::rebook_draft(&appt) {
        Some(draft) => Ok(Json(RebookResponse { draft })),
        None => Err(ApiError::ActionRefused {
            code: "rebook_unavailable",
            message: "Rebooking is only offered for no-show appointments.".into(),
        }),
    }
}
