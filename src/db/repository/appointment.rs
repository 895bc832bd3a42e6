use std::str::FromStr;

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, pet_id, service_id, status, scheduled_date,
         scheduled_time, note, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appt.id.to_string(),
            appt.pet_id.to_string(),
            appt.service_id.to_string(),
            appt.status.as_str(),
            appt.scheduled_date,
            appt.scheduled_time,
            appt.note,
            appt.created_at.format(DATETIME_FMT).to_string(),
            appt.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, pet_id, service_id, status, scheduled_date, scheduled_time,
         note, created_at, updated_at
         FROM appointments WHERE id = ?1",
        params![id.to_string()],
        |row| appointment_row_from_rusqlite(row),
    );

    match result {
        Ok(row) => appointment_from_row(row),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// All appointments, optionally filtered by status, soonest schedule first.
pub fn list_appointments(
    conn: &Connection,
    status: Option<&AppointmentStatus>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, pet_id, service_id, status, scheduled_date, scheduled_time,
         note, created_at, updated_at
         FROM appointments
         WHERE (?1 IS NULL OR status = ?1)
         ORDER BY scheduled_date ASC, scheduled_time ASC",
    )?;

    let rows = stmt.query_map(params![status.map(|s| s.as_str())], |row| {
        appointment_row_from_rusqlite(row)
    })?;

    let mut appts = Vec::new();
    for row in rows {
        appts.push(appointment_from_row(row?)?);
    }
    Ok(appts)
}

/// List rows joined with pet and service names for display.
pub fn list_appointment_summaries(
    conn: &Connection,
    status: Option<&AppointmentStatus>,
) -> Result<Vec<AppointmentSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, p.name, s.name, a.status, a.scheduled_date, a.scheduled_time
         FROM appointments a
         JOIN pets p ON a.pet_id = p.id
         JOIN services s ON a.service_id = s.id
         WHERE (?1 IS NULL OR a.status = ?1)
         ORDER BY a.scheduled_date ASC, a.scheduled_time ASC",
    )?;

    let rows = stmt.query_map(params![status.map(|s| s.as_str())], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (id, pet_name, service_name, status, scheduled_date, scheduled_time) = row?;
        summaries.push(AppointmentSummary {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            pet_name,
            service_name,
            status: AppointmentStatus::from_str(&status)?,
            scheduled_date,
            scheduled_time,
        });
    }
    Ok(summaries)
}

/// Rewrite the schedule fields of an appointment and bump `updated_at`.
///
/// Eligibility is the caller's concern; this is the raw field update.
pub fn update_schedule(
    conn: &Connection,
    id: &Uuid,
    scheduled_date: &str,
    scheduled_time: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET scheduled_date = ?1, scheduled_time = ?2, updated_at = ?3
         WHERE id = ?4",
        params![
            scheduled_date,
            scheduled_time,
            Utc::now().naive_utc().format(DATETIME_FMT).to_string(),
            id.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Move an appointment to a new status, enforcing the transition table.
///
/// Terminal statuses stay terminal: a cancelled appointment cannot be
/// resurrected even by a caller that skips the eligibility checks.
pub fn transition_status(
    conn: &Connection,
    id: &Uuid,
    next: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let current = get_appointment(conn, id)?.status;

    if !current.can_transition_to(&next) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "invalid status transition: {} -> {}",
            current.as_str(),
            next.as_str()
        )));
    }

    conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![
            next.as_str(),
            Utc::now().naive_utc().format(DATETIME_FMT).to_string(),
            id.to_string(),
        ],
    )?;
    Ok(())
}

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: String,
    pet_id: String,
    service_id: String,
    status: String,
    scheduled_date: String,
    scheduled_time: String,
    note: Option<String>,
    created_at: String,
    updated_at: String,
}

fn appointment_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        pet_id: row.get(1)?,
        service_id: row.get(2)?,
        status: row.get(3)?,
        scheduled_date: row.get(4)?,
        scheduled_time: row.get(5)?,
        note: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        pet_id: Uuid::parse_str(&row.pet_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        service_id: Uuid::parse_str(&row.service_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        status: AppointmentStatus::from_str(&row.status)?,
        scheduled_date: row.scheduled_date,
        scheduled_time: row.scheduled_time,
        note: row.note,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, DATETIME_FMT)
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&row.updated_at, DATETIME_FMT)
            .unwrap_or_default(),
    })
}
