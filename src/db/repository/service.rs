use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_service(conn: &Connection, service: &Service) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO services (id, name, category, price_cents, duration_minutes, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            service.id.to_string(),
            service.name,
            service.category.as_str(),
            service.price_cents,
            service.duration_minutes,
            service.active as i32,
        ],
    )?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &Uuid) -> Result<Service, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, category, price_cents, duration_minutes, active
         FROM services WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i32>(5)?,
            ))
        },
    );

    match result {
        Ok(row) => service_from_row(row),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "Service".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Services currently offered in the storefront.
pub fn list_active_services(conn: &Connection) -> Result<Vec<Service>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category, price_cents, duration_minutes, active
         FROM services WHERE active = 1 ORDER BY name ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, i32>(5)?,
        ))
    })?;

    let mut services = Vec::new();
    for row in rows {
        services.push(service_from_row(row?)?);
    }
    Ok(services)
}

type ServiceRow = (String, String, String, i64, i64, i32);

fn service_from_row(row: ServiceRow) -> Result<Service, DatabaseError> {
    let (id, name, category, price_cents, duration_minutes, active) = row;
    Ok(Service {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name,
        category: ServiceCategory::from_str(&category)?,
        price_cents,
        duration_minutes,
        active: active != 0,
    })
}
