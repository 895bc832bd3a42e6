use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_pet(conn: &Connection, pet: &Pet) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pets (id, name, species, breed, birth_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            pet.id.to_string(),
            pet.name,
            pet.species.as_str(),
            pet.breed,
            pet.birth_date.map(|d| d.to_string()),
            pet.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_pet(conn: &Connection, id: &Uuid) -> Result<Pet, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, species, breed, birth_date, created_at
         FROM pets WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        },
    );

    match result {
        Ok(row) => pet_from_row(row),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound {
            entity_type: "Pet".into(),
            id: id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

pub fn list_pets(conn: &Connection) -> Result<Vec<Pet>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, species, breed, birth_date, created_at
         FROM pets ORDER BY name ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut pets = Vec::new();
    for row in rows {
        pets.push(pet_from_row(row?)?);
    }
    Ok(pets)
}

type PetRow = (String, String, String, Option<String>, Option<String>, String);

fn pet_from_row(row: PetRow) -> Result<Pet, DatabaseError> {
    let (id, name, species, breed, birth_date, created_at) = row;
    Ok(Pet {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name,
        species: PetSpecies::from_str(&species)?,
        breed,
        birth_date: birth_date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}
