//! Pet registry endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{NewPet, Pet};

#[derive(Serialize)]
pub struct PetsResponse {
    pub pets: Vec<Pet>,
}

/// `GET /api/pets` — list registered pets.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<PetsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let pets = db::list_pets(&conn)?;
    Ok(Json(PetsResponse { pets }))
}

/// `POST /api/pets` — register a pet.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewPet>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::BadRequest("pet name must not be empty".into()));
    }

    let conn = ctx.open_db()?;
    let pet = Pet {
        id: Uuid::new_v4(),
        name: new.name,
        species: new.species,
        breed: new.breed,
        birth_date: new.birth_date,
        created_at: Utc::now().naive_utc(),
    };
    db::insert_pet(&conn, &pet)?;
    tracing::info!(pet = %pet.id, "pet registered");

    Ok((StatusCode::CREATED, Json(pet)))
}
