//! Service catalogue endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::Service;

#[derive(Serialize)]
pub struct ServicesResponse {
    pub services: Vec<Service>,
}

/// `GET /api/services` — the bookable service catalogue.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<ServicesResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let services = db::list_active_services(&conn)?;
    Ok(Json(ServicesResponse { services }))
}
