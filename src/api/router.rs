//! Storefront API router.
//!
//! Returns a composable `Router` with all routes nested under `/api/`.
//! CORS is permissive: the storefront client is a mobile webview and the
//! API carries no credentials (auth lives in front of this service).

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the storefront API router.
pub fn storefront_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/services", get(endpoints::services::list))
        .route(
            "/pets",
            get(endpoints::pets::list).post(endpoints::pets::create),
        )
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route("/appointments/:id", get(endpoints::appointments::detail))
        .route(
            "/appointments/:id/schedule",
            put(endpoints::appointments::reschedule),
        )
        .route(
            "/appointments/:id/cancel",
            post(endpoints::appointments::cancel),
        )
        .route(
            "/appointments/:id/rebook",
            get(endpoints::appointments::rebook),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, FixedOffset, NaiveDateTime, Utc};
    use serde_json::{json, Value};
    use std::path::{Path, PathBuf};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::db;
    use crate::eligibility::CLINIC_UTC_OFFSET_SECS;
    use crate::models::*;

    fn setup() -> (Router, tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pawbook.db");
        drop(db::open_database(&path).unwrap());
        let router = storefront_router(ApiContext::new(path.clone()));
        (router, tmp, path)
    }

    fn seed_ts() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-01-10 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn seed_refs(path: &Path) -> (Uuid, Uuid) {
        let conn = db::open_database(path).unwrap();
        let pet = Pet {
            id: Uuid::new_v4(),
            name: "Mochi".into(),
            species: PetSpecies::Cat,
            breed: None,
            birth_date: None,
            created_at: seed_ts(),
        };
        db::insert_pet(&conn, &pet).unwrap();
        let service = Service {
            id: Uuid::new_v4(),
            name: "Full Grooming".into(),
            category: ServiceCategory::Grooming,
            price_cents: 45_000,
            duration_minutes: 90,
            active: true,
        };
        db::insert_service(&conn, &service).unwrap();
        (pet.id, service.id)
    }

    fn seed_appointment(
        path: &Path,
        pet_id: Uuid,
        service_id: Uuid,
        status: AppointmentStatus,
        date: &str,
        time: &str,
    ) -> Uuid {
        let conn = db::open_database(path).unwrap();
        let appt = Appointment {
            id: Uuid::new_v4(),
            pet_id,
            service_id,
            status,
            scheduled_date: date.into(),
            scheduled_time: time.into(),
            note: None,
            created_at: seed_ts(),
            updated_at: seed_ts(),
        };
        db::insert_appointment(&conn, &appt).unwrap();
        appt.id
    }

    /// Clinic-local date/time strings for an instant `minutes` from now.
    fn clinic_strings_ahead(minutes: i64) -> (String, String) {
        let offset = FixedOffset::east_opt(CLINIC_UTC_OFFSET_SECS).unwrap();
        let t = (Utc::now() + Duration::minutes(minutes)).with_timezone(&offset);
        (
            t.format("%Y-%m-%d").to_string(),
            t.format("%H:%M").to_string(),
        )
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (router, _tmp, _path) = setup();
        let (status, body) = send(router, get_req("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (router, _tmp, _path) = setup();
        let (status, _) = send(router, get_req("/api/nonexistent")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn register_and_list_pets() {
        let (router, _tmp, _path) = setup();

        let (status, body) = send(
            router.clone(),
            json_req(
                "POST",
                "/api/pets",
                json!({"name": "Biscuit", "species": "Dog", "breed": "Corgi"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Biscuit");

        let (status, body) = send(router, get_req("/api/pets")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pets"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_pet_name_rejected() {
        let (router, _tmp, _path) = setup();
        let (status, body) = send(
            router,
            json_req("POST", "/api/pets", json!({"name": "  ", "species": "Cat"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn services_list_active_only() {
        let (router, _tmp, path) = setup();
        seed_refs(&path);
        let conn = db::open_database(&path).unwrap();
        db::insert_service(
            &conn,
            &Service {
                id: Uuid::new_v4(),
                name: "Retired Package".into(),
                category: ServiceCategory::Boarding,
                price_cents: 10_000,
                duration_minutes: 60,
                active: false,
            },
        )
        .unwrap();

        let (status, body) = send(router, get_req("/api/services")).await;
        assert_eq!(status, StatusCode::OK);
        let services = body["services"].as_array().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0]["name"], "Full Grooming");
    }

    #[tokio::test]
    async fn book_appointment_returns_detail_with_actions() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);

        let (status, body) = send(
            router,
            json_req(
                "POST",
                "/api/appointments",
                json!({
                    "pet_id": pet_id,
                    "service_id": service_id,
                    "scheduled_date": "2999-01-01",
                    "scheduled_time": "12:00"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["upcoming"], true);
        assert_eq!(body["actions"]["edit"]["allowed"], true);
        assert_eq!(body["actions"]["cancel"]["allowed"], true);
        assert_eq!(body["actions"]["cancel"]["requires_confirmation"], false);
        assert_eq!(body["actions"]["rebook"], false);
    }

    #[tokio::test]
    async fn book_with_past_schedule_is_rejected() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);

        let (status, body) = send(
            router,
            json_req(
                "POST",
                "/api/appointments",
                json!({
                    "pet_id": pet_id,
                    "service_id": service_id,
                    "scheduled_date": "2000-01-01",
                    "scheduled_time": "12:00"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);
        seed_appointment(&path, pet_id, service_id, AppointmentStatus::Pending, "2999-01-01", "12:00");
        seed_appointment(&path, pet_id, service_id, AppointmentStatus::Completed, "2000-01-01", "12:00");

        let (status, body) = send(router.clone(), get_req("/api/appointments")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appointments"].as_array().unwrap().len(), 2);

        let (status, body) =
            send(router.clone(), get_req("/api/appointments?status=pending")).await;
        assert_eq!(status, StatusCode::OK);
        let items = body["appointments"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["status"], "pending");
        assert_eq!(items[0]["pet_name"], "Mochi");
        assert_eq!(items[0]["upcoming"], true);

        let (status, _) = send(router, get_req("/api/appointments?status=booked")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn detail_for_unknown_appointment_is_404() {
        let (router, _tmp, _path) = setup();
        let (status, body) =
            send(router, get_req(&format!("/api/appointments/{}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn detail_fails_closed_on_malformed_schedule() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);
        let id = seed_appointment(&path, pet_id, service_id, AppointmentStatus::Pending, "garbage", "12:00");

        let (status, body) = send(router, get_req(&format!("/api/appointments/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["upcoming"], false);
        assert_eq!(body["actions"]["edit"]["allowed"], false);
        assert_eq!(body["actions"]["edit"]["reason_code"], "time_parse_error");
        assert_eq!(body["actions"]["cancel"]["allowed"], false);
        assert_eq!(body["actions"]["cancel"]["reason_code"], "time_parse_error");
    }

    #[tokio::test]
    async fn detail_for_past_appointment_refuses_with_already_past() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);
        let id = seed_appointment(&path, pet_id, service_id, AppointmentStatus::Pending, "2000-01-01", "12:00");

        let (_, body) = send(router, get_req(&format!("/api/appointments/{id}"))).await;
        assert_eq!(body["actions"]["edit"]["reason_code"], "already_past");
        assert_eq!(body["actions"]["cancel"]["reason_code"], "already_past");
    }

    #[tokio::test]
    async fn reschedule_then_refused_after_confirmation() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);
        let id = seed_appointment(&path, pet_id, service_id, AppointmentStatus::Pending, "2999-01-01", "12:00");

        let (status, body) = send(
            router.clone(),
            json_req(
                "PUT",
                &format!("/api/appointments/{id}/schedule"),
                json!({"scheduled_date": "2999-02-01", "scheduled_time": "09:30"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scheduled_date"], "2999-02-01");
        assert_eq!(body["scheduled_time"], "09:30");

        // Clinic confirms the appointment; editing is now refused.
        let conn = db::open_database(&path).unwrap();
        db::transition_status(&conn, &id, AppointmentStatus::Confirmed).unwrap();

        let (status, body) = send(
            router,
            json_req(
                "PUT",
                &format!("/api/appointments/{id}/schedule"),
                json!({"scheduled_date": "2999-03-01", "scheduled_time": "10:00"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "status_not_pending");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("confirmed"));
    }

    #[tokio::test]
    async fn cancel_twice_conflicts_second_time() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);
        let id = seed_appointment(&path, pet_id, service_id, AppointmentStatus::Pending, "2999-01-01", "12:00");

        let (status, body) = send(
            router.clone(),
            json_req("POST", &format!("/api/appointments/{id}/cancel"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cancelled"], true);
        assert_eq!(body["late_window"], false);

        let (status, body) = send(
            router,
            json_req("POST", &format!("/api/appointments/{id}/cancel"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "status_not_pending");
    }

    #[tokio::test]
    async fn cancel_near_schedule_reports_late_window() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);
        let (date, time) = clinic_strings_ahead(90);
        let id = seed_appointment(&path, pet_id, service_id, AppointmentStatus::Pending, &date, &time);

        let (status, body) = send(
            router,
            json_req("POST", &format!("/api/appointments/{id}/cancel"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cancelled"], true);
        assert_eq!(body["late_window"], true);
    }

    #[tokio::test]
    async fn rebook_offered_for_no_show_only() {
        let (router, _tmp, path) = setup();
        let (pet_id, service_id) = seed_refs(&path);
        let pending = seed_appointment(&path, pet_id, service_id, AppointmentStatus::Pending, "2999-01-01", "12:00");
        let missed = seed_appointment(&path, pet_id, service_id, AppointmentStatus::NoShow, "2000-01-01", "12:00");

        let (status, body) =
            send(router.clone(), get_req(&format!("/api/appointments/{missed}/rebook"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["draft"]["pet_id"], pet_id.to_string());
        assert_eq!(body["draft"]["service_id"], service_id.to_string());
        assert_eq!(body["draft"]["source_appointment_id"], missed.to_string());

        let (status, body) =
            send(router, get_req(&format!("/api/appointments/{pending}/rebook"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "rebook_unavailable");
    }
}
