//! HTTP tests for the RentCar API
//!
//! Run the full route table against services backed by `MemoryStore`.

use actix_web::{http::StatusCode, test, App};
use chrono::{Duration, Utc};
use rentcar_api::{AppState, Repositories};
use rentcar_auth::{JwtService, PasswordService};
use rentcar_db::MemoryStore;
use serde_json::{json, Value};

fn state() -> AppState {
    AppState::new(
        Repositories::memory(&MemoryStore::new()),
        PasswordService::with_cost(1).unwrap(),
        JwtService::new("api-test-secret", 3600),
    )
}

macro_rules! init_app {
    ($state:expr) => {{
        let state = $state.clone();
        test::init_service(App::new().configure(move |cfg| state.configure(cfg))).await
    }};
}

macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

macro_rules! signup_and_login {
    ($app:expr, $email:expr, $role:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post().uri("/api/v1/auth/signup").set_json(json!({
                "name": "Test User",
                "email": $email,
                "password": "secret1",
                "phone": "555-0100",
                "role": $role,
            }))
        );
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({"email": $email, "password": "secret1"}))
        );
        assert_eq!(status, StatusCode::OK, "{}", body);
        (id, format!("Bearer {}", body["data"]["token"].as_str().unwrap()))
    }};
}

macro_rules! add_vehicle {
    ($app:expr, $admin:expr, $registration:expr, $price:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/vehicles")
                .insert_header(("Authorization", $admin.clone()))
                .set_json(json!({
                    "vehicle_name": "Toyota Corolla",
                    "type": "car",
                    "registration_number": $registration,
                    "daily_rent_price": $price,
                }))
        );
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_i64().unwrap()
    }};
}

fn day_offset(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

#[actix_web::test]
async fn test_health_and_unknown_route() {
    let app = init_app!(state());

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/v1/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/v1/nowhere"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Route not found"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_signup_rules() {
    let app = init_app!(state());

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "name": "Ann",
            "email": "ann@example.com",
            "password": "secret1",
            "phone": "555-0111",
        }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "customer");
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("password").is_none());

    let duplicate = json!({
        "name": "Ann",
        "email": "ann@example.com",
        "password": "secret1",
        "phone": "555-0111",
    });
    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/v1/auth/signup").set_json(&duplicate)
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_exists");

    let (status, _) = send!(
        app,
        test::TestRequest::post().uri("/api/v1/auth/signup").set_json(json!({
            "name": "Ann",
            "email": "Ann@Example.com",
            "password": "secret1",
            "phone": "555-0111",
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(
        app,
        test::TestRequest::post().uri("/api/v1/auth/signup").set_json(json!({
            "name": "Bo",
            "email": "bo@example.com",
            "password": "12345",
            "phone": "555-0112",
        }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_login_and_me() {
    let app = init_app!(state());
    let (id, token) = signup_and_login!(app, "me@example.com", "customer");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", token))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_i64(), Some(id));

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "me@example.com", "password": "wrong-one"}))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "ghost@example.com", "password": "secret1"}))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_access_control() {
    let app = init_app!(state());
    let (_, customer) = signup_and_login!(app, "cust@example.com", "customer");

    let (status, _) = send!(app, test::TestRequest::get().uri("/api/v1/vehicles"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(app, test::TestRequest::get().uri("/api/v1/bookings"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/users")
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/vehicles")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({
                "vehicle_name": "Civic",
                "type": "car",
                "registration_number": "X-1",
                "daily_rent_price": 10,
            }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/vehicles")
            .insert_header(("Authorization", customer))
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_booking_scenario_price_and_return() {
    let app = init_app!(state());
    let (_, admin) = signup_and_login!(app, "admin@example.com", "admin");
    let (customer_id, customer) = signup_and_login!(app, "renter@example.com", "customer");
    let vehicle_id = add_vehicle!(app, admin, "SC-100", 100);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({
                "customer_id": customer_id,
                "vehicle_id": vehicle_id,
                "rent_start_date": "2024-01-01",
                "rent_end_date": "2024-01-04",
            }))
    );
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["total_price"], 300);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["vehicle"]["registration_number"], "SC-100");
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/vehicles/{}", vehicle_id))
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(body["data"]["availability_status"], "booked");

    // Second booking for the same vehicle
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({
                "customer_id": customer_id,
                "vehicle_id": vehicle_id,
                "rent_start_date": "2024-02-01",
                "rent_end_date": "2024-02-02",
            }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "vehicle_unavailable");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/bookings/{}", booking_id))
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({"status": "returned"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "returned");
    assert_eq!(body["data"]["vehicle"]["availability_status"], "available");
    assert!(body["message"].as_str().unwrap().contains("returned"));

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/bookings/{}", booking_id))
            .insert_header(("Authorization", admin))
            .set_json(json!({"status": "returned"}))
    );
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_booking_validation_errors() {
    let app = init_app!(state());
    let (_, admin) = signup_and_login!(app, "admin@example.com", "admin");
    let (customer_id, customer) = signup_and_login!(app, "dates@example.com", "customer");
    let vehicle_id = add_vehicle!(app, admin, "VE-1", 100);

    for (start, end) in [("2024-01-04", "2024-01-04"), ("2024-01-05", "2024-01-04"), ("tomorrow", "2024-01-04")] {
        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/bookings")
                .insert_header(("Authorization", customer.clone()))
                .set_json(json!({
                    "customer_id": customer_id,
                    "vehicle_id": vehicle_id,
                    "rent_start_date": start,
                    "rent_end_date": end,
                }))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", start, end);
    }

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({
                "customer_id": customer_id,
                "vehicle_id": 9999,
                "rent_start_date": "2024-01-01",
                "rent_end_date": "2024-01-02",
            }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", customer))
            .set_json(json!({
                "vehicle_id": vehicle_id,
                "rent_start_date": "2024-01-01",
                "rent_end_date": "2024-01-02",
            }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_customer_cancellation_rules() {
    let app = init_app!(state());
    let (_, admin) = signup_and_login!(app, "admin@example.com", "admin");
    let (owner_id, owner) = signup_and_login!(app, "owner@example.com", "customer");
    let (_, intruder) = signup_and_login!(app, "intruder@example.com", "customer");
    let vehicle_id = add_vehicle!(app, admin, "CN-1", 80);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", owner.clone()))
            .set_json(json!({
                "customer_id": owner_id,
                "vehicle_id": vehicle_id,
                "rent_start_date": day_offset(1),
                "rent_end_date": day_offset(4),
            }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total_price"], 240);
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/bookings/{}", booking_id);

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", intruder.clone()))
            .set_json(json!({"status": "cancelled"}))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", owner.clone()))
            .set_json(json!({"status": "returned"}))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", owner.clone()))
            .set_json(json!({"status": "cancelled"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking cancelled successfully");

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/vehicles/{}", vehicle_id))
            .insert_header(("Authorization", owner.clone()))
    );
    assert_eq!(body["data"]["availability_status"], "available");

    // Booking someone else in
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", intruder))
            .set_json(json!({
                "customer_id": owner_id,
                "vehicle_id": vehicle_id,
                "rent_start_date": day_offset(1),
                "rent_end_date": day_offset(2),
            }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_started_booking_cannot_be_cancelled() {
    let app = init_app!(state());
    let (_, admin) = signup_and_login!(app, "admin@example.com", "admin");
    let (owner_id, owner) = signup_and_login!(app, "late@example.com", "customer");
    let vehicle_id = add_vehicle!(app, admin, "LT-1", 80);

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", owner.clone()))
            .set_json(json!({
                "customer_id": owner_id,
                "vehicle_id": vehicle_id,
                "rent_start_date": day_offset(-1),
                "rent_end_date": day_offset(2),
            }))
    );
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/bookings/{}", booking_id))
            .insert_header(("Authorization", owner))
            .set_json(json!({"status": "cancelled"}))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");
}

#[actix_web::test]
async fn test_booking_lists_are_scoped() {
    let app = init_app!(state());
    let (_, admin) = signup_and_login!(app, "admin@example.com", "admin");
    let (a_id, a) = signup_and_login!(app, "a@example.com", "customer");
    let (b_id, b) = signup_and_login!(app, "b@example.com", "customer");
    let v1 = add_vehicle!(app, admin, "LS-1", 10);
    let v2 = add_vehicle!(app, admin, "LS-2", 10);

    for (id, token, vehicle) in [(a_id, a.clone(), v1), (b_id, b.clone(), v2)] {
        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/v1/bookings")
                .insert_header(("Authorization", token))
                .set_json(json!({
                    "customer_id": id,
                    "vehicle_id": vehicle,
                    "rent_start_date": "2030-01-01",
                    "rent_end_date": "2030-01-02",
                }))
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", a))
    );
    let mine = body["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["customer_id"].as_i64(), Some(a_id));
    assert!(mine[0].get("customer").is_none());
    assert_eq!(mine[0]["vehicle"]["registration_number"], "LS-1");

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", admin))
    );
    let all = body["data"].as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["customer"]["email"], "b@example.com");
    assert_eq!(all[1]["customer"]["email"], "a@example.com");
}

#[actix_web::test]
async fn test_guarded_deletes() {
    let app = init_app!(state());
    let (_, admin) = signup_and_login!(app, "admin@example.com", "admin");
    let (customer_id, customer) = signup_and_login!(app, "del@example.com", "customer");
    let vehicle_id = add_vehicle!(app, admin, "DL-1", 50);

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", customer))
            .set_json(json!({
                "customer_id": customer_id,
                "vehicle_id": vehicle_id,
                "rent_start_date": "2030-01-01",
                "rent_end_date": "2030-01-03",
            }))
    );
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let user_uri = format!("/api/v1/users/{}", customer_id);
    let vehicle_uri = format!("/api/v1/vehicles/{}", vehicle_id);

    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&user_uri)
            .insert_header(("Authorization", admin.clone()))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&vehicle_uri)
            .insert_header(("Authorization", admin.clone()))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/bookings/{}", booking_id))
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({"status": "cancelled"}))
    );
    assert_eq!(status, StatusCode::OK);

    for uri in [&user_uri, &vehicle_uri] {
        let (status, body) = send!(
            app,
            test::TestRequest::delete()
                .uri(uri)
                .insert_header(("Authorization", admin.clone()))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&user_uri)
            .insert_header(("Authorization", admin.clone()))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The cancelled booking is kept
    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/bookings")
            .insert_header(("Authorization", admin))
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], "cancelled");
}

#[actix_web::test]
async fn test_user_updates() {
    let app = init_app!(state());
    let (_, admin) = signup_and_login!(app, "admin@example.com", "admin");
    let (me_id, me) = signup_and_login!(app, "self@example.com", "customer");
    let (other_id, _) = signup_and_login!(app, "other@example.com", "customer");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}", me_id))
            .insert_header(("Authorization", me.clone()))
            .set_json(json!({"phone": "555-0999"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], "555-0999");

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}", other_id))
            .insert_header(("Authorization", me.clone()))
            .set_json(json!({"name": "Hijacked"}))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}", me_id))
            .insert_header(("Authorization", me))
            .set_json(json!({"role": "admin"}))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}", other_id))
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({"role": "admin"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/users/9999")
            .insert_header(("Authorization", admin.clone()))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/users/abc")
            .insert_header(("Authorization", admin))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
