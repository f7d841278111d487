use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tower::ServiceExt;

use studiobook::config::AppConfig;
use studiobook::state::AppState;
use studiobook::store::{collections, DocStore};

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_token: "test-token".to_string(),
    }
}

fn test_state() -> Arc<AppState> {
    Arc::new(AppState {
        store: DocStore::open(":memory:").unwrap(),
        config: test_config(),
    })
}

fn test_app(state: Arc<AppState>) -> Router {
    studiobook::app(state)
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> axum::response::Response {
    test_app(state.clone()).oneshot(req).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

fn admin_post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

fn admin_post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn seed_service(state: &Arc<AppState>, name: &str, price: &str) {
    state
        .store
        .create(
            collections::SERVICES,
            &json!({"name": name, "description": "Per session", "price": price}),
        )
        .unwrap();
}

fn seed_promo(state: &Arc<AppState>, code: &str, discount: &str) {
    state
        .store
        .create(
            collections::PROMO_CODES,
            &json!({"code": code, "discount": discount}),
        )
        .unwrap();
}

fn booking_payload() -> Value {
    json!({
        "service": "Mixing",
        "date": "2025-09-15T14:00:00",
        "name": "Asha",
        "phone": "5550001111",
    })
}

/// Walks a booking to Confirmed through the public + admin endpoints.
async fn create_and_confirm(state: &Arc<AppState>, payload: Value) -> String {
    let res = send(state, post_json("/api/bookings", payload)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let booking = body_json(res).await;
    let id = booking["id"].as_str().unwrap().to_string();

    let res = send(state, admin_post(&format!("/api/admin/bookings/{id}/confirm"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    id
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let res = send(&state, get("/health")).await;
    assert_eq!(res.status(), StatusCode::OK);
}

// ── Admin auth ──

#[tokio::test]
async fn test_admin_requires_auth() {
    let state = test_state();
    let res = send(&state, get("/api/admin/stats")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_wrong_token() {
    let state = test_state();
    let res = send(
        &state,
        Request::builder()
            .uri("/api/admin/stats")
            .header("Authorization", "Bearer wrong-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

// ── Booking lifecycle ──

#[tokio::test]
async fn test_create_booking_starts_pending() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let res = send(&state, post_json("/api/bookings", booking_payload())).await;
    assert_eq!(res.status(), StatusCode::OK);
    let booking = body_json(res).await;
    assert_eq!(booking["status"], "Pending");
    assert_eq!(booking["final_price"], Value::Null);
    assert!(!booking["id"].as_str().unwrap().is_empty());

    // The booking also recorded the customer.
    let res = send(&state, admin_get("/api/admin/users")).await;
    let users = body_json(res).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["phone"], "5550001111");
    assert_eq!(users[0]["name"], "Asha");
}

#[tokio::test]
async fn test_create_booking_rejects_bad_input() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let mut short_name = booking_payload();
    short_name["name"] = json!("A");
    let res = send(&state, post_json("/api/bookings", short_name)).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mut short_phone = booking_payload();
    short_phone["phone"] = json!("12345");
    let res = send(&state, post_json("/api/bookings", short_phone)).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_admin_confirm_leaves_notification() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let id = create_and_confirm(&state, booking_payload()).await;

    let res = send(&state, get("/api/notifications")).await;
    let notices = body_json(res).await;
    let notices = notices.as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["title"], "Booking Confirmed");
    assert_eq!(notices[0]["read"], false);
    assert_eq!(
        notices[0]["link"],
        json!(format!("/booking-confirmation/{id}"))
    );
}

#[tokio::test]
async fn test_notification_read_is_idempotent() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");
    create_and_confirm(&state, booking_payload()).await;

    let res = send(&state, get("/api/notifications")).await;
    let notices = body_json(res).await;
    let nid = notices[0]["id"].as_str().unwrap().to_string();

    let res = send(&state, post_json(&format!("/api/notifications/{nid}/read"), json!({}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = send(&state, post_json(&format!("/api/notifications/{nid}/read"), json!({}))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(&state, get("/api/notifications")).await;
    let notices = body_json(res).await;
    assert_eq!(notices[0]["read"], true);

    let res = send(&state, post_json("/api/notifications/nope/read", json!({}))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_referral_flow() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");
    seed_promo(&state, "SAVE10", "10%");

    // Partner applies and gets approved.
    let res = send(
        &state,
        post_json("/api/partners/request", json!({"contact": "9990001111"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let partner = body_json(res).await;
    let partner_id = partner["id"].as_str().unwrap().to_string();
    assert_eq!(partner["status"], "Pending");

    let res = send(
        &state,
        admin_post_json(
            &format!("/api/admin/partners/{partner_id}/status"),
            json!({"status": "Approved"}),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Customer books through the partner's link with a promo code.
    let mut payload = booking_payload();
    payload["promo_code"] = json!("SAVE10");
    payload["ref"] = json!("9990001111");
    let id = create_and_confirm(&state, payload).await;

    // Customer reviews the price and confirms.
    let res = send(&state, get(&format!("/api/bookings/{id}"))).await;
    let detail = body_json(res).await;
    assert_eq!(detail["price_preview"], json!(225.0));
    assert_eq!(detail["service"]["name"], "Mixing");
    assert_eq!(detail["promo"]["discount"], "10%");

    let res = send(&state, post_json(&format!("/api/bookings/{id}/confirm"), json!({}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let booking = body_json(res).await;
    assert_eq!(booking["status"], "UserConfirmed");
    assert_eq!(booking["final_price"], json!(225.0));

    // Admin completes; the partner earns 10% of the final price.
    let res = send(&state, admin_post(&format!("/api/admin/bookings/{id}/complete"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let booking = body_json(res).await;
    assert_eq!(booking["status"], "Completed");
    assert_eq!(booking["partner_earning"], json!(22.5));

    let res = send(&state, get(&format!("/api/partners/{partner_id}/referrals"))).await;
    let dashboard = body_json(res).await;
    assert_eq!(dashboard["total_earnings"], json!(22.5));
    assert_eq!(dashboard["referral_count"], json!(1));
    assert_eq!(dashboard["completed_count"], json!(1));
    assert_eq!(dashboard["bookings"][0]["id"], json!(id));

    // Completing again cannot double-pay.
    let res = send(&state, admin_post(&format!("/api/admin/bookings/{id}/complete"))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let res = send(&state, get(&format!("/api/partners/{partner_id}/referrals"))).await;
    let dashboard = body_json(res).await;
    assert_eq!(dashboard["total_earnings"], json!(22.5));
}

#[tokio::test]
async fn test_user_confirm_blocked_when_service_gone() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");
    let id = create_and_confirm(&state, booking_payload()).await;

    let service: Value = state
        .store
        .get_one_by(collections::SERVICES, "name", "Mixing")
        .unwrap()
        .unwrap();
    state
        .store
        .delete(collections::SERVICES, service["id"].as_str().unwrap())
        .unwrap();

    let res = send(&state, post_json(&format!("/api/bookings/{id}/confirm"), json!({}))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The booking did not move.
    let res = send(&state, get(&format!("/api/bookings/{id}"))).await;
    let detail = body_json(res).await;
    assert_eq!(detail["booking"]["status"], "Confirmed");
    assert_eq!(detail["price_preview"], Value::Null);
}

#[tokio::test]
async fn test_complete_from_pending_is_conflict() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let res = send(&state, post_json("/api/bookings", booking_payload())).await;
    let booking = body_json(res).await;
    let id = booking["id"].as_str().unwrap();

    let res = send(&state, admin_post(&format!("/api/admin/bookings/{id}/complete"))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_keeps_booking_visible() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let res = send(&state, post_json("/api/bookings", booking_payload())).await;
    let booking = body_json(res).await;
    let id = booking["id"].as_str().unwrap().to_string();

    let res = send(&state, admin_post(&format!("/api/admin/bookings/{id}/cancel"))).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Still there for the customer and the admin, now Cancelled.
    let res = send(&state, get("/api/bookings?phone=5550001111")).await;
    let mine = body_json(res).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["status"], "Cancelled");

    let res = send(&state, admin_get("/api/admin/bookings?status=Cancelled")).await;
    let listed = body_json(res).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_my_bookings_requires_phone() {
    let state = test_state();
    let res = send(&state, get("/api/bookings")).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ── Pricing through the API ──

#[tokio::test]
async fn test_unknown_promo_is_ignored() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let mut payload = booking_payload();
    payload["promo_code"] = json!("NOPE");
    let id = create_and_confirm(&state, payload).await;

    let res = send(&state, get(&format!("/api/bookings/{id}"))).await;
    let detail = body_json(res).await;
    assert_eq!(detail["price_preview"], json!(250.0));
    assert_eq!(detail["promo"], Value::Null);
}

#[tokio::test]
async fn test_absolute_discount_clamps_to_zero() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");
    seed_promo(&state, "FLAT500", "₹500");

    let mut payload = booking_payload();
    payload["promo_code"] = json!("FLAT500");
    let id = create_and_confirm(&state, payload).await;

    let res = send(&state, post_json(&format!("/api/bookings/{id}/confirm"), json!({}))).await;
    let booking = body_json(res).await;
    assert_eq!(booking["final_price"], json!(0.0));
}

// ── Partners ──

#[tokio::test]
async fn test_duplicate_partner_request_conflict() {
    let state = test_state();

    let res = send(
        &state,
        post_json("/api/partners/request", json!({"contact": "9990001111"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(
        &state,
        post_json("/api/partners/request", json!({"contact": "9990001111"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = send(
        &state,
        post_json("/api/partners/request", json!({"contact": "not-a-number"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unapproved_referral_is_dropped() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let res = send(
        &state,
        post_json("/api/partners/request", json!({"contact": "9990001111"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Partner is still Pending, so the referral must not stick.
    let mut payload = booking_payload();
    payload["ref"] = json!("9990001111");
    let res = send(&state, post_json("/api/bookings", payload)).await;
    let booking = body_json(res).await;
    assert_eq!(booking["partner_id"], Value::Null);
    assert_eq!(booking["partner_contact"], Value::Null);
}

#[tokio::test]
async fn test_partner_status_check_flow() {
    let state = test_state();

    let res = send(&state, get("/api/partners/status?contact=9990001111")).await;
    let status = body_json(res).await;
    assert_eq!(status["partner"], Value::Null);

    let res = send(
        &state,
        post_json(
            "/api/partners/request",
            json!({"contact": "9990001111", "message": "club events"}),
        ),
    )
    .await;
    let partner = body_json(res).await;
    let partner_id = partner["id"].as_str().unwrap().to_string();

    let res = send(&state, get("/api/partners/status?contact=9990001111")).await;
    let status = body_json(res).await;
    assert_eq!(status["partner"]["status"], "Pending");

    let res = send(
        &state,
        admin_post_json(
            &format!("/api/admin/partners/{partner_id}/status"),
            json!({"status": "Rejected", "message": "not this season"}),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(&state, get("/api/partners/status?contact=9990001111")).await;
    let status = body_json(res).await;
    assert_eq!(status["partner"]["status"], "Rejected");
    assert_eq!(status["partner"]["message"], "not this season");
}

// ── Admin stats ──

#[tokio::test]
async fn test_admin_stats_counts() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let res = send(&state, post_json("/api/bookings", booking_payload())).await;
    let booking = body_json(res).await;
    let id = booking["id"].as_str().unwrap().to_string();
    send(&state, admin_post(&format!("/api/admin/bookings/{id}/cancel"))).await;

    let mut second = booking_payload();
    second["phone"] = json!("5550002222");
    create_and_confirm(&state, second).await;

    send(
        &state,
        post_json("/api/partners/request", json!({"contact": "9990001111"})),
    )
    .await;

    let res = send(&state, admin_get("/api/admin/stats")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let stats = body_json(res).await;
    assert_eq!(stats["total_bookings"], json!(2));
    assert_eq!(stats["cancelled_bookings"], json!(1));
    assert_eq!(stats["confirmed_bookings"], json!(1));
    assert_eq!(stats["pending_partners"], json!(1));
    assert_eq!(stats["unread_notifications"], json!(1));
}

// ── Catalog administration ──

#[tokio::test]
async fn test_service_crud_and_name_uniqueness() {
    let state = test_state();

    let res = send(
        &state,
        admin_post_json(
            "/api/admin/services",
            json!({"name": "Mixing", "description": "Per track", "price": "$250"}),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let service = body_json(res).await;
    let id = service["id"].as_str().unwrap().to_string();

    let res = send(
        &state,
        admin_post_json(
            "/api/admin/services",
            json!({"name": "Mixing", "description": "again", "price": "$99"}),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = send(
        &state,
        admin_put_json(&format!("/api/admin/services/{id}"), json!({"price": "$300"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let service = body_json(res).await;
    assert_eq!(service["price"], "$300");
    assert_eq!(service["name"], "Mixing");

    let res = send(&state, get("/api/services")).await;
    let services = body_json(res).await;
    assert_eq!(services.as_array().unwrap().len(), 1);

    let res = send(&state, admin_delete(&format!("/api/admin/services/{id}"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = send(&state, get("/api/services")).await;
    let services = body_json(res).await;
    assert_eq!(services.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_content_endpoints_roundtrip() {
    let state = test_state();

    let res = send(
        &state,
        admin_post_json("/api/admin/gallery", json!({"src": "/shots/live.jpg", "alt": "Live room"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(
        &state,
        admin_post_json(
            "/api/admin/updates",
            json!({"title": "New console", "description": "SSL arrived"}),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let update = body_json(res).await;
    let update_id = update["id"].as_str().unwrap().to_string();

    let res = send(
        &state,
        admin_put_json(
            &format!("/api/admin/updates/{update_id}"),
            json!({"title": "New console installed"}),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(
        &state,
        admin_post_json("/api/admin/conditions", json!({"text": "10% of completed bookings"})),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(&state, get("/api/gallery")).await;
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);
    let res = send(&state, get("/api/updates")).await;
    let updates = body_json(res).await;
    assert_eq!(updates[0]["title"], "New console installed");
    let res = send(&state, get("/api/partner-conditions")).await;
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);
}

// ── Live feeds ──

#[tokio::test]
async fn test_events_snapshot_first_frame() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    let res = send(&state, post_json("/api/bookings", booking_payload())).await;
    let booking = body_json(res).await;
    let id = booking["id"].as_str().unwrap().to_string();

    let res = send(&state, get("/api/events/bookings?phone=5550001111")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let mut stream = res.into_body().into_data_stream();
    let mut collected = String::new();
    for _ in 0..5 {
        if collected.contains("event: snapshot") && collected.contains(&id) {
            break;
        }
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("stream produced no frame in time")
            .expect("stream ended early")
            .unwrap();
        collected.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert!(collected.contains("event: snapshot"), "got: {collected}");
    assert!(collected.contains(&id), "got: {collected}");
}

#[tokio::test]
async fn test_events_filter_excludes_other_phones() {
    let state = test_state();
    seed_service(&state, "Mixing", "$250");

    send(&state, post_json("/api/bookings", booking_payload())).await;
    let mut other = booking_payload();
    other["phone"] = json!("5550009999");
    other["name"] = json!("Ravi");
    let res = send(&state, post_json("/api/bookings", other)).await;
    let other_booking = body_json(res).await;
    let other_id = other_booking["id"].as_str().unwrap().to_string();

    let res = send(&state, get("/api/events/bookings?phone=5550001111")).await;
    let mut stream = res.into_body().into_data_stream();
    let mut collected = String::new();
    for _ in 0..5 {
        if collected.contains("event: snapshot") {
            break;
        }
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("stream produced no frame in time")
            .expect("stream ended early")
            .unwrap();
        collected.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert!(collected.contains("5550001111"), "got: {collected}");
    assert!(!collected.contains(&other_id), "got: {collected}");
}

#[tokio::test]
async fn test_events_rejects_unknown_and_private_collections() {
    let state = test_state();

    let res = send(&state, get("/api/events/nope")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The customer list is not streamable.
    let res = send(&state, get("/api/events/users")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
