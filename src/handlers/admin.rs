//! Operator endpoints. Everything here is behind the admin bearer token.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{
    Booking, BookingStatus, Customer, GalleryImage, NewGalleryImage, NewPromoCode, NewService,
    NewStudioUpdate, Notification, Partner, PartnerCondition, PartnerStatus, PromoCode,
    ServiceItem, ServiceUpdate, StudioUpdate, StudioUpdatePatch,
};
use crate::services::{bookings, catalog, customers, partners};
use crate::state::AppState;
use crate::store::collections;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// ── Dashboard ─────────────────────────────────────────────

// GET /api/admin/stats
#[derive(Serialize)]
pub struct StatsResponse {
    total_bookings: usize,
    pending_bookings: usize,
    confirmed_bookings: usize,
    user_confirmed_bookings: usize,
    completed_bookings: usize,
    cancelled_bookings: usize,
    pending_partners: usize,
    unread_notifications: usize,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let all: Vec<Booking> = state.store.list(collections::BOOKINGS)?;
    let count = |status: BookingStatus| all.iter().filter(|b| b.status == status).count();

    let partners: Vec<Partner> = state.store.list(collections::PARTNERS)?;
    let notices: Vec<Notification> = state.store.list(collections::NOTIFICATIONS)?;

    Ok(Json(StatsResponse {
        total_bookings: all.len(),
        pending_bookings: count(BookingStatus::Pending),
        confirmed_bookings: count(BookingStatus::Confirmed),
        user_confirmed_bookings: count(BookingStatus::UserConfirmed),
        completed_bookings: count(BookingStatus::Completed),
        cancelled_bookings: count(BookingStatus::Cancelled),
        pending_partners: partners
            .iter()
            .filter(|p| p.status == PartnerStatus::Pending)
            .count(),
        unread_notifications: notices.iter().filter(|n| !n.read).count(),
    }))
}

// ── Bookings ──────────────────────────────────────────────

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<BookingStatus>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(bookings::list_bookings(&state.store, query.status)?))
}

// POST /api/admin/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(bookings::confirm_booking(&state.store, &id)?))
}

// POST /api/admin/bookings/:id/complete
pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(bookings::complete_booking(&state.store, &id)?))
}

// POST /api/admin/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(bookings::cancel_booking(&state.store, &id)?))
}

// ── Services ──────────────────────────────────────────────

// POST /api/admin/services
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewService>,
) -> Result<Json<ServiceItem>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::create_service(&state.store, body)?))
}

// PUT /api/admin/services/:id
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ServiceUpdate>,
) -> Result<Json<ServiceItem>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::update_service(&state.store, &id, body)?))
}

// DELETE /api/admin/services/:id
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    catalog::delete_service(&state.store, &id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// ── Promo codes ───────────────────────────────────────────

// GET /api/admin/promos
pub async fn get_promos(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PromoCode>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::list_promos(&state.store)?))
}

// POST /api/admin/promos
pub async fn create_promo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewPromoCode>,
) -> Result<Json<PromoCode>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::create_promo(&state.store, body)?))
}

// DELETE /api/admin/promos/:id
pub async fn delete_promo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    catalog::delete_promo(&state.store, &id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// ── Partners ──────────────────────────────────────────────

// GET /api/admin/partners
pub async fn get_partners(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Partner>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(partners::list_partners(&state.store)?))
}

// POST /api/admin/partners/:id/status
#[derive(Deserialize)]
pub struct SetPartnerStatusRequest {
    pub status: PartnerStatus,
    pub message: Option<String>,
}

pub async fn set_partner_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<SetPartnerStatusRequest>,
) -> Result<Json<Partner>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(partners::set_status(
        &state.store,
        &id,
        body.status,
        body.message,
    )?))
}

// ── Gallery ───────────────────────────────────────────────

// POST /api/admin/gallery
pub async fn add_gallery_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewGalleryImage>,
) -> Result<Json<GalleryImage>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::add_gallery_image(&state.store, body)?))
}

// DELETE /api/admin/gallery/:id
pub async fn delete_gallery_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    catalog::delete_gallery_image(&state.store, &id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// ── Studio updates ────────────────────────────────────────

// POST /api/admin/updates
pub async fn create_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewStudioUpdate>,
) -> Result<Json<StudioUpdate>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::create_update(&state.store, body)?))
}

// PUT /api/admin/updates/:id
pub async fn edit_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StudioUpdatePatch>,
) -> Result<Json<StudioUpdate>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::edit_update(&state.store, &id, body)?))
}

// DELETE /api/admin/updates/:id
pub async fn delete_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    catalog::delete_update(&state.store, &id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// ── Partner conditions ────────────────────────────────────

#[derive(Deserialize)]
pub struct ConditionRequest {
    pub text: String,
}

// POST /api/admin/conditions
pub async fn create_condition(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ConditionRequest>,
) -> Result<Json<PartnerCondition>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::create_condition(&state.store, &body.text)?))
}

// PUT /api/admin/conditions/:id
pub async fn edit_condition(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ConditionRequest>,
) -> Result<Json<PartnerCondition>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(catalog::edit_condition(&state.store, &id, &body.text)?))
}

// DELETE /api/admin/conditions/:id
pub async fn delete_condition(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    catalog::delete_condition(&state.store, &id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// ── Customers ─────────────────────────────────────────────

// GET /api/admin/users
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Customer>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(customers::list(&state.store)?))
}
