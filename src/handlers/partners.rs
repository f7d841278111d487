use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Partner};
use crate::services::partners;
use crate::state::AppState;

// POST /api/partners/request
#[derive(Deserialize)]
pub struct PartnerRequest {
    pub contact: String,
    pub message: Option<String>,
}

pub async fn request_access(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PartnerRequest>,
) -> Result<Json<Partner>, AppError> {
    Ok(Json(partners::request_access(
        &state.store,
        &body.contact,
        body.message,
    )?))
}

// GET /api/partners/status?contact=...
//
// `partner` is null while no request exists for the contact, so the
// page can tell "never applied" apart from pending or rejected.
#[derive(Deserialize)]
pub struct StatusQuery {
    pub contact: Option<String>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    partner: Option<Partner>,
}

pub async fn partner_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, AppError> {
    let contact = query.contact.as_deref().map(str::trim).unwrap_or("");
    if contact.is_empty() {
        return Err(AppError::Validation(
            "contact query parameter is required".to_string(),
        ));
    }
    let partner = partners::resolve_by_contact(&state.store, contact)?;
    Ok(Json(StatusResponse { partner }))
}

// GET /api/partners/:id/referrals
#[derive(Serialize)]
pub struct PartnerDashboard {
    partner: Partner,
    bookings: Vec<Booking>,
    referral_count: usize,
    completed_count: usize,
    total_earnings: f64,
}

pub async fn referral_dashboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PartnerDashboard>, AppError> {
    let (partner, bookings) = partners::referral_dashboard(&state.store, &id)?;
    let completed_count = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Completed)
        .count();
    Ok(Json(PartnerDashboard {
        referral_count: bookings.len(),
        completed_count,
        total_earnings: partner.earnings,
        partner,
        bookings,
    }))
}
