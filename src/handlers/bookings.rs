use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, NewBooking, PromoCode, ServiceItem};
use crate::services::{bookings, pricing};
use crate::state::AppState;
use crate::store::collections;

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewBooking>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(bookings::create_booking(&state.store, body)?))
}

// GET /api/bookings?phone=...
#[derive(Deserialize)]
pub struct MyBookingsQuery {
    pub phone: Option<String>,
}

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MyBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let phone = query.phone.as_deref().map(str::trim).unwrap_or("");
    if phone.is_empty() {
        return Err(AppError::Validation(
            "phone query parameter is required".to_string(),
        ));
    }
    Ok(Json(bookings::bookings_for_phone(&state.store, phone)?))
}

// GET /api/bookings/:id
//
// Everything the confirmation page needs in one call: the booking, the
// service and promo it points at, and the price as it stands today.
#[derive(Serialize)]
pub struct BookingDetail {
    booking: Booking,
    service: Option<ServiceItem>,
    promo: Option<PromoCode>,
    price_preview: Option<f64>,
}

pub async fn booking_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingDetail>, AppError> {
    let booking = bookings::get_booking(&state.store, &id)?;

    let service =
        state
            .store
            .get_one_by::<ServiceItem>(collections::SERVICES, "name", &booking.service)?;
    let promo = match booking.promo_code.as_deref() {
        Some(code) if !code.is_empty() => {
            state
                .store
                .get_one_by::<PromoCode>(collections::PROMO_CODES, "code", code)?
        }
        _ => None,
    };

    // Once fixed on the booking the price is authoritative; until then
    // it is computed live against the current catalog.
    let price_preview = match booking.final_price {
        Some(p) => Some(pricing::round2(p)),
        None => pricing::resolve_final_price(&state.store, &booking)?.map(pricing::round2),
    };

    Ok(Json(BookingDetail {
        booking,
        service,
        promo,
        price_preview,
    }))
}

// POST /api/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(bookings::user_confirm_booking(&state.store, &id)?))
}
