//! Public, read-only views of the studio content.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::{GalleryImage, PartnerCondition, ServiceItem, StudioUpdate};
use crate::services::catalog;
use crate::state::AppState;

// GET /api/services
pub async fn get_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceItem>>, AppError> {
    Ok(Json(catalog::list_services(&state.store)?))
}

// GET /api/gallery
pub async fn get_gallery(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GalleryImage>>, AppError> {
    Ok(Json(catalog::list_gallery(&state.store)?))
}

// GET /api/updates
pub async fn get_updates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StudioUpdate>>, AppError> {
    Ok(Json(catalog::list_updates(&state.store)?))
}

// GET /api/partner-conditions
pub async fn get_partner_conditions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PartnerCondition>>, AppError> {
    Ok(Json(catalog::list_conditions(&state.store)?))
}
