pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full route table. Shared between the binary and the integration
/// tests so both run the same app.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Public catalog
        .route("/api/services", get(handlers::catalog::get_services))
        .route("/api/gallery", get(handlers::catalog::get_gallery))
        .route("/api/updates", get(handlers::catalog::get_updates))
        .route(
            "/api/partner-conditions",
            get(handlers::catalog::get_partner_conditions),
        )
        // Bookings
        .route(
            "/api/bookings",
            post(handlers::bookings::create_booking).get(handlers::bookings::my_bookings),
        )
        .route("/api/bookings/:id", get(handlers::bookings::booking_detail))
        .route(
            "/api/bookings/:id/confirm",
            post(handlers::bookings::confirm_booking),
        )
        // Notifications
        .route(
            "/api/notifications",
            get(handlers::notifications::get_notifications),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::notifications::mark_read),
        )
        // Partners
        .route(
            "/api/partners/request",
            post(handlers::partners::request_access),
        )
        .route(
            "/api/partners/status",
            get(handlers::partners::partner_status),
        )
        .route(
            "/api/partners/:id/referrals",
            get(handlers::partners::referral_dashboard),
        )
        // Live feeds
        .route(
            "/api/events/:collection",
            get(handlers::events::collection_stream),
        )
        // Admin
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/:id/confirm",
            post(handlers::admin::confirm_booking),
        )
        .route(
            "/api/admin/bookings/:id/complete",
            post(handlers::admin::complete_booking),
        )
        .route(
            "/api/admin/bookings/:id/cancel",
            post(handlers::admin::cancel_booking),
        )
        .route("/api/admin/services", post(handlers::admin::create_service))
        .route(
            "/api/admin/services/:id",
            put(handlers::admin::update_service).delete(handlers::admin::delete_service),
        )
        .route(
            "/api/admin/promos",
            get(handlers::admin::get_promos).post(handlers::admin::create_promo),
        )
        .route(
            "/api/admin/promos/:id",
            delete(handlers::admin::delete_promo),
        )
        .route("/api/admin/partners", get(handlers::admin::get_partners))
        .route(
            "/api/admin/partners/:id/status",
            post(handlers::admin::set_partner_status),
        )
        .route(
            "/api/admin/gallery",
            post(handlers::admin::add_gallery_image),
        )
        .route(
            "/api/admin/gallery/:id",
            delete(handlers::admin::delete_gallery_image),
        )
        .route("/api/admin/updates", post(handlers::admin::create_update))
        .route(
            "/api/admin/updates/:id",
            put(handlers::admin::edit_update).delete(handlers::admin::delete_update),
        )
        .route(
            "/api/admin/conditions",
            post(handlers::admin::create_condition),
        )
        .route(
            "/api/admin/conditions/:id",
            put(handlers::admin::edit_condition).delete(handlers::admin::delete_condition),
        )
        .route("/api/admin/users", get(handlers::admin::get_users))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
