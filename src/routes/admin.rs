use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Moderation endpoints for staff. Nested under `/admin` and wrapped in
/// `require_admin` by `create_router`, so no handler here runs unless the
/// caller's stored role is `admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Contact inbox ---
        .route("/contacts", get(handlers::list_contacts))
        .route(
            "/contacts/{id}/mark-as-read",
            post(handlers::mark_contact_read),
        )
        .route(
            "/contacts/{id}/mark-as-replied",
            post(handlers::mark_contact_replied),
        )
        // --- Careers ---
        .route("/applications", get(handlers::list_applications))
        .route(
            "/applications/{id}/status",
            put(handlers::update_application_status),
        )
        // --- Reservations ---
        .route("/reservations", get(handlers::list_reservations))
        .route(
            "/reservations/{id}/status",
            put(handlers::update_reservation_status),
        )
        // --- Users ---
        .route("/users", get(handlers::list_users))
        .route("/users/{id}/role", put(handlers::update_user_role))
        // --- Pricing ---
        // Includes packages staged as inactive.
        .route("/pricing/packages", get(handlers::list_all_packages))
}
