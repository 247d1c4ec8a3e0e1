use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// The signed-in customer's own data under `/user`. The router is wrapped in
/// `auth_middleware`, and every handler also takes `AuthUser` so reads and
/// writes are scoped to the caller's id.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Profile ---
        .route("/user/me", get(handlers::get_me))
        .route("/user/profile", put(handlers::update_profile))
        // --- Notifications ---
        // GET lists the inbox, PUT saves the preference switches.
        .route(
            "/user/notifications",
            get(handlers::get_notifications).put(handlers::update_notification_preferences),
        )
        .route(
            "/user/notifications/preferences",
            get(handlers::get_notification_preferences),
        )
        .route(
            "/user/notifications/{id}/read",
            put(handlers::mark_notification_read),
        )
        // --- Reservations ---
        .route(
            "/user/reservations",
            get(handlers::list_my_reservations).post(handlers::create_reservation),
        )
        .route(
            "/user/reservations/{id}/cancel",
            post(handlers::cancel_reservation),
        )
        // --- Subscription ---
        // At most one active subscription per user; a second POST is a 409.
        .route(
            "/user/subscription",
            get(handlers::get_subscription).post(handlers::create_subscription),
        )
        .route(
            "/user/subscription/cancel",
            post(handlers::cancel_subscription),
        )
}
