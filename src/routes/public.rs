use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: the marketing site's forms, the
/// public pricing list and logout.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // POST /contact
        // Contact form. Stored with status `new`.
        .route("/contact", post(handlers::create_contact))
        // POST /careers/apply
        .route("/careers/apply", post(handlers::apply_for_job))
        // GET /pricing/packages is public; POST on the same path needs an admin,
        // enforced by the `AdminUser` extractor in the handler signature.
        .route(
            "/pricing/packages",
            get(handlers::list_packages).post(handlers::create_package),
        )
        // POST /auth/logout
        // Clears the session cookie whether or not one was sent.
        .route("/auth/logout", post(handlers::logout))
}
