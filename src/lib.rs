use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod revalidation;
pub mod validation;

// Routing split by access level (public, authenticated, admin).
pub mod routes;
use auth::{AuthUser, SessionKeys};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiResult, AppError};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use revalidation::{HttpRevalidator, NoopRevalidator, RecordingRevalidator, RevalidationState};

/// ApiDoc
///
/// OpenAPI document generated from the `#[utoipa::path]` handlers and the
/// `ToSchema` models. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_contact, handlers::apply_for_job, handlers::list_packages,
        handlers::create_package, handlers::logout,
        handlers::get_me, handlers::update_profile, handlers::get_notifications,
        handlers::get_notification_preferences, handlers::update_notification_preferences,
        handlers::mark_notification_read, handlers::list_my_reservations,
        handlers::create_reservation, handlers::cancel_reservation,
        handlers::get_subscription, handlers::create_subscription, handlers::cancel_subscription,
        handlers::list_contacts, handlers::mark_contact_read, handlers::mark_contact_replied,
        handlers::list_applications, handlers::update_application_status,
        handlers::list_reservations, handlers::update_reservation_status,
        handlers::list_users, handlers::update_user_role, handlers::list_all_packages
    ),
    components(
        schemas(
            models::Role, models::ContactStatus, models::ApplicationStatus,
            models::BillingCycle, models::ReservationStatus, models::SubscriptionStatus,
            models::User, models::ContactSubmission, models::JobApplication,
            models::PricingPackage, models::Reservation, models::Notification,
            models::NotificationPreferences, models::Subscription,
            models::ContactRequest, models::JobApplicationRequest,
            models::CreatePricingPackageRequest, models::UpdateProfileRequest,
            models::UpdateNotificationPreferencesRequest, models::CreateReservationRequest,
            models::CreateSubscriptionRequest, models::UpdateApplicationStatusRequest,
            models::UpdateReservationStatusRequest, models::UpdateRoleRequest,
            models::ApplicationCreated, models::LogoutResponse,
        )
    ),
    tags(
        (name = "restaurant-portal", description = "Restaurant Portal API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single shared state handed to every handler. Cheap to clone: every
/// service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence gateway (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// Fire-and-forget page revalidation for the frontend.
    pub revalidator: RevalidationState,
    /// Session token keys derived from `JWT_SECRET`.
    pub sessions: SessionKeys,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, revalidator: RevalidationState, config: AppConfig) -> Self {
        let sessions = SessionKeys::new(&config.jwt_secret, config.session_ttl_hours);
        Self {
            repo,
            revalidator,
            sessions,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for RevalidationState {
    fn from_ref(app_state: &AppState) -> RevalidationState {
        app_state.revalidator.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(app_state: &AppState) -> SessionKeys {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with 401 unless the `AuthUser` extractor resolves a
/// live user from the session cookie.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the public, authenticated and admin routers, the docs, and the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin Routes: 401 without a session, 403 unless the stored role is admin.
        .nest(
            "/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin)),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying the request id, so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
