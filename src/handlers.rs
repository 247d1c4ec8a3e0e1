use crate::{
    AppState,
    auth::{AdminUser, AuthUser, clear_session_cookie},
    config::Env,
    error::{ApiResult, AppError, ValidationDetails},
    models::{
        ApiSuccess, ApplicationCreated, ContactRequest, ContactStatus, ContactSubmission,
        CreatePricingPackageRequest, CreateReservationRequest, CreateSubscriptionRequest,
        JobApplication, JobApplicationRequest, LogoutResponse, NewContactSubmission,
        NewJobApplication, NewPricingPackage, NewReservation, Notification,
        NotificationPreferences, PricingPackage, Reservation, Subscription,
        UpdateApplicationStatusRequest, UpdateNotificationPreferencesRequest,
        UpdateProfileRequest, UpdateReservationStatusRequest, UpdateRoleRequest, User,
    },
    validation::{ValidatedJson, parse_id, parse_uuid, require},
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;

// Frontend pages re-rendered after the matching admin writes.
const PRICING_PAGE: &str = "/pricing";
const ADMIN_CONTACTS_PAGE: &str = "/admin/contacts";
const ADMIN_CAREERS_PAGE: &str = "/admin/careers";
const ADMIN_RESERVATIONS_PAGE: &str = "/admin/reservations";

// --- Public Handlers ---

/// create_contact
///
/// [Public Route] Stores a contact form submission with status `new`.
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Stored submission, wrapped in { success, data }", body = ContactSubmission),
        (status = 400, description = "Malformed body or validation failure"),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ContactRequest>,
) -> ApiResult<Json<ApiSuccess<ContactSubmission>>> {
    let contact = state.repo.create_contact(NewContactSubmission::try_from(payload)?).await?;
    tracing::info!(contact_id = contact.id, "contact submission received");
    Ok(Json(ApiSuccess::new(contact)))
}

/// apply_for_job
///
/// [Public Route] Stores a job application. Only the new id is returned.
#[utoipa::path(
    post,
    path = "/careers/apply",
    request_body = JobApplicationRequest,
    responses(
        (status = 201, description = "Application stored", body = ApplicationCreated),
        (status = 400, description = "Validation failure with field details")
    )
)]
pub async fn apply_for_job(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<JobApplicationRequest>,
) -> ApiResult<(StatusCode, Json<ApplicationCreated>)> {
    let application = state
        .repo
        .create_application(NewJobApplication::try_from(payload)?)
        .await?;
    tracing::info!(
        application_id = application.id,
        job_id = application.job_id,
        "job application submitted"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApplicationCreated {
            application_id: application.id,
        }),
    ))
}

/// list_packages
///
/// [Public Route] Active pricing packages, cheapest first.
#[utoipa::path(
    get,
    path = "/pricing/packages",
    responses((status = 200, description = "Active packages", body = [PricingPackage]))
)]
pub async fn list_packages(State(state): State<AppState>) -> ApiResult<Json<Vec<PricingPackage>>> {
    let packages = state.repo.list_packages(false).await?;
    Ok(Json(packages))
}

/// create_package
///
/// [Admin Route] Creates a pricing package and revalidates the public pricing page.
/// Mounted next to the public listing, so the admin check happens in the `AdminUser` extractor.
#[utoipa::path(
    post,
    path = "/pricing/packages",
    request_body = CreatePricingPackageRequest,
    responses(
        (status = 201, description = "Created, wrapped in { success, data }", body = PricingPackage),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_package(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePricingPackageRequest>,
) -> ApiResult<(StatusCode, Json<ApiSuccess<PricingPackage>>)> {
    let package = state
        .repo
        .create_package(NewPricingPackage::try_from(payload)?)
        .await?;
    tracing::info!(package_id = package.id, admin_id = %admin.id, "pricing package created");

    state.revalidator.revalidate(PRICING_PAGE);
    Ok((StatusCode::CREATED, Json(ApiSuccess::new(package))))
}

/// logout
///
/// [Public Route] Expires the session cookie. Works with or without a session.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Session cookie cleared", body = LogoutResponse))
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let secure = state.config.env == Env::Production;
    (
        [(header::SET_COOKIE, clear_session_cookie(secure))],
        Json(LogoutResponse { success: true }),
    )
}

// --- Authenticated Handlers ---

/// get_me
///
/// [Authenticated Route] The caller's own user record.
#[utoipa::path(
    get,
    path = "/user/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "No valid session")
    )
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<User>> {
    let user = state.repo.get_user(id).await?.ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

/// update_profile
///
/// [Authenticated Route] Changes the caller's name and/or email. An email already
/// used by another account is a 409.
#[utoipa::path(
    put,
    path = "/user/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .repo
        .update_profile(id, payload)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/user/notifications",
    responses((status = 200, description = "Caller's notifications, newest first", body = [Notification]))
)]
pub async fn get_notifications(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state.repo.list_notifications(id).await?;
    Ok(Json(notifications))
}

/// get_notification_preferences
///
/// [Authenticated Route] Stored switches, or the defaults if the caller never saved any.
#[utoipa::path(
    get,
    path = "/user/notifications/preferences",
    responses((status = 200, description = "Notification preferences", body = NotificationPreferences))
)]
pub async fn get_notification_preferences(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<NotificationPreferences>> {
    let prefs = state.repo.get_notification_preferences(id).await?;
    Ok(Json(prefs))
}

#[utoipa::path(
    put,
    path = "/user/notifications",
    request_body = UpdateNotificationPreferencesRequest,
    responses((status = 200, description = "Saved preferences", body = NotificationPreferences))
)]
pub async fn update_notification_preferences(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateNotificationPreferencesRequest>,
) -> ApiResult<Json<NotificationPreferences>> {
    let prefs = state.repo.update_notification_preferences(id, payload).await?;
    Ok(Json(prefs))
}

/// mark_notification_read
///
/// [Authenticated Route] Owner-only. Someone else's notification is reported as missing.
#[utoipa::path(
    put,
    path = "/user/notifications/{id}/read",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read", body = Notification),
        (status = 400, description = "Non-numeric id"),
        (status = 404, description = "Not found or not owned by caller")
    )
)]
pub async fn mark_notification_read(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Notification>> {
    let id = parse_id(&id)?;
    let notification = state
        .repo
        .mark_notification_read(id, user_id)
        .await?
        .ok_or(AppError::NotFound("Notification"))?;
    Ok(Json(notification))
}

#[utoipa::path(
    get,
    path = "/user/reservations",
    responses((status = 200, description = "Caller's reservations, latest first", body = [Reservation]))
)]
pub async fn list_my_reservations(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Reservation>>> {
    let reservations = state.repo.list_reservations_for_user(id).await?;
    Ok(Json(reservations))
}

/// create_reservation
///
/// [Authenticated Route] Books a table for the caller. Status starts at `pending`.
/// A date before today (UTC) fails validation on the `date` field.
#[utoipa::path(
    post,
    path = "/user/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn create_reservation(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<(StatusCode, Json<Reservation>)> {
    let new = NewReservation::try_from(payload)?;

    let mut details = ValidationDetails::new();
    if new.date < Utc::now().date_naive() {
        details.add("date", "Reservation date cannot be in the past");
    }
    details.into_result()?;

    let reservation = state.repo.create_reservation(user_id, new).await?;
    tracing::info!(
        reservation_id = reservation.id,
        %user_id,
        party_size = reservation.party_size,
        "reservation requested"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// cancel_reservation
///
/// [Authenticated Route] Owner-only cancellation; repeated calls stay `cancelled`.
#[utoipa::path(
    post,
    path = "/user/reservations/{id}/cancel",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Cancelled, wrapped in { success, data }", body = Reservation),
        (status = 404, description = "Not found or not owned by caller")
    )
)]
pub async fn cancel_reservation(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<Reservation>>> {
    let id = parse_id(&id)?;
    let reservation = state
        .repo
        .cancel_reservation(id, user_id)
        .await?
        .ok_or(AppError::NotFound("Reservation"))?;

    state.revalidator.revalidate(ADMIN_RESERVATIONS_PAGE);
    Ok(Json(ApiSuccess::new(reservation)))
}

/// get_subscription
///
/// [Authenticated Route] The caller's active subscription, or `null`.
#[utoipa::path(
    get,
    path = "/user/subscription",
    responses((status = 200, description = "Active subscription, or null if none", body = Subscription))
)]
pub async fn get_subscription(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Option<Subscription>>> {
    let subscription = state.repo.get_active_subscription(id).await?;
    Ok(Json(subscription))
}

/// create_subscription
///
/// [Authenticated Route] Subscribes the caller to an active package.
#[utoipa::path(
    post,
    path = "/user/subscription",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscribed", body = Subscription),
        (status = 404, description = "Unknown or inactive package"),
        (status = 409, description = "An active subscription already exists")
    )
)]
pub async fn create_subscription(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSubscriptionRequest>,
) -> ApiResult<(StatusCode, Json<Subscription>)> {
    let package_id = require(payload.package_id, "packageId", "Package id is required")?;
    let subscription = state
        .repo
        .create_subscription(user_id, package_id)
        .await?
        .ok_or(AppError::NotFound("Pricing package"))?;

    tracing::info!(%user_id, package_id, "subscription started");
    Ok((StatusCode::CREATED, Json(subscription)))
}

#[utoipa::path(
    post,
    path = "/user/subscription/cancel",
    responses(
        (status = 200, description = "Cancelled subscription", body = Subscription),
        (status = 404, description = "No active subscription")
    )
)]
pub async fn cancel_subscription(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Subscription>> {
    let subscription = state
        .repo
        .cancel_subscription(user_id)
        .await?
        .ok_or(AppError::NotFound("Active subscription"))?;

    tracing::info!(%user_id, "subscription cancelled");
    Ok(Json(subscription))
}

// --- Admin Handlers ---
//
// Everything below is mounted under /admin behind `require_admin`.

/// list_contacts
///
/// [Admin Route] All contact submissions, newest first.
#[utoipa::path(
    get,
    path = "/admin/contacts",
    responses(
        (status = 200, description = "Contact submissions", body = [ContactSubmission]),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_contacts(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ContactSubmission>>> {
    let contacts = state.repo.list_contacts().await?;
    Ok(Json(contacts))
}

async fn set_contact_status(
    state: &AppState,
    raw_id: &str,
    status: ContactStatus,
) -> ApiResult<Json<ApiSuccess<ContactSubmission>>> {
    let id = parse_id(raw_id)?;
    let contact = state
        .repo
        .set_contact_status(id, status)
        .await?
        .ok_or(AppError::NotFound("Contact"))?;

    tracing::info!(contact_id = id, status = ?status, "contact status updated");
    state.revalidator.revalidate(ADMIN_CONTACTS_PAGE);
    Ok(Json(ApiSuccess::new(contact)))
}

/// mark_contact_read
///
/// [Admin Route] Sets status `read`. Idempotent; unknown ids are a 404 and change nothing.
#[utoipa::path(
    post,
    path = "/admin/contacts/{id}/mark-as-read",
    params(("id" = i64, Path, description = "Contact submission ID")),
    responses(
        (status = 200, description = "Updated, wrapped in { success, data }", body = ContactSubmission),
        (status = 400, description = "Non-numeric id"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn mark_contact_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<ContactSubmission>>> {
    set_contact_status(&state, &id, ContactStatus::Read).await
}

#[utoipa::path(
    post,
    path = "/admin/contacts/{id}/mark-as-replied",
    params(("id" = i64, Path, description = "Contact submission ID")),
    responses(
        (status = 200, description = "Updated, wrapped in { success, data }", body = ContactSubmission),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn mark_contact_replied(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiSuccess<ContactSubmission>>> {
    set_contact_status(&state, &id, ContactStatus::Replied).await
}

#[utoipa::path(
    get,
    path = "/admin/applications",
    responses((status = 200, description = "Job applications, newest first", body = [JobApplication]))
)]
pub async fn list_applications(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<JobApplication>>> {
    let applications = state.repo.list_applications().await?;
    Ok(Json(applications))
}

/// update_application_status
///
/// [Admin Route] Moves an application through the hiring pipeline.
#[utoipa::path(
    put,
    path = "/admin/applications/{id}/status",
    params(("id" = i64, Path, description = "Application ID")),
    request_body = UpdateApplicationStatusRequest,
    responses(
        (status = 200, description = "Updated, wrapped in { success, data }", body = JobApplication),
        (status = 404, description = "Application not found")
    )
)]
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateApplicationStatusRequest>,
) -> ApiResult<Json<ApiSuccess<JobApplication>>> {
    let id = parse_id(&id)?;
    let application = state
        .repo
        .set_application_status(id, payload.status)
        .await?
        .ok_or(AppError::NotFound("Application"))?;

    tracing::info!(application_id = id, status = ?payload.status, "application status updated");
    state.revalidator.revalidate(ADMIN_CAREERS_PAGE);
    Ok(Json(ApiSuccess::new(application)))
}

#[utoipa::path(
    get,
    path = "/admin/reservations",
    responses((status = 200, description = "All reservations, soonest first", body = [Reservation]))
)]
pub async fn list_reservations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Reservation>>> {
    let reservations = state.repo.list_reservations().await?;
    Ok(Json(reservations))
}

#[utoipa::path(
    put,
    path = "/admin/reservations/{id}/status",
    params(("id" = i64, Path, description = "Reservation ID")),
    request_body = UpdateReservationStatusRequest,
    responses(
        (status = 200, description = "Updated, wrapped in { success, data }", body = Reservation),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn update_reservation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateReservationStatusRequest>,
) -> ApiResult<Json<ApiSuccess<Reservation>>> {
    let id = parse_id(&id)?;
    let reservation = state
        .repo
        .set_reservation_status(id, payload.status)
        .await?
        .ok_or(AppError::NotFound("Reservation"))?;

    tracing::info!(reservation_id = id, status = ?payload.status, "reservation status updated");
    state.revalidator.revalidate(ADMIN_RESERVATIONS_PAGE);
    Ok(Json(ApiSuccess::new(reservation)))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "All users, newest first", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state.repo.list_users().await?;
    Ok(Json(users))
}

/// update_user_role
///
/// [Admin Route] The only way a role changes. Takes effect on the target's next request.
#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    params(("id" = String, Path, description = "User UUID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Not a UUID"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<Json<User>> {
    let id = parse_uuid(&id)?;
    let user = state
        .repo
        .update_user_role(id, payload.role)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    tracing::info!(
        user_id = %id,
        role = payload.role.as_str(),
        admin_id = %admin.id,
        "user role changed"
    );
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/admin/pricing/packages",
    responses((status = 200, description = "All packages including inactive", body = [PricingPackage]))
)]
pub async fn list_all_packages(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PricingPackage>>> {
    let packages = state.repo.list_packages(true).await?;
    Ok(Json(packages))
}
