mod common;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, NaiveTime, Utc};
use common::TestContext;
use restaurant_portal::{
    AppError,
    auth::{AdminUser, AuthUser},
    handlers,
    models::{
        ApplicationStatus, ContactRequest, ContactStatus, CreatePricingPackageRequest,
        CreateReservationRequest, CreateSubscriptionRequest, JobApplicationRequest,
        ReservationStatus, Role, SubscriptionStatus, UpdateApplicationStatusRequest,
        UpdateNotificationPreferencesRequest, UpdateProfileRequest, UpdateReservationStatusRequest,
        UpdateRoleRequest,
    },
    validation::ValidatedJson,
};
use tokio::test;

fn reservation_request(days_from_today: i64) -> CreateReservationRequest {
    CreateReservationRequest {
        date: Some(Utc::now().date_naive() + Duration::days(days_from_today)),
        time: NaiveTime::from_hms_opt(19, 30, 0),
        party_size: Some(4),
        special_requests: Some("Window seat".into()),
    }
}

#[test]
async fn test_create_reservation_and_cancel_as_owner_only() {
    let ctx = TestContext::new();
    let owner: AuthUser = ctx.seed_user(Role::User).into();
    let stranger: AuthUser = ctx.seed_user(Role::User).into();

    let (status, Json(reservation)) = handlers::create_reservation(
        owner.clone(),
        State(ctx.state.clone()),
        ValidatedJson(reservation_request(3)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.user_id, owner.id);

    // Someone else's reservation looks like a missing one.
    let err = handlers::cancel_reservation(
        stranger,
        State(ctx.state.clone()),
        Path(reservation.id.to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let Json(cancelled) = handlers::cancel_reservation(
        owner.clone(),
        State(ctx.state.clone()),
        Path(reservation.id.to_string()),
    )
    .await
    .unwrap();
    assert_eq!(cancelled.data.status, ReservationStatus::Cancelled);

    let Json(mine) = handlers::list_my_reservations(owner, State(ctx.state.clone()))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
}

#[test]
async fn test_reservation_in_the_past_fails_validation() {
    let ctx = TestContext::new();
    let user: AuthUser = ctx.seed_user(Role::User).into();

    let err = handlers::create_reservation(
        user,
        State(ctx.state.clone()),
        ValidatedJson(reservation_request(-1)),
    )
    .await
    .unwrap_err();

    match err {
        AppError::Validation(details) => assert!(details.contains("date")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
async fn test_notification_preferences_default_then_partial_update() {
    let ctx = TestContext::new();
    let user: AuthUser = ctx.seed_user(Role::User).into();

    let Json(defaults) =
        handlers::get_notification_preferences(user.clone(), State(ctx.state.clone()))
            .await
            .unwrap();
    assert!(defaults.email_notifications);
    assert!(!defaults.marketing_emails);

    let Json(saved) = handlers::update_notification_preferences(
        user.clone(),
        State(ctx.state.clone()),
        ValidatedJson(UpdateNotificationPreferencesRequest {
            marketing_emails: Some(true),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert!(saved.marketing_emails);
    // Untouched switches keep their default.
    assert!(saved.email_notifications);
    assert!(saved.reservation_reminders);

    let Json(reloaded) = handlers::get_notification_preferences(user, State(ctx.state.clone()))
        .await
        .unwrap();
    assert!(reloaded.marketing_emails);
}

#[test]
async fn test_mark_notification_read_is_owner_only() {
    let ctx = TestContext::new();
    let owner: AuthUser = ctx.seed_user(Role::User).into();
    let other: AuthUser = ctx.seed_user(Role::User).into();
    let notification = ctx.repo.seed_notification(owner.id, "Confirmed", "See you at 7");

    let err = handlers::mark_notification_read(
        other,
        State(ctx.state.clone()),
        Path(notification.id.to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let Json(read) = handlers::mark_notification_read(
        owner.clone(),
        State(ctx.state.clone()),
        Path(notification.id.to_string()),
    )
    .await
    .unwrap();
    assert!(read.is_read);

    let err = handlers::mark_notification_read(owner, State(ctx.state.clone()), Path("abc".into()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[test]
async fn test_update_profile_email_conflict() {
    let ctx = TestContext::new();
    let taken = ctx.seed_user(Role::User);
    let user: AuthUser = ctx.seed_user(Role::User).into();

    let err = handlers::update_profile(
        user.clone(),
        State(ctx.state.clone()),
        ValidatedJson(UpdateProfileRequest {
            name: None,
            email: Some(taken.email.clone()),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let Json(updated) = handlers::update_profile(
        user,
        State(ctx.state.clone()),
        ValidatedJson(UpdateProfileRequest {
            name: Some("Renamed".into()),
            email: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.role, Role::User);
}

#[test]
async fn test_application_status_update_revalidates_careers_page() {
    let ctx = TestContext::new();

    let (_, Json(created)) = handlers::apply_for_job(
        State(ctx.state.clone()),
        ValidatedJson(JobApplicationRequest {
            job_id: Some(3),
            full_name: Some("Line Cook".into()),
            email: Some("cook@example.com".into()),
            resume_url: Some("https://example.com/cv.pdf".into()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    let Json(updated) = handlers::update_application_status(
        State(ctx.state.clone()),
        Path(created.application_id.to_string()),
        ValidatedJson(UpdateApplicationStatusRequest {
            status: ApplicationStatus::Interviewed,
        }),
    )
    .await
    .unwrap();
    assert!(updated.success);
    assert_eq!(updated.data.status, ApplicationStatus::Interviewed);
    assert_eq!(ctx.revalidator.paths(), vec!["/admin/careers"]);

    let err = handlers::update_application_status(
        State(ctx.state.clone()),
        Path("999".into()),
        ValidatedJson(UpdateApplicationStatusRequest {
            status: ApplicationStatus::Hired,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Application")));
    assert_eq!(ctx.revalidator.paths().len(), 1);
}

#[test]
async fn test_reservation_status_update_by_admin() {
    let ctx = TestContext::new();
    let user: AuthUser = ctx.seed_user(Role::User).into();

    let (_, Json(reservation)) = handlers::create_reservation(
        user,
        State(ctx.state.clone()),
        ValidatedJson(reservation_request(1)),
    )
    .await
    .unwrap();

    let Json(updated) = handlers::update_reservation_status(
        State(ctx.state.clone()),
        Path(reservation.id.to_string()),
        ValidatedJson(UpdateReservationStatusRequest {
            status: ReservationStatus::Confirmed,
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.data.status, ReservationStatus::Confirmed);
    assert_eq!(ctx.revalidator.paths(), vec!["/admin/reservations"]);

    let Json(all) = handlers::list_reservations(State(ctx.state.clone()))
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
async fn test_role_change_and_invalid_user_id() {
    let ctx = TestContext::new();
    let admin: AuthUser = ctx.seed_user(Role::Admin).into();
    let target = ctx.seed_user(Role::User);

    let Json(promoted) = handlers::update_user_role(
        AdminUser(admin.clone()),
        State(ctx.state.clone()),
        Path(target.id.to_string()),
        ValidatedJson(UpdateRoleRequest { role: Role::Admin }),
    )
    .await
    .unwrap();
    assert_eq!(promoted.role, Role::Admin);

    let err = handlers::update_user_role(
        AdminUser(admin),
        State(ctx.state.clone()),
        Path("42".into()),
        ValidatedJson(UpdateRoleRequest { role: Role::User }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[test]
async fn test_inactive_packages_only_listed_for_admins() {
    let ctx = TestContext::new();
    let admin: AuthUser = ctx.seed_user(Role::Admin).into();

    for (name, price, active) in [("Staged", 5.0, false), ("Live", 25.0, true)] {
        handlers::create_package(
            AdminUser(admin.clone()),
            State(ctx.state.clone()),
            ValidatedJson(CreatePricingPackageRequest {
                name: Some(name.into()),
                price: Some(price),
                is_active: Some(active),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    }

    let Json(public) = handlers::list_packages(State(ctx.state.clone())).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].name, "Live");

    let Json(all) = handlers::list_all_packages(State(ctx.state.clone())).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Staged");
}

#[test]
async fn test_persistence_error_response_hides_detail() {
    let ctx = TestContext::new();
    ctx.repo.set_unavailable(true);

    let err = handlers::list_contacts(State(ctx.state.clone()))
        .await
        .unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
}

#[test]
async fn test_contact_replied_and_listing_order() {
    let ctx = TestContext::new();

    for name in ["First", "Second"] {
        handlers::create_contact(
            State(ctx.state.clone()),
            ValidatedJson(ContactRequest {
                name: Some(name.into()),
                email: Some("guest@example.com".into()),
                message: Some("Hello".into()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    }

    let Json(listed) = handlers::list_contacts(State(ctx.state.clone())).await.unwrap();
    assert_eq!(listed[0].name, "Second");

    let Json(replied) =
        handlers::mark_contact_replied(State(ctx.state.clone()), Path(listed[1].id.to_string()))
            .await
            .unwrap();
    assert_eq!(replied.data.status, ContactStatus::Replied);
    assert_eq!(ctx.revalidator.paths(), vec!["/admin/contacts"]);
}

#[test]
async fn test_applications_listed_for_admin() {
    let ctx = TestContext::new();
    for i in 0..3 {
        handlers::apply_for_job(
            State(ctx.state.clone()),
            ValidatedJson(JobApplicationRequest {
                job_id: Some(1),
                full_name: Some(format!("Server {i}")),
                email: Some(format!("server{i}@example.com")),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    }

    let Json(applications) = handlers::list_applications(State(ctx.state.clone()))
        .await
        .unwrap();
    assert_eq!(applications.len(), 3);
    assert!(applications.iter().all(|a| a.status == ApplicationStatus::Submitted));
}

#[test]
async fn test_subscription_cancel_without_active_is_404() {
    let ctx = TestContext::new();
    let user: AuthUser = ctx.seed_user(Role::User).into();

    let err = handlers::cancel_subscription(user.clone(), State(ctx.state.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let (_, Json(package)) = handlers::create_package(
        AdminUser(ctx.seed_user(Role::Admin).into()),
        State(ctx.state.clone()),
        ValidatedJson(CreatePricingPackageRequest {
            name: Some("Weekly Tasting".into()),
            price: Some(30.0),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    handlers::create_subscription(
        user.clone(),
        State(ctx.state.clone()),
        ValidatedJson(CreateSubscriptionRequest {
            package_id: Some(package.data.id),
        }),
    )
    .await
    .unwrap();

    let Json(cancelled) = handlers::cancel_subscription(user.clone(), State(ctx.state.clone()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);

    let Json(current) = handlers::get_subscription(user, State(ctx.state.clone()))
        .await
        .unwrap();
    assert!(current.is_none());
}

#[test]
async fn test_unvalidated_contact_is_rejected_not_defaulted() {
    let ctx = TestContext::new();

    let err = handlers::create_contact(
        State(ctx.state.clone()),
        ValidatedJson(ContactRequest {
            email: Some("guest@example.com".into()),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();

    match err {
        AppError::Validation(details) => {
            assert!(details.contains("name"));
            assert!(details.contains("message"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(ctx.repo.contacts().is_empty());
}
