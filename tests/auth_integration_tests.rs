mod common;

use axum::{
    extract::FromRequestParts,
    http::{Request, header, request::Parts},
};
use common::TestContext;
use restaurant_portal::{
    AppError,
    auth::{AdminUser, AuthUser, SessionKeys, authorize_admin, resolve_session},
    models::Role,
    repository::Repository,
};

fn parts_with_cookie(cookie: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/user/me");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(()).unwrap().into_parts().0
}

#[tokio::test]
async fn test_auth_user_resolves_from_cookie() {
    let ctx = TestContext::new();
    let user = ctx.seed_user(Role::User);
    let mut parts = parts_with_cookie(Some(&ctx.session_cookie(&user)));

    let auth = AuthUser::from_request_parts(&mut parts, &ctx.state)
        .await
        .expect("session should resolve");
    assert_eq!(auth.id, user.id);
    assert_eq!(auth.email, user.email);
    assert_eq!(auth.role, Role::User);
}

#[tokio::test]
async fn test_auth_user_rejects_missing_cookie() {
    let ctx = TestContext::new();
    let mut parts = parts_with_cookie(None);

    let err = AuthUser::from_request_parts(&mut parts, &ctx.state)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn test_auth_user_rejects_deleted_user() {
    let ctx = TestContext::new();
    let user = ctx.seed_user(Role::User);

    // A token for a user that was never stored in this repository.
    let other = TestContext::new();
    let ghost = other.seed_user(Role::User);
    let cookie = format!("auth-token={}", ctx.state.sessions.issue(&ghost).unwrap());

    let mut parts = parts_with_cookie(Some(&cookie));
    let err = AuthUser::from_request_parts(&mut parts, &ctx.state)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));

    // Sanity: the stored user still works.
    let mut parts = parts_with_cookie(Some(&ctx.session_cookie(&user)));
    assert!(AuthUser::from_request_parts(&mut parts, &ctx.state).await.is_ok());
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.seed_user(Role::Admin);

    let foreign = SessionKeys::new("some-other-deployment-secret-xxxxxxxx", 1);
    let cookie = format!("auth-token={}", foreign.issue(&user).unwrap());
    let mut parts = parts_with_cookie(Some(&cookie));

    assert!(resolve_session(&parts.headers, &ctx.state.sessions).is_err());
    let err = AdminUser::from_request_parts(&mut parts, &ctx.state)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn test_authorize_admin_reads_current_role() {
    let ctx = TestContext::new();
    let user = ctx.seed_user(Role::Admin);
    let parts = parts_with_cookie(Some(&ctx.session_cookie(&user)));

    let admin = authorize_admin(&ctx.state.repo, &ctx.state.sessions, &parts.headers)
        .await
        .expect("admin should pass");
    assert_eq!(admin.0.id, user.id);

    // Demoted after the token was issued: the same cookie is now refused.
    ctx.repo.update_user_role(user.id, Role::User).await.unwrap();
    let err = authorize_admin(&ctx.state.repo, &ctx.state.sessions, &parts.headers)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_admin_extractor_reuses_resolved_identity() {
    let ctx = TestContext::new();
    let admin = ctx.seed_user(Role::Admin);

    // No cookie at all, but the middleware already resolved the admin.
    let mut parts = parts_with_cookie(None);
    parts.extensions.insert(AdminUser(admin.clone().into()));

    let resolved = AdminUser::from_request_parts(&mut parts, &ctx.state)
        .await
        .expect("extension should be reused");
    assert_eq!(resolved.0.id, admin.id);
}

#[tokio::test]
async fn test_store_outage_during_auth_is_500_not_401() {
    let ctx = TestContext::new();
    let user = ctx.seed_user(Role::Admin);
    let parts = parts_with_cookie(Some(&ctx.session_cookie(&user)));

    ctx.repo.set_unavailable(true);
    let err = authorize_admin(&ctx.state.repo, &ctx.state.sessions, &parts.headers)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
}
