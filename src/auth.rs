use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    config::SESSION_TTL_RANGE,
    error::AppError,
    models::{Role, User},
    repository::RepositoryState,
};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "auth-token";

/// Claims
///
/// Payload of the session token. `role` is informational only: authorization
/// always re-reads the role from the users table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's UUID, primary key of the users table.
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    /// Expiration Time (exp): seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat): seconds since the epoch.
    pub iat: usize,
}

/// SessionError
///
/// Why a request has no usable session. Both map to 401 at the route boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session cookie")]
    NoSession,

    #[error("invalid or expired session token")]
    InvalidSession,
}

impl From<SessionError> for AppError {
    fn from(_: SessionError) -> Self {
        AppError::Unauthenticated
    }
}

/// SessionKeys
///
/// HS256 key pair derived once from `JWT_SECRET`, plus the token lifetime.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    /// `ttl_hours` is clamped into `SESSION_TTL_RANGE`; `AppConfig::load`
    /// already rejects values outside it.
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let hours = ttl_hours.clamp(*SESSION_TTL_RANGE.start(), *SESSION_TTL_RANGE.end());
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::try_hours(hours).unwrap_or_else(|| Duration::hours(1)),
        }
    }

    /// issue
    ///
    /// Signs a session token for `user`. Used by the identity provider and tests.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), claims, &self.encoding)
    }

    /// verify
    ///
    /// Checks signature and expiry. Every decoding failure (bad signature,
    /// malformed token, expired) is the same `InvalidSession`.
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = ?e.kind(), "rejecting session token");
                SessionError::InvalidSession
            })
    }
}

/// session_token
///
/// Finds the `auth-token` value among the request's `Cookie` headers.
/// Pairs are decoded one at a time so a non-ASCII cookie set by another
/// application does not hide ours.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .flat_map(|value| value.as_bytes().split(|byte| *byte == b';'))
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// resolve_session
///
/// Cookie -> verified claims. Does not touch the store.
pub fn resolve_session(headers: &HeaderMap, keys: &SessionKeys) -> Result<Claims, SessionError> {
    let token = session_token(headers).ok_or(SessionError::NoSession)?;
    keys.verify(token)
}

/// clear_session_cookie
///
/// `Set-Cookie` value that expires the session cookie immediately.
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("auth-token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax; Secure")
    } else {
        HeaderValue::from_static("auth-token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
    }
}

/// AuthUser
///
/// Resolved identity of a signed-in caller. Built from the current users row,
/// so a deleted user or a changed role takes effect on the next request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// Cookie -> claims -> fresh users row. Missing row is `Unauthenticated`.
async fn load_user(
    repo: &RepositoryState,
    keys: &SessionKeys,
    headers: &HeaderMap,
) -> Result<User, AppError> {
    let claims = resolve_session(headers, keys)?;

    repo.get_user(claims.sub).await?.ok_or_else(|| {
        tracing::debug!(user_id = %claims.sub, "session refers to unknown user");
        AppError::Unauthenticated
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let keys = SessionKeys::from_ref(state);

        let user = load_user(&repo, &keys, &parts.headers).await?;
        Ok(user.into())
    }
}

/// AdminUser
///
/// Identity of a caller whose stored role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

/// authorize_admin
///
/// The admin gate: no cookie or bad token is 401, a stored role other than
/// admin is 403. The role claim inside the token is ignored.
pub async fn authorize_admin(
    repo: &RepositoryState,
    keys: &SessionKeys,
    headers: &HeaderMap,
) -> Result<AdminUser, AppError> {
    let user = load_user(repo, keys, headers).await?;

    if user.role != Role::Admin {
        tracing::warn!(user_id = %user.id, "non-admin attempted admin access");
        return Err(AppError::Forbidden);
    }

    Ok(AdminUser(user.into()))
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_admin` for routes under /admin.
        if let Some(admin) = parts.extensions.get::<AdminUser>() {
            return Ok(admin.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let keys = SessionKeys::from_ref(state);
        authorize_admin(&repo, &keys, &parts.headers).await
    }
}

/// require_admin
///
/// Route-layer middleware guarding the whole `/admin` router. The resolved
/// `AdminUser` is stored in the request extensions for handlers that want it.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let admin = authorize_admin(&state.repo, &state.sessions, request.headers()).await?;
    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}
