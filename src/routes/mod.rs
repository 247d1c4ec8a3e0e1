/// Router Module Index
///
/// Routing is split by access level so each group gets its guard as a
/// router-level layer instead of a per-handler check.

/// Routes open to anonymous visitors (plus the admin-gated package creation).
pub mod public;

/// Routes that need a valid `auth-token` session.
pub mod authenticated;

/// Routes nested under `/admin`, guarded by `require_admin`.
pub mod admin;
