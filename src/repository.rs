use crate::models::{
    ApplicationStatus, ContactStatus, ContactSubmission, JobApplication, NewContactSubmission,
    NewJobApplication, NewPricingPackage, NewReservation, Notification, NotificationPreferences,
    PricingPackage, Reservation, ReservationStatus, Role, Subscription,
    UpdateNotificationPreferencesRequest, UpdateProfileRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub mod memory;

pub use memory::InMemoryRepository;

/// PersistenceError
///
/// Failures surfaced by the persistence gateway. Unique-constraint violations are
/// split out so the route boundary can answer 409 instead of 500.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("conflicting row: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique constraint");
                return PersistenceError::Conflict(conflict_message(constraint));
            }
        }
        PersistenceError::Database(err)
    }
}

/// Maps a violated constraint to a message that is safe to show to the caller.
fn conflict_message(constraint: &str) -> String {
    if constraint.contains("email") {
        "Email already in use".to_string()
    } else if constraint.contains("subscriptions_one_active") {
        "An active subscription already exists".to_string()
    } else {
        "Resource already exists".to_string()
    }
}

pub type RepoResult<T> = Result<T, PersistenceError>;

/// Repository Trait
///
/// The persistence gateway used by every route. Each method is exactly one
/// statement against the store, so single-row atomicity is the store's job.
///
/// Keyed updates return `Ok(None)` when no row matched; the handler turns that
/// into a 404.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn update_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>>;
    // COALESCE-style partial update; role is not touched.
    async fn update_profile(&self, id: Uuid, changes: UpdateProfileRequest)
    -> RepoResult<Option<User>>;

    // --- Contact Submissions ---
    async fn create_contact(&self, new: NewContactSubmission) -> RepoResult<ContactSubmission>;
    // Newest first.
    async fn list_contacts(&self) -> RepoResult<Vec<ContactSubmission>>;
    async fn set_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> RepoResult<Option<ContactSubmission>>;

    // --- Job Applications ---
    async fn create_application(&self, new: NewJobApplication) -> RepoResult<JobApplication>;
    async fn list_applications(&self) -> RepoResult<Vec<JobApplication>>;
    async fn set_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> RepoResult<Option<JobApplication>>;

    // --- Pricing ---
    // Ascending price; inactive packages only when `include_inactive`.
    async fn list_packages(&self, include_inactive: bool) -> RepoResult<Vec<PricingPackage>>;
    async fn create_package(&self, new: NewPricingPackage) -> RepoResult<PricingPackage>;

    // --- Reservations ---
    async fn create_reservation(
        &self,
        user_id: Uuid,
        new: NewReservation,
    ) -> RepoResult<Reservation>;
    async fn list_reservations_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Reservation>>;
    async fn list_reservations(&self) -> RepoResult<Vec<Reservation>>;
    async fn set_reservation_status(
        &self,
        id: i64,
        status: ReservationStatus,
    ) -> RepoResult<Option<Reservation>>;
    // Owner-only: matches on both id and user_id.
    async fn cancel_reservation(&self, id: i64, user_id: Uuid) -> RepoResult<Option<Reservation>>;

    // --- Notifications ---
    async fn list_notifications(&self, user_id: Uuid) -> RepoResult<Vec<Notification>>;
    // Owner-only.
    async fn mark_notification_read(
        &self,
        id: i64,
        user_id: Uuid,
    ) -> RepoResult<Option<Notification>>;
    async fn get_notification_preferences(
        &self,
        user_id: Uuid,
    ) -> RepoResult<NotificationPreferences>;
    // Upsert; omitted switches keep their stored (or default) value.
    async fn update_notification_preferences(
        &self,
        user_id: Uuid,
        changes: UpdateNotificationPreferencesRequest,
    ) -> RepoResult<NotificationPreferences>;

    // --- Subscriptions ---
    async fn get_active_subscription(&self, user_id: Uuid) -> RepoResult<Option<Subscription>>;
    // `Ok(None)` when the package does not exist or is inactive.
    // A second active subscription is a `Conflict`.
    async fn create_subscription(
        &self,
        user_id: Uuid,
        package_id: i64,
    ) -> RepoResult<Option<Subscription>>;
    async fn cancel_subscription(&self, user_id: Uuid) -> RepoResult<Option<Subscription>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Queries are checked at runtime (no
/// compile-time database connection needed to build the crate).
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING id, name, email, role, created_at",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// update_profile
    ///
    /// `COALESCE` keeps the stored value for every field left as `None`.
    async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
    ) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING id, name, email, role, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    // --- CONTACT SUBMISSIONS ---

    async fn create_contact(&self, new: NewContactSubmission) -> RepoResult<ContactSubmission> {
        let row = sqlx::query_as::<_, ContactSubmission>(
            r#"
            INSERT INTO contact_submissions (name, email, phone, subject, message, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'new', NOW(), NOW())
            RETURNING id, name, email, phone, subject, message, status, created_at, updated_at
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.subject)
        .bind(new.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_contacts(&self) -> RepoResult<Vec<ContactSubmission>> {
        let rows = sqlx::query_as::<_, ContactSubmission>(
            r#"
            SELECT id, name, email, phone, subject, message, status, created_at, updated_at
            FROM contact_submissions
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> RepoResult<Option<ContactSubmission>> {
        let row = sqlx::query_as::<_, ContactSubmission>(
            r#"
            UPDATE contact_submissions
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone, subject, message, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // --- JOB APPLICATIONS ---

    async fn create_application(&self, new: NewJobApplication) -> RepoResult<JobApplication> {
        let row = sqlx::query_as::<_, JobApplication>(
            r#"
            INSERT INTO job_applications
                (job_id, full_name, email, phone, resume_url, cover_letter,
                 experience_years, how_did_you_hear, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'submitted', NOW(), NOW())
            RETURNING id, job_id, full_name, email, phone, resume_url, cover_letter,
                      experience_years, how_did_you_hear, status, created_at, updated_at
            "#,
        )
        .bind(new.job_id)
        .bind(new.full_name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.resume_url)
        .bind(new.cover_letter)
        .bind(new.experience_years)
        .bind(new.how_did_you_hear)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_applications(&self) -> RepoResult<Vec<JobApplication>> {
        let rows = sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT id, job_id, full_name, email, phone, resume_url, cover_letter,
                   experience_years, how_did_you_hear, status, created_at, updated_at
            FROM job_applications
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> RepoResult<Option<JobApplication>> {
        let row = sqlx::query_as::<_, JobApplication>(
            r#"
            UPDATE job_applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, job_id, full_name, email, phone, resume_url, cover_letter,
                      experience_years, how_did_you_hear, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // --- PRICING ---

    async fn list_packages(&self, include_inactive: bool) -> RepoResult<Vec<PricingPackage>> {
        let rows = sqlx::query_as::<_, PricingPackage>(
            r#"
            SELECT id, name, description, price, billing_cycle, features,
                   is_popular, is_active, created_at
            FROM pricing_packages
            WHERE is_active OR $1
            ORDER BY price ASC, id ASC
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_package(&self, new: NewPricingPackage) -> RepoResult<PricingPackage> {
        let row = sqlx::query_as::<_, PricingPackage>(
            r#"
            INSERT INTO pricing_packages
                (name, description, price, billing_cycle, features, is_popular, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING id, name, description, price, billing_cycle, features,
                      is_popular, is_active, created_at
            "#,
        )
        .bind(new.name)
        .bind(new.description)
        .bind(new.price)
        .bind(new.billing_cycle)
        .bind(new.features)
        .bind(new.is_popular)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // --- RESERVATIONS ---

    async fn create_reservation(
        &self,
        user_id: Uuid,
        new: NewReservation,
    ) -> RepoResult<Reservation> {
        let row = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations
                (user_id, date, time, party_size, status, special_requests, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, NOW(), NOW())
            RETURNING id, user_id, date, time, party_size, status, special_requests,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(new.date)
        .bind(new.time)
        .bind(new.party_size)
        .bind(new.special_requests)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_reservations_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, user_id, date, time, party_size, status, special_requests,
                   created_at, updated_at
            FROM reservations
            WHERE user_id = $1
            ORDER BY date DESC, time DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_reservations(&self) -> RepoResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, user_id, date, time, party_size, status, special_requests,
                   created_at, updated_at
            FROM reservations
            ORDER BY date ASC, time ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_reservation_status(
        &self,
        id: i64,
        status: ReservationStatus,
    ) -> RepoResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, date, time, party_size, status, special_requests,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn cancel_reservation(&self, id: i64, user_id: Uuid) -> RepoResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, date, time, party_size, status, special_requests,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // --- NOTIFICATIONS ---

    async fn list_notifications(&self, user_id: Uuid) -> RepoResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, title, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_notification_read(
        &self,
        id: i64,
        user_id: Uuid,
    ) -> RepoResult<Option<Notification>> {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = true
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, message, is_read, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_notification_preferences(
        &self,
        user_id: Uuid,
    ) -> RepoResult<NotificationPreferences> {
        let row = sqlx::query_as::<_, NotificationPreferences>(
            r#"
            SELECT user_id, email_notifications, sms_notifications,
                   reservation_reminders, marketing_emails, updated_at
            FROM notification_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.unwrap_or_else(|| NotificationPreferences::defaults_for(user_id)))
    }

    /// update_notification_preferences
    ///
    /// Single upsert. The INSERT branch falls back to the defaults of
    /// `NotificationPreferences::defaults_for`; the UPDATE branch keeps stored values.
    async fn update_notification_preferences(
        &self,
        user_id: Uuid,
        changes: UpdateNotificationPreferencesRequest,
    ) -> RepoResult<NotificationPreferences> {
        let row = sqlx::query_as::<_, NotificationPreferences>(
            r#"
            INSERT INTO notification_preferences
                (user_id, email_notifications, sms_notifications,
                 reservation_reminders, marketing_emails, updated_at)
            VALUES ($1, COALESCE($2, true), COALESCE($3, false),
                    COALESCE($4, true), COALESCE($5, false), NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                email_notifications = COALESCE($2, notification_preferences.email_notifications),
                sms_notifications = COALESCE($3, notification_preferences.sms_notifications),
                reservation_reminders = COALESCE($4, notification_preferences.reservation_reminders),
                marketing_emails = COALESCE($5, notification_preferences.marketing_emails),
                updated_at = NOW()
            RETURNING user_id, email_notifications, sms_notifications,
                      reservation_reminders, marketing_emails, updated_at
            "#,
        )
        .bind(user_id)
        .bind(changes.email_notifications)
        .bind(changes.sms_notifications)
        .bind(changes.reservation_reminders)
        .bind(changes.marketing_emails)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // --- SUBSCRIPTIONS ---

    async fn get_active_subscription(&self, user_id: Uuid) -> RepoResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, package_id, status, started_at, cancelled_at
            FROM subscriptions
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// create_subscription
    ///
    /// `INSERT ... SELECT` inserts nothing (and returns no row) unless the package
    /// exists and is active. The partial unique index rejects a second active row.
    async fn create_subscription(
        &self,
        user_id: Uuid,
        package_id: i64,
    ) -> RepoResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, package_id, status, started_at)
            SELECT $1, p.id, 'active', NOW()
            FROM pricing_packages p
            WHERE p.id = $2 AND p.is_active
            RETURNING id, user_id, package_id, status, started_at, cancelled_at
            "#,
        )
        .bind(user_id)
        .bind(package_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn cancel_subscription(&self, user_id: Uuid) -> RepoResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled', cancelled_at = NOW()
            WHERE user_id = $1 AND status = 'active'
            RETURNING id, user_id, package_id, status, started_at, cancelled_at
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
