use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{PersistenceError, RepoResult, Repository};
use crate::models::{
    ApplicationStatus, ContactStatus, ContactSubmission, JobApplication, NewContactSubmission,
    NewJobApplication, NewPricingPackage, NewReservation, Notification, NotificationPreferences,
    PricingPackage, Reservation, ReservationStatus, Role, Subscription, SubscriptionStatus,
    UpdateNotificationPreferencesRequest, UpdateProfileRequest, User,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    contacts: Vec<ContactSubmission>,
    applications: Vec<JobApplication>,
    packages: Vec<PricingPackage>,
    reservations: Vec<Reservation>,
    notifications: Vec<Notification>,
    preferences: Vec<NotificationPreferences>,
    subscriptions: Vec<Subscription>,
}

impl Tables {
    // One sequence shared by all tables; ids only need to be unique per table.
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// InMemoryRepository
///
/// A `Repository` over mutex-guarded vectors, mirroring the Postgres semantics
/// (ordering, owner checks, unique email, one active subscription per user).
/// Used by the handler and router tests; every call holds the lock for its whole
/// "statement", so concurrent writes are serialized and each gets a distinct id.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail like a lost database connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn seed_user(&self, user: User) {
        self.tables().users.push(user);
    }

    pub fn seed_notification(&self, user_id: Uuid, title: &str, message: &str) -> Notification {
        let mut tables = self.tables();
        let notification = Notification {
            id: tables.next_id(),
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        notification
    }

    pub fn contacts(&self) -> Vec<ContactSubmission> {
        self.tables().contacts.clone()
    }

    pub fn applications(&self) -> Vec<JobApplication> {
        self.tables().applications.clone()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-written row behind.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(PersistenceError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        self.check_available()?;
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        self.check_available()?;
        let mut users = self.tables().users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>> {
        self.check_available()?;
        let mut tables = self.tables();
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
    ) -> RepoResult<Option<User>> {
        self.check_available()?;
        let mut tables = self.tables();

        if let Some(email) = &changes.email {
            let taken = tables
                .users
                .iter()
                .any(|u| u.id != id && &u.email == email);
            if taken {
                return Err(PersistenceError::Conflict("Email already in use".to_string()));
            }
        }

        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(email) = changes.email {
                user.email = email;
            }
            user.clone()
        }))
    }

    // --- CONTACT SUBMISSIONS ---

    async fn create_contact(&self, new: NewContactSubmission) -> RepoResult<ContactSubmission> {
        self.check_available()?;
        let mut tables = self.tables();
        let now = Utc::now();
        let row = ContactSubmission {
            id: tables.next_id(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            subject: new.subject,
            message: new.message,
            status: ContactStatus::New,
            created_at: now,
            updated_at: now,
        };
        tables.contacts.push(row.clone());
        Ok(row)
    }

    async fn list_contacts(&self) -> RepoResult<Vec<ContactSubmission>> {
        self.check_available()?;
        let mut rows = self.tables().contacts.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn set_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> RepoResult<Option<ContactSubmission>> {
        self.check_available()?;
        let mut tables = self.tables();
        Ok(tables.contacts.iter_mut().find(|c| c.id == id).map(|row| {
            row.status = status;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    // --- JOB APPLICATIONS ---

    async fn create_application(&self, new: NewJobApplication) -> RepoResult<JobApplication> {
        self.check_available()?;
        let mut tables = self.tables();
        let now = Utc::now();
        let row = JobApplication {
            id: tables.next_id(),
            job_id: new.job_id,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            resume_url: new.resume_url,
            cover_letter: new.cover_letter,
            experience_years: new.experience_years,
            how_did_you_hear: new.how_did_you_hear,
            status: ApplicationStatus::Submitted,
            created_at: now,
            updated_at: now,
        };
        tables.applications.push(row.clone());
        Ok(row)
    }

    async fn list_applications(&self) -> RepoResult<Vec<JobApplication>> {
        self.check_available()?;
        let mut rows = self.tables().applications.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn set_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> RepoResult<Option<JobApplication>> {
        self.check_available()?;
        let mut tables = self.tables();
        Ok(tables.applications.iter_mut().find(|a| a.id == id).map(|row| {
            row.status = status;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    // --- PRICING ---

    async fn list_packages(&self, include_inactive: bool) -> RepoResult<Vec<PricingPackage>> {
        self.check_available()?;
        let mut rows: Vec<PricingPackage> = self
            .tables()
            .packages
            .iter()
            .filter(|p| include_inactive || p.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.price.total_cmp(&b.price).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn create_package(&self, new: NewPricingPackage) -> RepoResult<PricingPackage> {
        self.check_available()?;
        let mut tables = self.tables();
        let row = PricingPackage {
            id: tables.next_id(),
            name: new.name,
            description: new.description,
            price: new.price,
            billing_cycle: new.billing_cycle,
            features: new.features,
            is_popular: new.is_popular,
            is_active: new.is_active,
            created_at: Utc::now(),
        };
        tables.packages.push(row.clone());
        Ok(row)
    }

    // --- RESERVATIONS ---

    async fn create_reservation(
        &self,
        user_id: Uuid,
        new: NewReservation,
    ) -> RepoResult<Reservation> {
        self.check_available()?;
        let mut tables = self.tables();
        let now = Utc::now();
        let row = Reservation {
            id: tables.next_id(),
            user_id,
            date: new.date,
            time: new.time,
            party_size: new.party_size,
            status: ReservationStatus::Pending,
            special_requests: new.special_requests,
            created_at: now,
            updated_at: now,
        };
        tables.reservations.push(row.clone());
        Ok(row)
    }

    async fn list_reservations_for_user(&self, user_id: Uuid) -> RepoResult<Vec<Reservation>> {
        self.check_available()?;
        let mut rows: Vec<Reservation> = self
            .tables()
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
        Ok(rows)
    }

    async fn list_reservations(&self) -> RepoResult<Vec<Reservation>> {
        self.check_available()?;
        let mut rows = self.tables().reservations.clone();
        rows.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(rows)
    }

    async fn set_reservation_status(
        &self,
        id: i64,
        status: ReservationStatus,
    ) -> RepoResult<Option<Reservation>> {
        self.check_available()?;
        let mut tables = self.tables();
        Ok(tables.reservations.iter_mut().find(|r| r.id == id).map(|row| {
            row.status = status;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn cancel_reservation(&self, id: i64, user_id: Uuid) -> RepoResult<Option<Reservation>> {
        self.check_available()?;
        let mut tables = self.tables();
        Ok(tables
            .reservations
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
            .map(|row| {
                row.status = ReservationStatus::Cancelled;
                row.updated_at = Utc::now();
                row.clone()
            }))
    }

    // --- NOTIFICATIONS ---

    async fn list_notifications(&self, user_id: Uuid) -> RepoResult<Vec<Notification>> {
        self.check_available()?;
        let mut rows: Vec<Notification> = self
            .tables()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn mark_notification_read(
        &self,
        id: i64,
        user_id: Uuid,
    ) -> RepoResult<Option<Notification>> {
        self.check_available()?;
        let mut tables = self.tables();
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|row| {
                row.is_read = true;
                row.clone()
            }))
    }

    async fn get_notification_preferences(
        &self,
        user_id: Uuid,
    ) -> RepoResult<NotificationPreferences> {
        self.check_available()?;
        Ok(self
            .tables()
            .preferences
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .unwrap_or_else(|| NotificationPreferences::defaults_for(user_id)))
    }

    async fn update_notification_preferences(
        &self,
        user_id: Uuid,
        changes: UpdateNotificationPreferencesRequest,
    ) -> RepoResult<NotificationPreferences> {
        self.check_available()?;
        let mut tables = self.tables();

        let index = match tables.preferences.iter().position(|p| p.user_id == user_id) {
            Some(index) => index,
            None => {
                tables
                    .preferences
                    .push(NotificationPreferences::defaults_for(user_id));
                tables.preferences.len() - 1
            }
        };

        let prefs = &mut tables.preferences[index];
        if let Some(value) = changes.email_notifications {
            prefs.email_notifications = value;
        }
        if let Some(value) = changes.sms_notifications {
            prefs.sms_notifications = value;
        }
        if let Some(value) = changes.reservation_reminders {
            prefs.reservation_reminders = value;
        }
        if let Some(value) = changes.marketing_emails {
            prefs.marketing_emails = value;
        }
        prefs.updated_at = Utc::now();
        Ok(prefs.clone())
    }

    // --- SUBSCRIPTIONS ---

    async fn get_active_subscription(&self, user_id: Uuid) -> RepoResult<Option<Subscription>> {
        self.check_available()?;
        Ok(self
            .tables()
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .cloned())
    }

    async fn create_subscription(
        &self,
        user_id: Uuid,
        package_id: i64,
    ) -> RepoResult<Option<Subscription>> {
        self.check_available()?;
        let mut tables = self.tables();

        let package_live = tables
            .packages
            .iter()
            .any(|p| p.id == package_id && p.is_active);
        if !package_live {
            return Ok(None);
        }

        let already_active = tables
            .subscriptions
            .iter()
            .any(|s| s.user_id == user_id && s.status == SubscriptionStatus::Active);
        if already_active {
            return Err(PersistenceError::Conflict(
                "An active subscription already exists".to_string(),
            ));
        }

        let row = Subscription {
            id: tables.next_id(),
            user_id,
            package_id,
            status: SubscriptionStatus::Active,
            started_at: Utc::now(),
            cancelled_at: None,
        };
        tables.subscriptions.push(row.clone());
        Ok(Some(row))
    }

    async fn cancel_subscription(&self, user_id: Uuid) -> RepoResult<Option<Subscription>> {
        self.check_available()?;
        let mut tables = self.tables();
        Ok(tables
            .subscriptions
            .iter_mut()
            .find(|s| s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .map(|row| {
                row.status = SubscriptionStatus::Cancelled;
                row.cancelled_at = Some(Utc::now());
                row.clone()
            }))
    }
}
