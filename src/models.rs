use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{error::ValidationDetails, validation::require};

// --- Closed Value Sets (Mapped to Postgres ENUM types) ---

/// Role
///
/// The RBAC tag stored on every user row. Only the admin role-update route may change it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// ContactStatus
///
/// Moves forward in practice (new -> read -> replied); only direct status writes exist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "contact_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ApplicationStatus {
    #[default]
    Submitted,
    Reviewed,
    Interviewed,
    Hired,
    Rejected,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "billing_cycle", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
    OneTime,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Cancelled,
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Identity record from the `users` table. The id is issued by the identity provider
/// and is the `sub` claim of the session token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ContactSubmission
///
/// A message left through the public contact form (`contact_submissions` table).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// JobApplication
///
/// A careers-page submission (`job_applications` table).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobApplication {
    pub id: i64,
    pub job_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub experience_years: Option<i32>,
    pub how_did_you_hear: Option<String>,
    pub status: ApplicationStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// PricingPackage
///
/// A catering/membership package shown on the pricing page. Inactive packages are
/// only visible to admins.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingPackage {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub billing_cycle: BillingCycle,
    pub features: Vec<String>,
    pub is_popular: bool,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Reservation
///
/// A table booking owned by exactly one user (FK `reservations.user_id`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Reservation {
    pub id: i64,
    pub user_id: Uuid,
    #[ts(type = "string")]
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "19:30:00")]
    pub time: NaiveTime,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notification {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// NotificationPreferences
///
/// Per-user delivery switches. A user with no stored row gets `defaults_for`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NotificationPreferences {
    pub user_id: Uuid,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub reservation_reminders: bool,
    pub marketing_emails: bool,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreferences {
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            email_notifications: true,
            sms_notifications: false,
            reservation_reminders: true,
            marketing_emails: false,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Subscription {
    pub id: i64,
    pub user_id: Uuid,
    pub package_id: i64,
    pub status: SubscriptionStatus,
    #[ts(type = "string")]
    pub started_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

// --- Request Payloads (Input Schemas) ---
//
// Required fields are `Option<T>` + `#[validate(required)]` so a missing field is
// reported in the `details` map instead of failing deserialization.

/// ContactRequest
///
/// Body of `POST /contact`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 100, message = "Name must be 1-100 characters")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Email is required"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    pub subject: Option<String>,
    #[validate(
        required(message = "Message is required"),
        length(min = 1, max = 5000, message = "Message must be 1-5000 characters")
    )]
    pub message: Option<String>,
}

/// JobApplicationRequest
///
/// Body of `POST /careers/apply`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobApplicationRequest {
    #[validate(required(message = "Job id is required"))]
    pub job_id: Option<i64>,
    #[validate(
        required(message = "Full name is required"),
        length(min = 2, max = 100, message = "Full name must be 2-100 characters")
    )]
    pub full_name: Option<String>,
    #[validate(
        required(message = "Email is required"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(url(message = "Resume must be a valid URL"))]
    pub resume_url: Option<String>,
    #[validate(length(max = 5000, message = "Cover letter must be at most 5000 characters"))]
    pub cover_letter: Option<String>,
    #[validate(range(min = 0, max = 60, message = "Experience must be between 0 and 60 years"))]
    pub experience_years: Option<i32>,
    #[validate(length(max = 200))]
    pub how_did_you_hear: Option<String>,
}

/// CreatePricingPackageRequest
///
/// Body of `POST /pricing/packages`. Only `name` and `price` are required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePricingPackageRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 100, message = "Name must be 1-100 characters")
    )]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(
        required(message = "Price is required"),
        range(min = 0.0, message = "Price cannot be negative")
    )]
    pub price: Option<f64>,
    pub billing_cycle: Option<BillingCycle>,
    pub features: Option<Vec<String>>,
    pub is_popular: Option<bool>,
    pub is_active: Option<bool>,
}

/// UpdateProfileRequest
///
/// Partial update for `PUT /user/profile`. Role changes go through `PUT /admin/users/{id}/role`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// UpdateNotificationPreferencesRequest
///
/// Partial update for `PUT /user/notifications`; omitted switches keep their value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateNotificationPreferencesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_reminders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_emails: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateReservationRequest {
    #[validate(required(message = "Date is required"))]
    #[ts(type = "string | null")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    #[validate(required(message = "Time is required"))]
    #[ts(type = "string | null")]
    #[schema(value_type = Option<String>, example = "19:30")]
    pub time: Option<NaiveTime>,
    #[validate(
        required(message = "Party size is required"),
        range(min = 1, max = 20, message = "Party size must be between 1 and 20")
    )]
    pub party_size: Option<i32>,
    #[validate(length(max = 500, message = "Special requests must be at most 500 characters"))]
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateSubscriptionRequest {
    #[validate(required(message = "Package id is required"))]
    pub package_id: Option<i64>,
}

/// Status payloads for the admin moderation routes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct UpdateReservationStatusRequest {
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// --- Validated Inputs (Handed to the Repository) ---

/// NewContactSubmission
///
/// A contact request that has passed validation; required fields are no longer optional.
/// Each `TryFrom` below runs the request's validation rules itself, so a
/// conversion never fills a missing field with a default.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

impl TryFrom<ContactRequest> for NewContactSubmission {
    type Error = ValidationDetails;

    fn try_from(req: ContactRequest) -> Result<Self, Self::Error> {
        req.validate()?;
        Ok(Self {
            name: require(req.name, "name", "Name is required")?,
            email: require(req.email, "email", "Email is required")?,
            phone: req.phone,
            subject: req.subject,
            message: require(req.message, "message", "Message is required")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewJobApplication {
    pub job_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub experience_years: Option<i32>,
    pub how_did_you_hear: Option<String>,
}

impl TryFrom<JobApplicationRequest> for NewJobApplication {
    type Error = ValidationDetails;

    fn try_from(req: JobApplicationRequest) -> Result<Self, Self::Error> {
        req.validate()?;
        Ok(Self {
            job_id: require(req.job_id, "jobId", "Job id is required")?,
            full_name: require(req.full_name, "fullName", "Full name is required")?,
            email: require(req.email, "email", "Email is required")?,
            phone: req.phone,
            resume_url: req.resume_url,
            cover_letter: req.cover_letter,
            experience_years: req.experience_years,
            how_did_you_hear: req.how_did_you_hear,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPricingPackage {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub billing_cycle: BillingCycle,
    pub features: Vec<String>,
    pub is_popular: bool,
    pub is_active: bool,
}

impl TryFrom<CreatePricingPackageRequest> for NewPricingPackage {
    type Error = ValidationDetails;

    fn try_from(req: CreatePricingPackageRequest) -> Result<Self, Self::Error> {
        req.validate()?;
        Ok(Self {
            name: require(req.name, "name", "Name is required")?,
            description: req.description,
            price: require(req.price, "price", "Price is required")?,
            billing_cycle: req.billing_cycle.unwrap_or_default(),
            features: req.features.unwrap_or_default(),
            is_popular: req.is_popular.unwrap_or(false),
            // New packages go live unless explicitly staged as inactive.
            is_active: req.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i32,
    pub special_requests: Option<String>,
}

impl TryFrom<CreateReservationRequest> for NewReservation {
    type Error = ValidationDetails;

    fn try_from(req: CreateReservationRequest) -> Result<Self, Self::Error> {
        req.validate()?;
        Ok(Self {
            date: require(req.date, "date", "Date is required")?,
            time: require(req.time, "time", "Time is required")?,
            party_size: require(req.party_size, "partySize", "Party size is required")?,
            special_requests: req.special_requests,
        })
    }
}

// --- Response Envelopes ---

/// ApiSuccess
///
/// The `{ success, data }` envelope used by the contact and status-change routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// ApplicationCreated
///
/// Returned by `POST /careers/apply`; only the new row id is exposed to the applicant.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApplicationCreated {
    pub application_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LogoutResponse {
    pub success: bool,
}
