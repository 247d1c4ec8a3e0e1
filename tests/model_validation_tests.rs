use chrono::Utc;
use restaurant_portal::{
    error::ValidationDetails,
    models::{
        ApplicationCreated, BillingCycle, ContactRequest, CreatePricingPackageRequest,
        CreateReservationRequest, JobApplicationRequest, NewContactSubmission, NewJobApplication,
        NewPricingPackage, NewReservation, PricingPackage, ReservationStatus, Role,
        UpdateReservationStatusRequest,
    },
};
use validator::Validate;

fn details_of<T: Validate>(value: &T) -> ValidationDetails {
    value.validate().map(|_| ValidationDetails::new()).unwrap_or_else(Into::into)
}

#[test]
fn test_contact_request_reports_every_missing_field() {
    let details = details_of(&ContactRequest::default());

    assert!(details.contains("name"));
    assert!(details.contains("email"));
    assert!(details.contains("message"));
    assert!(!details.contains("subject"));
    assert_eq!(details.get("email").unwrap(), ["Email is required"]);
}

#[test]
fn test_contact_request_rejects_bad_email() {
    let request = ContactRequest {
        name: Some("Ada".into()),
        email: Some("ada-at-example".into()),
        message: Some("Hello".into()),
        ..Default::default()
    };
    let details = details_of(&request);
    assert_eq!(details.get("email").unwrap(), ["Invalid email format"]);
    assert!(!details.contains("name"));
}

#[test]
fn test_job_application_keys_are_camel_case() {
    let request = JobApplicationRequest {
        job_id: Some(1),
        full_name: Some("Al".into()),
        email: Some("al@example.com".into()),
        resume_url: Some("not a url".into()),
        experience_years: Some(-1),
        ..Default::default()
    };
    let details = details_of(&request);

    assert!(details.contains("resumeUrl"));
    assert!(details.contains("experienceYears"));
    assert!(!details.contains("resume_url"));
    assert!(!details.contains("fullName"));
}

#[test]
fn test_reservation_party_size_bounds() {
    let request: CreateReservationRequest = serde_json::from_value(serde_json::json!({
        "date": "2030-06-01",
        "time": "19:30:00",
        "partySize": 0
    }))
    .unwrap();
    assert!(details_of(&request).contains("partySize"));

    let request: CreateReservationRequest = serde_json::from_value(serde_json::json!({
        "date": "2030-06-01",
        "time": "19:30:00",
        "partySize": 8
    }))
    .unwrap();
    assert!(request.validate().is_ok());
}

#[test]
fn test_pricing_request_defaults() {
    let request: CreatePricingPackageRequest =
        serde_json::from_value(serde_json::json!({ "name": "Gold", "price": 49.99 })).unwrap();
    assert!(request.validate().is_ok());

    let package = NewPricingPackage::try_from(request).unwrap();
    assert!(package.is_active);
    assert!(!package.is_popular);
    assert_eq!(package.billing_cycle, BillingCycle::Monthly);
    assert!(package.features.is_empty());

    let negative: CreatePricingPackageRequest =
        serde_json::from_value(serde_json::json!({ "name": "Free", "price": -1.0 })).unwrap();
    assert!(details_of(&negative).contains("price"));
}

#[test]
fn test_conversion_refuses_unvalidated_requests() {
    let details = NewContactSubmission::try_from(ContactRequest::default()).unwrap_err();
    assert_eq!(details.get("name").unwrap(), ["Name is required"]);
    assert!(details.contains("message"));

    let details = NewJobApplication::try_from(JobApplicationRequest {
        job_id: Some(3),
        full_name: Some("Al".into()),
        email: Some("not-an-email".into()),
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(details.get("email").unwrap(), ["Invalid email format"]);

    let details = NewReservation::try_from(CreateReservationRequest::default()).unwrap_err();
    assert!(details.contains("date"));
    assert!(details.contains("partySize"));

    let details = NewPricingPackage::try_from(CreatePricingPackageRequest::default()).unwrap_err();
    assert!(details.contains("price"));
}

#[test]
fn test_enum_wire_spelling() {
    assert_eq!(serde_json::to_value(BillingCycle::OneTime).unwrap(), "one_time");
    assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");

    let status: UpdateReservationStatusRequest =
        serde_json::from_value(serde_json::json!({ "status": "confirmed" })).unwrap();
    assert_eq!(status.status, ReservationStatus::Confirmed);

    assert!(
        serde_json::from_value::<UpdateReservationStatusRequest>(
            serde_json::json!({ "status": "seated" })
        )
        .is_err()
    );
}

#[test]
fn test_response_shapes_are_camel_case() {
    let created = serde_json::to_value(ApplicationCreated { application_id: 12 }).unwrap();
    assert_eq!(created, serde_json::json!({ "applicationId": 12 }));

    let package = PricingPackage {
        id: 1,
        name: "Gold".into(),
        price: 49.99,
        is_popular: true,
        is_active: true,
        created_at: Utc::now(),
        ..Default::default()
    };
    let json = serde_json::to_value(&package).unwrap();
    assert_eq!(json["isPopular"], true);
    assert_eq!(json["billingCycle"], "monthly");
    assert!(json.get("is_popular").is_none());
}
