//! Schema validation for event and account payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::models::{Coordinates, EventPayload, LoginPayload, SignupPayload, ValidatedEvent};

const MIN_PASSWORD_LEN: usize = 8;

/// A single problem found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every issue found in one payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Error)]
#[error("{}", join_issues(.0))]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldIssue>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldIssue::new(field, message)])
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|issue| issue.field == field)
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldIssue::new(field, message));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates an event payload and fills in missing timestamps with `now`.
///
/// All issues are collected before returning, so a client fixing a request
/// sees every problem at once.
pub fn validate_event(
    payload: EventPayload,
    now: DateTime<Utc>,
) -> Result<ValidatedEvent, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = match payload.title {
        Some(title) if title.trim().is_empty() => {
            errors.push("title", "must not be empty");
            None
        }
        Some(title) => Some(title),
        None => {
            errors.push("title", "is required");
            None
        }
    };

    if payload.description.is_none() {
        errors.push("description", "is required");
    }

    let price = match payload.price {
        Some(price) if price < Decimal::ZERO => {
            errors.push("price", "must be greater than or equal to 0");
            None
        }
        Some(price) => Some(price),
        None => {
            errors.push("price", "is required");
            None
        }
    };

    let location = check_coordinates("location", payload.location, &mut errors);
    let map_data = check_coordinates("mapData", payload.map_data, &mut errors);

    match &payload.photos {
        Some(photos) => {
            for (index, photo) in photos.iter().enumerate() {
                if Url::parse(photo).is_err() {
                    errors.push(format!("photos[{index}]"), "must be a valid URL");
                }
            }
        }
        None => errors.push("photos", "is required"),
    }

    match (
        title,
        payload.description,
        price,
        location,
        map_data,
        payload.photos,
    ) {
        (Some(title), Some(description), Some(price), Some(location), Some(map_data), Some(photos))
            if errors.is_empty() =>
        {
            Ok(ValidatedEvent {
                title,
                description,
                price,
                location,
                map_data,
                photos,
                created_at: payload.created_at.unwrap_or(now),
                updated_at: payload.updated_at.unwrap_or(now),
            })
        }
        _ => Err(errors),
    }
}

fn check_coordinates(
    field: &str,
    value: Option<Coordinates>,
    errors: &mut ValidationErrors,
) -> Option<Coordinates> {
    match value {
        Some(coordinates) if coordinates.is_finite() => Some(coordinates),
        Some(_) => {
            errors.push(field, "longitude and latitude must be finite numbers");
            None
        }
        None => {
            errors.push(field, "is required");
            None
        }
    }
}

/// Signup fields after validation; the email is trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSignup {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub fn validate_signup(payload: SignupPayload) -> Result<ValidatedSignup, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let email = check_email(payload.email, &mut errors);
    let password = match payload.password {
        Some(password) if password.chars().count() >= MIN_PASSWORD_LEN => Some(password),
        Some(_) => {
            errors.push(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
            None
        }
        None => {
            errors.push("password", "is required");
            None
        }
    };
    let first_name = check_text("firstName", payload.first_name, &mut errors);
    let last_name = check_text("lastName", payload.last_name, &mut errors);

    match (email, password, first_name, last_name) {
        (Some(email), Some(password), Some(first_name), Some(last_name)) => Ok(ValidatedSignup {
            email,
            password,
            first_name,
            last_name,
        }),
        _ => Err(errors),
    }
}

/// Returns the normalized email and the password of a login request.
pub fn validate_login(payload: LoginPayload) -> Result<(String, String), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let email = check_email(payload.email, &mut errors);
    let password = payload.password.filter(|password| !password.is_empty());
    if password.is_none() {
        errors.push("password", "is required");
    }

    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(errors),
    }
}

fn check_email(value: Option<String>, errors: &mut ValidationErrors) -> Option<String> {
    let Some(raw) = value else {
        errors.push("email", "is required");
        return None;
    };

    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Some(email)
        }
        _ => {
            errors.push("email", "must be a valid email address");
            None
        }
    }
}

fn check_text(field: &str, value: Option<String>, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Some(_) => {
            errors.push(field, "must not be empty");
            None
        }
        None => {
            errors.push(field, "is required");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_payload() -> EventPayload {
        EventPayload {
            title: Some("Show".to_string()),
            description: Some("An evening show".to_string()),
            price: Some(Decimal::new(10, 0)),
            location: Some(Coordinates::new(1.0, 1.0)),
            map_data: Some(Coordinates::new(1.0, 1.0)),
            photos: Some(vec!["https://x/a.png".to_string()]),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_valid_payload_defaults_timestamps() {
        let now = Utc::now();
        let validated = validate_event(valid_payload(), now).unwrap();

        assert_eq!(validated.title, "Show");
        assert_eq!(validated.created_at, now);
        assert_eq!(validated.updated_at, now);
    }

    #[test]
    fn test_supplied_timestamps_are_kept() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let payload = EventPayload {
            created_at: Some(created),
            ..valid_payload()
        };

        let validated = validate_event(payload, Utc::now()).unwrap();
        assert_eq!(validated.created_at, created);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let payload = EventPayload {
            price: Some(Decimal::new(-1, 2)),
            ..valid_payload()
        };

        let errors = validate_event(payload, Utc::now()).unwrap_err();
        assert!(errors.has_field("price"));
    }

    #[test]
    fn test_zero_price_is_allowed() {
        let payload = EventPayload {
            price: Some(Decimal::ZERO),
            ..valid_payload()
        };

        assert!(validate_event(payload, Utc::now()).is_ok());
    }

    #[test]
    fn test_bad_photo_url_is_reported_by_index() {
        let payload = EventPayload {
            photos: Some(vec![
                "https://x/a.png".to_string(),
                "not a url".to_string(),
            ]),
            ..valid_payload()
        };

        let errors = validate_event(payload, Utc::now()).unwrap_err();
        assert!(errors.has_field("photos[1]"));
        assert!(!errors.has_field("photos[0]"));
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let payload = EventPayload {
            title: Some("   ".to_string()),
            ..valid_payload()
        };

        let errors = validate_event(payload, Utc::now()).unwrap_err();
        assert!(errors.has_field("title"));
    }

    #[test]
    fn test_empty_payload_reports_every_missing_field() {
        let errors = validate_event(EventPayload::default(), Utc::now()).unwrap_err();

        for field in ["title", "description", "price", "location", "mapData", "photos"] {
            assert!(errors.has_field(field), "missing issue for {field}");
        }
        assert_eq!(errors.issues().len(), 6);
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        let payload = EventPayload {
            map_data: Some(Coordinates::new(f64::NAN, 1.0)),
            ..valid_payload()
        };

        let errors = validate_event(payload, Utc::now()).unwrap_err();
        assert!(errors.has_field("mapData"));
    }

    #[test]
    fn test_display_joins_issues() {
        let mut errors = ValidationErrors::single("title", "is required");
        errors.push("price", "is required");

        assert_eq!(errors.to_string(), "title: is required; price: is required");
    }

    fn signup() -> SignupPayload {
        SignupPayload {
            email: Some("  Ada@Example.com ".to_string()),
            password: Some("correct horse".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
        }
    }

    #[test]
    fn test_signup_normalizes_email() {
        let validated = validate_signup(signup()).unwrap();
        assert_eq!(validated.email, "ada@example.com");
        assert_eq!(validated.first_name, "Ada");
    }

    #[test]
    fn test_signup_rejects_short_password_and_bad_email() {
        let payload = SignupPayload {
            email: Some("no-at-sign".to_string()),
            password: Some("short".to_string()),
            ..signup()
        };

        let errors = validate_signup(payload).unwrap_err();
        assert!(errors.has_field("email"));
        assert!(errors.has_field("password"));
        assert_eq!(errors.issues().len(), 2);
    }

    #[test]
    fn test_signup_requires_names() {
        let payload = SignupPayload {
            first_name: None,
            last_name: Some(" ".to_string()),
            ..signup()
        };

        let errors = validate_signup(payload).unwrap_err();
        assert!(errors.has_field("firstName"));
        assert!(errors.has_field("lastName"));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = validate_login(LoginPayload::default()).unwrap_err();
        assert!(errors.has_field("email"));
        assert!(errors.has_field("password"));

        let (email, password) = validate_login(LoginPayload {
            email: Some("ADA@example.com".to_string()),
            password: Some("pw".to_string()),
        })
        .unwrap();
        assert_eq!(email, "ada@example.com");
        assert_eq!(password, "pw");
    }
}
