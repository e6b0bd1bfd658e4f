use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;

/// Collects per-field validation messages across all checks of a request, so
/// the client sees every problem at once rather than one at a time.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }

    #[cfg(test)]
    pub fn messages_for(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Syntactic URL check: must parse and carry a host.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).map(|u| u.has_host()).unwrap_or(false)
}

/// Length bounds in characters, not bytes. An empty value always fails the
/// lower bound, which doubles as the required-field check.
pub fn check_length(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(field, format!("The {field} must be at least {min} characters"));
    } else if len > max {
        errors.push(field, format!("The {field} must not be greater than {max} characters"));
    }
}

pub fn check_required(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, format!("The {field} field is required"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_email() {
        assert!(is_valid_email("admin@gmail.com"));
    }

    #[test]
    fn rejects_email_without_domain_dot_or_at() {
        assert!(!is_valid_email("admin@gmail"));
        assert!(!is_valid_email("admin.gmail.com"));
        assert!(!is_valid_email("a b@gmail.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn accepts_http_and_https_urls() {
        assert!(is_valid_url("https://example.com/image.png"));
        assert!(is_valid_url("http://example.com/a?b=c"));
    }

    #[test]
    fn rejects_non_urls() {
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("example.com/image.png"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let mut errors = FieldErrors::new();
        check_length(&mut errors, "name", "abc", 3, 20);
        check_length(&mut errors, "subtitle", &"x".repeat(50), 6, 50);
        assert!(errors.is_empty());
    }

    #[test]
    fn length_check_flags_too_short_and_too_long() {
        let mut errors = FieldErrors::new();
        check_length(&mut errors, "name", "ab", 3, 20);
        check_length(&mut errors, "subtitle", &"x".repeat(51), 6, 50);
        assert!(errors.messages_for("name").is_some());
        assert!(errors.messages_for("subtitle").is_some());
    }

    #[test]
    fn empty_value_fails_lower_bound() {
        let mut errors = FieldErrors::new();
        check_length(&mut errors, "password", "", 6, 20);
        assert!(!errors.is_empty());
    }

    #[test]
    fn required_check_rejects_blank() {
        let mut errors = FieldErrors::new();
        check_required(&mut errors, "description", "   ");
        assert_eq!(
            errors.messages_for("description").map(|v| v.len()),
            Some(1)
        );
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn serializes_as_field_map() {
        let mut errors = FieldErrors::new();
        errors.push("email", "The email has already been taken");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json["email"][0],
            serde_json::json!("The email has already been taken")
        );
    }
}
