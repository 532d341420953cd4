//! Generic field validators shared across resources.
//!
//! Each validator takes raw (possibly empty) input and produces a
//! [`Validation`] carrying either the typed value or a non-empty list of
//! human-readable messages. Validators never panic; malformed input is a
//! normal outcome here.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use url::Url;
use uuid::Uuid;

use super::validation::{Validation, invalid, valid};

/// Failure message for malformed entity identifiers.
pub const INVALID_ID_MESSAGE: &str = "Invalid identifier provided.";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
fn email_regex() -> &'static Regex {
    // Deliberately loose; deliverability is the mail server's problem.
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"^\+?[0-9\s().-]{7,20}$").expect("phone pattern"))
}

/// Validate a required free-text field with inclusive length bounds.
pub fn validate_generic_string(
    raw: &str,
    name: &str,
    min: usize,
    max: usize,
) -> Validation<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return invalid(vec![format!("{name} is required.")]);
    }
    let length = trimmed.chars().count();
    if length < min || length > max {
        return invalid(vec![format!(
            "{name} must be between {min} and {max} characters."
        )]);
    }
    valid(trimmed.to_owned())
}

/// Validate an optional free-text field; empty input is `Valid(None)`.
pub fn validate_optional_string(raw: &str, name: &str, max: usize) -> Validation<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return valid(None);
    }
    validate_generic_string(trimmed, name, 1, max).map(Some)
}

/// Validate a required email address.
pub fn validate_email(raw: &str) -> Validation<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return invalid(vec!["Contact email is required.".to_owned()]);
    }
    if trimmed.chars().count() > 254 || !email_regex().is_match(trimmed) {
        return invalid(vec!["Please enter a valid email address.".to_owned()]);
    }
    valid(trimmed.to_owned())
}

/// Validate an optional phone number.
pub fn validate_optional_phone(raw: &str) -> Validation<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return valid(None);
    }
    let has_digits = trimmed.chars().filter(char::is_ascii_digit).count() >= 7;
    if has_digits && phone_regex().is_match(trimmed) {
        valid(Some(trimmed.to_owned()))
    } else {
        invalid(vec!["Please enter a valid phone number.".to_owned()])
    }
}

/// Validate an optional http(s) URL.
pub fn validate_optional_url(raw: &str) -> Validation<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return valid(None);
    }
    match Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            valid(Some(trimmed.to_owned()))
        }
        _ => invalid(vec!["Please enter a valid URL.".to_owned()]),
    }
}

/// Validate an entity identifier supplied in a request path or body.
pub fn validate_uuid(raw: &str) -> Validation<Uuid> {
    Uuid::parse_str(raw.trim()).map_or_else(|_| invalid(vec![INVALID_ID_MESSAGE.to_owned()]), valid)
}

/// Validate a required RFC 3339 timestamp.
pub fn validate_date(raw: &str, name: &str) -> Validation<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return invalid(vec![format!("{name} is required.")]);
    }
    DateTime::parse_from_rfc3339(trimmed).map_or_else(
        |_| invalid(vec![format!("{name} must be a valid date (RFC 3339).")]),
        |parsed| valid(parsed.with_timezone(&Utc)),
    )
}

/// Validate an optional RFC 3339 timestamp; empty input is `Valid(None)`.
pub fn validate_optional_date(raw: &str, name: &str) -> Validation<Option<DateTime<Utc>>> {
    if raw.trim().is_empty() {
        return valid(None);
    }
    validate_date(raw, name).map(Some)
}

/// Validate an integer field with inclusive bounds.
pub fn validate_integer(raw: i64, name: &str, min: i64, max: i64) -> Validation<i64> {
    if raw < min || raw > max {
        return invalid(vec![format!("{name} must be between {min} and {max}.")]);
    }
    valid(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Acme Consulting", true)]
    #[case("  Acme  ", true)]
    #[case("", false)]
    #[case("   ", false)]
    fn generic_string_requires_content(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(
            validate_generic_string(raw, "Legal name", 1, 100).is_valid(),
            ok
        );
    }

    #[rstest]
    fn generic_string_enforces_bounds() {
        let too_long = "x".repeat(11);
        let result = validate_generic_string(&too_long, "City", 1, 10);
        assert_eq!(
            result.err(),
            Some(vec!["City must be between 1 and 10 characters.".to_owned()])
        );
    }

    #[rstest]
    #[case("vendor@example.com", true)]
    #[case("first.last@sub.example.co", true)]
    #[case("bad-email", false)]
    #[case("missing@tld", false)]
    #[case("", false)]
    fn email_format(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(validate_email(raw).is_valid(), ok);
    }

    #[rstest]
    #[case("https://example.com", true)]
    #[case("http://example.com/path?q=1", true)]
    #[case("ftp://example.com", false)]
    #[case("not a url", false)]
    fn url_format(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(validate_optional_url(raw).is_valid(), ok);
    }

    #[rstest]
    fn optional_url_accepts_absent_input() {
        assert_eq!(validate_optional_url(""), valid(None));
    }

    #[rstest]
    #[case("+1 604 555 0199", true)]
    #[case("(604) 555-0199", true)]
    #[case("911", false)]
    #[case("call me", false)]
    fn phone_format(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(validate_optional_phone(raw).is_valid(), ok);
    }

    #[rstest]
    fn uuid_rejects_garbage() {
        assert_eq!(
            validate_uuid("not-a-uuid").err(),
            Some(vec![INVALID_ID_MESSAGE.to_owned()])
        );
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_valid());
    }

    #[rstest]
    fn date_parses_rfc3339() {
        assert!(validate_date("2026-03-01T09:00:00Z", "Start date").is_valid());
        assert_eq!(
            validate_date("March 1st", "Start date").err(),
            Some(vec![
                "Start date must be a valid date (RFC 3339).".to_owned()
            ])
        );
        assert_eq!(
            validate_date("", "Start date").err(),
            Some(vec!["Start date is required.".to_owned()])
        );
    }

    #[rstest]
    #[case(1, true)]
    #[case(70_000, true)]
    #[case(0, false)]
    #[case(70_001, false)]
    fn integer_bounds(#[case] raw: i64, #[case] ok: bool) {
        assert_eq!(validate_integer(raw, "Reward", 1, 70_000).is_valid(), ok);
    }
}
