//! Client-side form checks.
//!
//! Every write payload is validated before a request goes out, mirroring the
//! constraints the API enforces, so obvious mistakes surface next to the form
//! instead of as a server round-trip.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Implemented by every write payload
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub fn required(field: &'static str, value: &str, label: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{} is required", label)));
    }
    Ok(())
}

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Same shape as the API's `^\+?1?\d{9,15}$`, with a 10-15 character total
pub fn phone(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let err = || ValidationError::new(field, "Enter a valid phone number");

    let len = value.chars().count();
    if !(10..=15).contains(&len) {
        return Err(err());
    }

    let digits = value.strip_prefix('+').unwrap_or(value);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }

    // An optional leading "1" may precede the 9-15 digit body
    let body_ok = |s: &str| (9..=15).contains(&s.len());
    let ok = body_ok(digits) || digits.strip_prefix('1').map(body_ok).unwrap_or(false);
    if !ok {
        return Err(err());
    }
    Ok(())
}

/// Loose address check: one `@`, non-empty local part, dotted domain
pub fn email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let err = || ValidationError::new(field, "Enter a valid email address");

    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(err());
    };
    if local.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(err());
    }
    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !domain.ends_with('.') => Ok(()),
        _ => Err(err()),
    }
}

pub fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(())
}

pub fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }
    Ok(())
}
