//! Client-side credential checks, run before any network call

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 40;

/// Validation errors keyed by form field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    if email.trim().is_empty() {
        errors.email = Some("Email is required.".to_string());
    } else if !EMAIL_RE.is_match(email) {
        errors.email = Some("Email format is not valid.".to_string());
    }

    let length = password.chars().count();
    if password.trim().is_empty() {
        errors.password = Some("Password is required.".to_string());
    } else if length < MIN_PASSWORD_LEN {
        errors.password = Some(format!("Must be at least {} characters.", MIN_PASSWORD_LEN));
    } else if length > MAX_PASSWORD_LEN {
        errors.password = Some(format!("Must be at most {} characters.", MAX_PASSWORD_LEN));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
