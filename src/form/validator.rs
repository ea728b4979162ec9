//! Field validation.
//!
//! Rules apply in declaration order and the first failure wins, so a missing
//! required value is always reported before a format problem.

use once_cell::sync::Lazy;
use regex::Regex;

use super::schema::{FieldDescriptor, InputKind};

pub const MSG_REQUIRED: &str = "This field is required";
pub const MSG_INVALID_FORMAT: &str = "Invalid format";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_INVALID_PHONE: &str = "Please enter a valid UK phone number";
pub const MSG_ODS_EMPTY: &str = "Please enter an ODS code";
pub const MSG_ODS_FORMAT: &str = "Invalid format. Use format like AB123";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
static UK_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0|\+?44)[71]\d{8,9}$").expect("phone regex"));
static GPHC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{7}$").expect("gphc regex"));
static ODS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,3}\d{2,3}$").expect("ods regex"));

/// Outcome of validating a single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub valid: bool,
    pub message: String,
}

impl FieldCheck {
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Validates a raw value against its descriptor.
pub fn validate(descriptor: &FieldDescriptor, raw: &str) -> FieldCheck {
    let value = raw.trim();

    if descriptor.required && value.is_empty() {
        return FieldCheck::fail(MSG_REQUIRED);
    }

    if !value.is_empty() {
        if let Some(pattern) = descriptor.pattern {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(value) {
                        return FieldCheck::fail(
                            descriptor.validation_msg.unwrap_or(MSG_INVALID_FORMAT),
                        );
                    }
                }
                Err(err) => {
                    tracing::debug!(pattern, %err, "skipping unparsable field pattern");
                }
            }
        }

        match descriptor.kind {
            InputKind::Email => {
                if !EMAIL_RE.is_match(value) {
                    return FieldCheck::fail(MSG_INVALID_EMAIL);
                }
            }
            InputKind::Telephone => {
                if !UK_PHONE_RE.is_match(value) {
                    return FieldCheck::fail(
                        descriptor.validation_msg.unwrap_or(MSG_INVALID_PHONE),
                    );
                }
            }
            InputKind::Text | InputKind::Address => {}
        }
    }

    FieldCheck::pass()
}

/// Validates a GPHC registration number: exactly seven digits.
///
/// The message distinguishes a seven-character value containing non-digits
/// from one of the wrong length.
pub fn check_gphc(raw: &str) -> FieldCheck {
    let value = raw.trim();
    if GPHC_RE.is_match(value) {
        return FieldCheck::pass();
    }
    if value.len() == 7 {
        FieldCheck::fail("GPHC number must be exactly 7 digits")
    } else {
        FieldCheck::fail("GPHC number must be 7 digits")
    }
}

pub fn is_valid_gphc(raw: &str) -> bool {
    GPHC_RE.is_match(raw.trim())
}

/// Normalizes an ODS code for comparison and storage: trim + uppercase.
pub fn normalize_ods(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn is_valid_ods(normalized: &str) -> bool {
    ODS_RE.is_match(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::{contact_fields, FieldDescriptor, InputKind};

    #[test]
    fn required_empty_fails_first() {
        let field = FieldDescriptor::new("name", "Name", InputKind::Email);
        let check = validate(&field, "   ");
        assert!(!check.valid);
        assert_eq!(check.message, MSG_REQUIRED);
    }

    #[test]
    fn optional_empty_passes() {
        let field = contact_fields().field("invoiceEmail").expect("field");
        assert!(validate(field, "").valid);
    }

    #[test]
    fn email_shape_enforced() {
        let field = contact_fields().field("email").expect("field");
        assert!(validate(field, "jane@example.org").valid);
        let check = validate(field, "jane@example");
        assert!(!check.valid);
        assert_eq!(check.message, MSG_INVALID_EMAIL);
    }

    #[test]
    fn telephone_pattern_message_comes_from_descriptor() {
        let field = contact_fields().field("telephone").expect("field");
        assert!(validate(field, "07123456789").valid);
        assert!(validate(field, "+447123456789").valid);
        assert!(validate(field, "01234567890").valid);
        let check = validate(field, "0555123456");
        assert!(!check.valid);
        assert!(check.message.starts_with("Please enter a valid UK phone number (mobile"));
    }

    #[test]
    fn plain_pattern_falls_back_to_generic_message() {
        let field =
            FieldDescriptor::new("code", "Code", InputKind::Text).with_pattern(r"^\d{4}$");
        let check = validate(&field, "12a4");
        assert!(!check.valid);
        assert_eq!(check.message, MSG_INVALID_FORMAT);
    }

    #[test]
    fn gphc_messages_distinguish_length_from_content() {
        assert!(check_gphc("1234567").valid);
        let seven_chars = check_gphc("12345a7");
        assert_eq!(seven_chars.message, "GPHC number must be exactly 7 digits");
        let short = check_gphc("123");
        assert_eq!(short.message, "GPHC number must be 7 digits");
    }

    #[test]
    fn ods_normalization_and_shape() {
        assert_eq!(normalize_ods("  ab123 "), "AB123");
        assert!(is_valid_ods("AB123"));
        assert!(is_valid_ods("ABC12"));
        assert!(!is_valid_ods("AB1"));
        assert!(!is_valid_ods("ab123"));
        assert!(!is_valid_ods("ABCD123"));
    }
}
