//! Contact submission validation.
//!
//! [`validate`] is the single rule set applied to both public submissions and
//! admin edits. Every rule runs on every call, so a submission with three bad
//! fields reports three errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Email, EmailError};

/// Minimum name length, counted in characters after trimming.
pub const MIN_NAME_LENGTH: usize = 2;

/// Minimum message length, counted in characters after trimming.
pub const MIN_MESSAGE_LENGTH: usize = 10;

const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
const MESSAGE_TOO_SHORT: &str = "Message must be at least 10 characters";

/// A submitted contact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    /// The field's name as it appears in request and error bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

/// Raw contact fields as received from a client.
///
/// Every field is optional so that a missing key is reported as a validation
/// error rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactSubmission {
    /// Build a submission with all three fields present.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
        }
    }

    /// Validate the submission and produce trimmed, persistable fields.
    ///
    /// # Errors
    ///
    /// Returns the full error set when any rule fails.
    pub fn into_draft(self) -> Result<ContactDraft, ValidationErrors> {
        let errors = validate(&self);
        if !errors.is_empty() {
            return Err(errors);
        }

        // validate() guarantees each field is present and well-formed
        let name = self.name.unwrap_or_default().trim().to_owned();
        let message = self.message.unwrap_or_default().trim().to_owned();
        let email = Email::parse(self.email.unwrap_or_default().trim()).map_err(|e| {
            let mut errors = ValidationErrors::default();
            errors.insert(Field::Email, email_message(&e));
            errors
        })?;

        Ok(ContactDraft {
            name,
            email,
            message,
        })
    }
}

/// Validated and trimmed contact fields, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: Email,
    pub message: String,
}

/// Field-level validation failures, keyed by field.
///
/// Serializes as a JSON object such as `{"name": "Name must be at least 2 characters"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
    /// True when the submission passed every rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message recorded for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.insert(field, message);
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {message}", field.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// Check a submission against the contact rules.
///
/// Returns an empty set when the submission is acceptable. The email pattern
/// is matched against the value exactly as submitted; trimming only happens
/// when the draft is built for persistence.
#[must_use]
pub fn validate(submission: &ContactSubmission) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if trimmed_len(submission.name.as_deref()) < MIN_NAME_LENGTH {
        errors.insert(Field::Name, NAME_TOO_SHORT);
    }

    if let Err(e) = Email::parse(submission.email.as_deref().unwrap_or_default()) {
        errors.insert(Field::Email, email_message(&e));
    }

    if trimmed_len(submission.message.as_deref()) < MIN_MESSAGE_LENGTH {
        errors.insert(Field::Message, MESSAGE_TOO_SHORT);
    }

    errors
}

fn trimmed_len(value: Option<&str>) -> usize {
    value.map_or(0, |v| v.trim().chars().count())
}

const fn email_message(error: &EmailError) -> &'static str {
    match error {
        EmailError::Empty => "Email is required",
        EmailError::InvalidFormat => "Invalid email format",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_invalid_reports_every_error() {
        let errors = validate(&ContactSubmission::new("A", "bad", "short"));

        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.get(Field::Name),
            Some("Name must be at least 2 characters")
        );
        assert_eq!(errors.get(Field::Email), Some("Invalid email format"));
        assert_eq!(
            errors.get(Field::Message),
            Some("Message must be at least 10 characters")
        );
    }

    #[test]
    fn test_valid_submission_has_no_errors() {
        let errors = validate(&ContactSubmission::new(
            "Alice",
            "a@b.com",
            "This is a long enough message",
        ));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let errors = validate(&ContactSubmission::default());

        assert_eq!(
            errors.get(Field::Name),
            Some("Name must be at least 2 characters")
        );
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(
            errors.get(Field::Message),
            Some("Message must be at least 10 characters")
        );
    }

    #[test]
    fn test_empty_email_is_required_error() {
        let errors = validate(&ContactSubmission::new("Alice", "", "This is long enough"));
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_whitespace_email_is_format_error() {
        let errors = validate(&ContactSubmission::new("Alice", "   ", "This is long enough"));
        assert_eq!(errors.get(Field::Email), Some("Invalid email format"));
    }

    #[test]
    fn test_trailing_newline_in_email_is_format_error() {
        let errors = validate(&ContactSubmission::new(
            "Alice",
            "a@b.com\n",
            "This is long enough",
        ));
        assert_eq!(errors.get(Field::Email), Some("Invalid email format"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_lengths_are_measured_after_trimming() {
        let errors = validate(&ContactSubmission::new(
            "  A  ",
            "a@b.com",
            "   short   \n\t   ",
        ));
        assert!(errors.get(Field::Name).is_some());
        assert!(errors.get(Field::Message).is_some());
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        // two characters, four bytes
        let errors = validate(&ContactSubmission::new("Ée", "a@b.com", "ééééééééé"));
        assert!(errors.get(Field::Name).is_none());
        // nine characters, eighteen bytes
        assert!(errors.get(Field::Message).is_some());
    }

    #[test]
    fn test_boundary_lengths_pass() {
        let errors = validate(&ContactSubmission::new("Al", "a@b.com", "0123456789"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_is_deterministic() {
        let submission = ContactSubmission::new("x", "nope@", "");
        assert_eq!(validate(&submission), validate(&submission));
    }

    #[test]
    fn test_into_draft_trims_fields() {
        let draft =
            ContactSubmission::new("  Alice  ", "alice@example.com", "  Hello there, world  ")
                .into_draft()
                .unwrap();

        assert_eq!(draft.name, "Alice");
        assert_eq!(draft.email.as_str(), "alice@example.com");
        assert_eq!(draft.message, "Hello there, world");
    }

    #[test]
    fn test_into_draft_returns_errors() {
        let errors = ContactSubmission::new("A", "a@b.com", "This is long enough")
            .into_draft()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get(Field::Name).is_some());
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let errors = validate(&ContactSubmission::new("A", "a@b.com", "This is long enough"));
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Name must be at least 2 characters"})
        );
    }

    #[test]
    fn test_submission_deserializes_missing_and_null_fields() {
        let submission: ContactSubmission =
            serde_json::from_str(r#"{"name": "Alice", "email": null}"#).unwrap();
        assert_eq!(submission.name.as_deref(), Some("Alice"));
        assert!(submission.email.is_none());
        assert!(submission.message.is_none());
    }
}
