//! Form validation shared by every entity.
//!
//! Each submitted form implements [`Validate`], turning raw input into a
//! cleaned value or a set of per-field messages that are reported back to
//! the submitter unchanged.

use std::collections::BTreeMap;

use serde::Serialize;

pub const REQUIRED: &str = "This field is required.";
pub const NON_FIELD: &str = "__all__";

/// Lowest accepted `years_of_experience` for a redactor.
pub const MIN_YEARS_OF_EXPERIENCE: i64 = 3;
pub const YEARS_OF_EXPERIENCE_TOO_LOW: &str = "Years of experience must be at least 3!";

/// Per-field error messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Return `value` when no error was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// First message overall, used as the human-readable summary.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .next()
            .and_then(|(field, messages)| {
                messages.first().map(|m| {
                    if field == NON_FIELD {
                        m.clone()
                    } else {
                        format!("{}: {}", field, m)
                    }
                })
            })
            .unwrap_or_else(|| "Invalid input".to_string())
    }
}

/// A submitted form that can be cleaned into its persisted shape.
pub trait Validate {
    type Clean;

    fn validate(self) -> Result<Self::Clean, FieldErrors>;
}

/// Trim a required text value, recording an error when it is blank or too long.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max_length: Option<usize>,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        check_length(errors, field, trimmed, max_length);
    }
    trimmed.to_string()
}

/// Trim an optional text value, recording an error only when it is too long.
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max_length: Option<usize>,
) -> String {
    let trimmed = value.trim();
    check_length(errors, field, trimmed, max_length);
    trimmed.to_string()
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max_length: Option<usize>) {
    if let Some(max) = max_length {
        let length = value.chars().count();
        if length > max {
            errors.add(
                field,
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, length
                ),
            );
        }
    }
}

/// Check the experience floor a redactor must meet on creation and on update.
pub fn years_of_experience(errors: &mut FieldErrors, value: Option<i64>) -> i64 {
    match value {
        None => {
            errors.add("yearsOfExperience", REQUIRED);
            0
        }
        Some(years) if years < MIN_YEARS_OF_EXPERIENCE => {
            errors.add("yearsOfExperience", YEARS_OF_EXPERIENCE_TOO_LOW);
            years
        }
        Some(years) => years,
    }
}
