//! Field-level validation.
//!
//! Rules are declared with the `validator` derive on the entity; the
//! derive output is folded into [`FieldErrors`], an ordered
//! `field -> messages` collection that handlers can return as-is. An empty
//! collection means the value is valid.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Collection of validation messages keyed by snake_case field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `key`. Messages for the same key keep
    /// insertion order.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(key.into())
            .or_default()
            .push(message.into());
    }

    pub fn has_any(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.errors.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Move every message of `other` into `self`.
    pub fn append(&mut self, other: FieldErrors) {
        for (key, messages) in other.errors {
            self.errors.entry(key).or_default().extend(messages);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.errors.values().flatten() {
            if !first {
                f.write_str("\n")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        for (field, failures) in source.field_errors() {
            let key = field.to_string();
            for failure in failures.iter() {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{key} is invalid ({})", failure.code));
                errors.add(key.clone(), message);
            }
        }
        errors
    }
}

impl From<Result<(), validator::ValidationErrors>> for FieldErrors {
    fn from(result: Result<(), validator::ValidationErrors>) -> Self {
        match result {
            Ok(()) => FieldErrors::new(),
            Err(errors) => errors.into(),
        }
    }
}

/// Presence rule: the value must contain at least one non-whitespace
/// character. Use through `#[validate(custom(function = "string_is_present"))]`.
pub fn string_is_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Validation hooks run before an entity is written.
///
/// `validate` holds the rules that always apply. `validate_create` and
/// `validate_update` add rules specific to one write path and are empty
/// unless overridden.
pub trait Validatable {
    fn validate(&self) -> FieldErrors;

    fn validate_create(&self) -> FieldErrors {
        FieldErrors::new()
    }

    fn validate_update(&self) -> FieldErrors {
        FieldErrors::new()
    }

    /// Everything checked before an insert.
    fn validate_for_create(&self) -> FieldErrors {
        let mut errors = self.validate();
        errors.append(self.validate_create());
        errors
    }

    /// Everything checked before an update.
    fn validate_for_update(&self) -> FieldErrors {
        let mut errors = self.validate();
        errors.append(self.validate_update());
        errors
    }
}
