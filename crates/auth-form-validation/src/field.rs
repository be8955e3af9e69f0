//! Form field identifiers and the per-field error map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a single form field across all auth forms.
///
/// Serializes to the camelCase field names the presentation layer binds
/// its inputs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
    Phone,
    Otp,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::Phone => "phone",
            Field::Otp => "otp",
        };
        f.write_str(name)
    }
}

/// Mapping from field to error message. An absent key means the field is
/// valid; an empty map means the whole form is valid.
///
/// Backed by a `BTreeMap` so iteration order (and serialized output) is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    /// Creates an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no field is flagged.
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    /// Flags a field with an error message, replacing any prior message.
    pub fn flag(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Clears the error for a single field. Returns true if one was present.
    pub fn clear(&mut self, field: Field) -> bool {
        self.0.remove(&field).is_some()
    }

    /// Removes all errors.
    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    /// Returns the error message for a field, if any.
    pub fn message(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Returns true if the field is flagged.
    pub fn is_flagged(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Number of flagged fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no field is flagged.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over flagged fields and their messages in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}
