//! Account registration form and per-field validation errors.
//!
//! The form is checked locally before anything is sent; the server may still
//! reject it, in which case its per-field messages are parsed into the same
//! [`FieldErrors`] shape.

use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use std::fmt;

/// Key under which messages that belong to no single field are collected.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

const PASSWORD_MISMATCH: &str = "Passwords do not match";
const TERMS_REQUIRED: &str = "You must agree to the terms and conditions";
const FALLBACK_MESSAGE: &str = "Registration failed";

/// Validation messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages recorded for a field.
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates over `(field, messages)` in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the single message a registration screen shows.
    ///
    /// Email problems win over password problems, which win over general
    /// messages; anything else falls back to the first recorded message.
    #[must_use]
    pub fn primary_message(&self) -> String {
        ["email", "password", NON_FIELD_ERRORS]
            .iter()
            .find_map(|key| self.field(key).first())
            .or_else(|| self.0.values().find_map(|msgs| msgs.first()))
            .cloned()
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
    }

    /// Parses a server error body.
    ///
    /// Accepts `{"field": ["msg", ..]}`, `{"field": "msg"}` and a top-level
    /// `{"detail": "msg"}`, which is filed under [`NON_FIELD_ERRORS`].
    #[must_use]
    pub fn from_response_body(body: &JsonValue) -> Self {
        let mut errors = Self::new();
        match body {
            JsonValue::Object(map) => {
                for (key, value) in map {
                    let field = if key == "detail" {
                        NON_FIELD_ERRORS
                    } else {
                        key.as_str()
                    };
                    collect_messages(value, &mut |msg| errors.add(field, msg));
                }
            }
            JsonValue::String(text) if !text.trim().is_empty() => {
                errors.add(NON_FIELD_ERRORS, text.trim());
            }
            _ => {}
        }
        errors
    }
}

fn collect_messages(value: &JsonValue, push: &mut dyn FnMut(String)) {
    match value {
        JsonValue::String(s) => push(s.clone()),
        JsonValue::Array(items) => {
            for item in items {
                collect_messages(item, push);
            }
        }
        JsonValue::Object(map) => {
            for nested in map.values() {
                collect_messages(nested, push);
            }
        }
        JsonValue::Null => {}
        other => push(other.to_string()),
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// The sign-up form a visitor fills in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub address: String,
    pub age: Option<u32>,
    pub sex: String,
    pub agree_terms: bool,
}

impl RegistrationForm {
    /// Checks the form before submission.
    ///
    /// # Errors
    ///
    /// Returns every problem found, keyed by field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                errors.add(field, "This field is required.");
            }
        }

        if self.password != self.confirm_password {
            errors.add("password", PASSWORD_MISMATCH);
        }
        if !self.agree_terms {
            errors.add("agree_terms", TERMS_REQUIRED);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Builds the JSON body sent to the register endpoint.
    #[must_use]
    pub fn to_request_body(&self) -> JsonValue {
        json!({
            "first_name": self.first_name.trim(),
            "last_name": self.last_name.trim(),
            "email": self.email.trim(),
            "password": self.password,
            "confirmPassword": self.confirm_password,
            "address": self.address.trim(),
            "age": self.age,
            "sex": self.sex,
        })
    }
}
