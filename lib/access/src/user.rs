//! The identity returned by the "who am I" endpoint.
//!
//! `AuthenticatedUser` is a read-through projection: it is fetched fresh with
//! the current access token and never cached beyond a single guard resolution.

use chrono::{DateTime, Utc};
use lawfirm_portal_core::UserId;
use serde::{Deserialize, Serialize};

use crate::role::{LawyerType, Role, deserialize_lawyer_type, deserialize_role};

/// The signed-in account, as reported by `GET /user/`.
///
/// Missing or `null` fields deserialize to their empty form so that an
/// unexpected record shape never prevents role dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Backend primary key.
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    /// Account role; drives role dispatch.
    #[serde(default, deserialize_with = "deserialize_role")]
    role: Role,
    /// Practice area, only meaningful for lawyers.
    #[serde(default, deserialize_with = "deserialize_lawyer_type")]
    lawyer_type: Option<LawyerType>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    sex: Option<String>,
    /// Raw `date_joined` value; see [`AuthenticatedUser::joined_at`].
    #[serde(default)]
    date_joined: Option<String>,
}

impl AuthenticatedUser {
    /// Returns the backend id, if the record carried one.
    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns the account role.
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Returns the practice area. Always `None` unless the role is lawyer.
    #[must_use]
    pub fn lawyer_type(&self) -> Option<&LawyerType> {
        if self.role.is_lawyer() {
            self.lawyer_type.as_ref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|a| !a.is_empty())
    }

    #[must_use]
    pub fn age(&self) -> Option<u32> {
        self.age
    }

    #[must_use]
    pub fn sex(&self) -> Option<&str> {
        self.sex.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns when the account was created, if the server sent an RFC 3339 timestamp.
    #[must_use]
    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.date_joined
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Returns "First Last", falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}
