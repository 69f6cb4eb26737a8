//! Records served by the portal's resource endpoints.
//!
//! Field names follow the backend models exactly (`service_needed`,
//! `preferred_date`, `preferred_time`, ...). Server-assigned fields are
//! optional so the same struct can describe a record before and after it is
//! created.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use lawfirm_portal_access::role::{deserialize_lawyer_type, deserialize_role};
use lawfirm_portal_access::{AuthenticatedUser, FieldErrors, LawyerType, Role};
use lawfirm_portal_core::{
    AppointmentId, CaseId, CaseUpdateId, ContactMessageId, DocumentId, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

fn into_result(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// A consultation request, as the admin sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: Option<AppointmentId>,
    /// The lawyer the consultation was booked with.
    #[serde(default)]
    pub lawyer: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub service_needed: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A booking submitted from the public appointment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lawyer: Option<UserId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_needed: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewAppointment {
    /// Checks the required fields before submission.
    ///
    /// # Errors
    ///
    /// Returns every blank required field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name, "This field is required.");
        require(&mut errors, "email", &self.email, "This field is required.");
        require(&mut errors, "phone", &self.phone, "This field is required.");
        require(
            &mut errors,
            "service_needed",
            &self.service_needed,
            "This field is required.",
        );
        into_result(errors)
    }
}

/// A message left through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactMessageId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub message: String,
}

impl ContactMessage {
    /// Applies the same blank checks the server does.
    ///
    /// # Errors
    ///
    /// Returns the name and message problems found.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name, "Name cannot be blank.");
        require(&mut errors, "message", &self.message, "Message cannot be blank.");
        into_result(errors)
    }
}

/// Lifecycle state of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Active,
    Closed,
    Settled,
    Pending,
}

impl CaseStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Settled => "settled",
            Self::Pending => "pending",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Closed => "Closed",
            Self::Settled => "Settled",
            Self::Pending => "Pending",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A case with its client, assigned lawyer and update timeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CaseSummary {
    pub id: CaseId,
    /// Firm reference, e.g. "LF-2025-0342".
    pub case_number: String,
    pub case_type: String,
    pub filed_date: NaiveDate,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub user: Option<AuthenticatedUser>,
    #[serde(default)]
    pub lawyer: Option<AuthenticatedUser>,
    #[serde(default)]
    pub updates: Vec<CaseUpdate>,
}

impl CaseSummary {
    /// Returns the most recent update, if any.
    #[must_use]
    pub fn latest_update(&self) -> Option<&CaseUpdate> {
        self.updates.iter().max_by_key(|u| u.updated_at)
    }
}

/// Payload for opening a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCaseSummary {
    pub case_number: String,
    pub case_type: String,
    pub filed_date: NaiveDate,
    pub status: CaseStatus,
    /// The client the case belongs to.
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lawyer_id: Option<UserId>,
}

/// An entry in a case's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CaseUpdateId>,
    pub case_summary: CaseId,
    pub title: String,
    pub details: String,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Document categories the upload form offers.
pub const DOCUMENT_KINDS: [&str; 5] = [
    "Medical Records",
    "Employment Records",
    "Insurance Information",
    "Signed Affidavit",
    "Photo Evidence",
];

/// An uploaded case document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// Uploader, as the server renders them.
    #[serde(default)]
    pub user: Option<String>,
    pub case_summary: CaseId,
    /// One of [`DOCUMENT_KINDS`].
    pub name: String,
    /// Download URL.
    pub file: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// A user row on the admin user list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManagedUser {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: Role,
    #[serde(default, deserialize_with = "deserialize_lawyer_type")]
    pub lawyer_type: Option<LawyerType>,
}

impl ManagedUser {
    /// Returns true if applying `assignment` would change nothing.
    #[must_use]
    pub fn already_has(&self, assignment: &RoleAssignment) -> bool {
        self.role == assignment.role && self.lawyer_type == assignment.lawyer_type
    }
}

/// A role change made by an admin.
///
/// A practice area is only kept for lawyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    role: Role,
    lawyer_type: Option<LawyerType>,
}

impl RoleAssignment {
    #[must_use]
    pub fn new(role: Role, lawyer_type: Option<LawyerType>) -> Self {
        let lawyer_type = if role.is_lawyer() { lawyer_type } else { None };
        Self { role, lawyer_type }
    }

    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    #[must_use]
    pub fn lawyer_type(&self) -> Option<&LawyerType> {
        self.lawyer_type.as_ref()
    }
}

/// A lawyer offered on the public appointment page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Lawyer {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl Lawyer {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
