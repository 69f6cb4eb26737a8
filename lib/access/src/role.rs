//! Role and lawyer specialisation types.
//!
//! Every account carries exactly one role. The role decides which portal the
//! visitor lands on after sign-in and which protected routes they may open.
//! Unknown role strings from the server are preserved rather than rejected.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Account role as reported by the user endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Firm administrator; manages users, cases and messages.
    Admin,
    /// Lawyer; works assigned cases and appointments.
    Lawyer,
    /// Client; follows their own cases and documents.
    Client,
    /// Any value this client does not know about (including an empty one).
    Unrecognized(String),
}

impl Role {
    /// Parses a role string exactly as the backend spells it.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            "lawyer" => Self::Lawyer,
            "client" => Self::Client,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Returns the wire spelling of this role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Lawyer => "lawyer",
            Self::Client => "client",
            Self::Unrecognized(value) => value,
        }
    }

    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true for lawyer accounts.
    #[must_use]
    pub fn is_lawyer(&self) -> bool {
        matches!(self, Self::Lawyer)
    }

    /// Returns true for client accounts.
    #[must_use]
    pub fn is_client(&self) -> bool {
        matches!(self, Self::Client)
    }

    /// Returns true if the role is one of the three known roles.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Unrecognized(String::new())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Practice area of a lawyer account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LawyerType {
    Criminal,
    EstatePlanning,
    Tax,
    PersonalInjury,
    Corporate,
    Business,
    IntellectualProperty,
    Family,
    Other(String),
}

impl LawyerType {
    /// All known practice areas, in the order the admin screen lists them.
    pub const KNOWN: [LawyerType; 8] = [
        Self::Criminal,
        Self::EstatePlanning,
        Self::Tax,
        Self::PersonalInjury,
        Self::Corporate,
        Self::Business,
        Self::IntellectualProperty,
        Self::Family,
    ];

    /// Parses the wire spelling of a practice area.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "criminal" => Self::Criminal,
            "estate_planning" => Self::EstatePlanning,
            "tax" => Self::Tax,
            "personal_injury" => Self::PersonalInjury,
            "corporate" => Self::Corporate,
            "business" => Self::Business,
            "intellectual_property" => Self::IntellectualProperty,
            "family" => Self::Family,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Criminal => "criminal",
            Self::EstatePlanning => "estate_planning",
            Self::Tax => "tax",
            Self::PersonalInjury => "personal_injury",
            Self::Corporate => "corporate",
            Self::Business => "business",
            Self::IntellectualProperty => "intellectual_property",
            Self::Family => "family",
            Self::Other(value) => value,
        }
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Criminal => "Criminal Lawyer".to_string(),
            Self::EstatePlanning => "Estate Planning Lawyer".to_string(),
            Self::Tax => "Tax Lawyer".to_string(),
            Self::PersonalInjury => "Personal Injury Lawyer".to_string(),
            Self::Corporate => "Corporate Lawyer".to_string(),
            Self::Business => "Business Lawyer".to_string(),
            Self::IntellectualProperty => "Intellectual Property Lawyer".to_string(),
            Self::Family => "Family Lawyer".to_string(),
            Self::Other(value) => value.clone(),
        }
    }
}

impl From<String> for LawyerType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<LawyerType> for String {
    fn from(lawyer_type: LawyerType) -> Self {
        lawyer_type.as_str().to_string()
    }
}

impl fmt::Display for LawyerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserializes a role that may be missing or `null`.
pub fn deserialize_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Role::from)
        .unwrap_or_default())
}

/// Deserializes a lawyer type where `null` and `""` both mean "none".
pub fn deserialize_lawyer_type<'de, D>(
    deserializer: D,
) -> Result<Option<LawyerType>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|value| !value.is_empty())
        .map(LawyerType::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_roles() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("lawyer"), Role::Lawyer);
        assert_eq!(Role::parse("client"), Role::Client);
    }

    #[test]
    fn unknown_role_is_preserved() {
        let role = Role::parse("superadmin");
        assert_eq!(role, Role::Unrecognized("superadmin".to_string()));
        assert_eq!(role.as_str(), "superadmin");
        assert!(!role.is_recognized());
        assert!(!role.is_admin());
    }

    #[test]
    fn role_matching_is_case_sensitive() {
        assert!(!Role::parse("Admin").is_admin());
    }

    #[test]
    fn role_serialization_format() {
        let json = serde_json::to_string(&Role::Lawyer).expect("serialize");
        assert_eq!(json, "\"lawyer\"");

        let parsed: Role = serde_json::from_str("\"paralegal\"").expect("deserialize");
        assert_eq!(parsed, Role::Unrecognized("paralegal".to_string()));
    }

    #[test]
    fn default_role_is_unrecognized() {
        assert_eq!(Role::default(), Role::Unrecognized(String::new()));
    }

    #[test]
    fn lawyer_type_labels() {
        assert_eq!(LawyerType::Tax.label(), "Tax Lawyer");
        assert_eq!(
            LawyerType::parse("intellectual_property").label(),
            "Intellectual Property Lawyer"
        );
        assert_eq!(LawyerType::KNOWN.len(), 8);
    }

    #[test]
    fn lawyer_type_wire_format() {
        for known in LawyerType::KNOWN {
            assert_eq!(LawyerType::parse(known.as_str()), known);
        }
        let parsed: LawyerType = serde_json::from_str("\"maritime\"").expect("deserialize");
        assert_eq!(parsed, LawyerType::Other("maritime".to_string()));
    }
}
