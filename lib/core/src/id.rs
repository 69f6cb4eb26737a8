//! Strongly-typed ID types for backend records.
//!
//! The backend assigns positive integer primary keys. Each record kind gets its
//! own wrapper so a case id can never be passed where a user id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed ID wrapper around a backend primary key.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a primary key.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying primary key.
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// Returns the human-readable record kind, used in messages.
            #[must_use]
            pub const fn kind() -> &'static str {
                $kind
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        reason: e.to_string(),
                    })
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user account (admin, lawyer or client).
    UserId,
    "user"
);

define_id!(
    /// Unique identifier for an appointment request.
    AppointmentId,
    "appointment"
);

define_id!(
    /// Unique identifier for a contact form message.
    ContactMessageId,
    "contact message"
);

define_id!(
    /// Unique identifier for a case summary.
    CaseId,
    "case summary"
);

define_id!(
    /// Unique identifier for an update posted on a case.
    CaseUpdateId,
    "case update"
);

define_id!(
    /// Unique identifier for an uploaded case document.
    DocumentId,
    "document"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_key() {
        assert_eq!(CaseId::new(42).to_string(), "42");
    }

    #[test]
    fn parse_trims_whitespace() {
        let id: UserId = " 7 ".parse().expect("should parse");
        assert_eq!(id.get(), 7);
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let err = "LF-2025-0342".parse::<CaseId>().unwrap_err();
        assert_eq!(err.id_type, "CaseId");
        assert!(err.to_string().contains("CaseId"));
    }

    #[test]
    fn kind_names_the_record() {
        assert_eq!(DocumentId::kind(), "document");
        assert_eq!(ContactMessageId::kind(), "contact message");
    }

    #[test]
    fn id_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(AppointmentId::new(1));
        set.insert(AppointmentId::new(2));
        set.insert(AppointmentId::new(1));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serializes_as_number() {
        let json = serde_json::to_string(&CaseUpdateId::new(9)).expect("serialize");
        assert_eq!(json, "9");
        let parsed: CaseUpdateId = serde_json::from_str("9").expect("deserialize");
        assert_eq!(parsed, CaseUpdateId::new(9));
    }
}
