//! Error types for resource requests.

use lawfirm_portal_access::{FieldErrors, Route};
use std::fmt;

/// Errors from resource endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// No access token, or the server rejected it.
    Unauthenticated,
    /// Signed in, but this account may not do that.
    Forbidden { message: String },
    /// No record at that path.
    NotFound { path: String },
    /// The server or local checks rejected the payload.
    Invalid(FieldErrors),
    /// The server answered with a status this client does not expect.
    UnexpectedStatus { path: String, status: u16 },
    /// The server answered successfully but the body had the wrong shape.
    Malformed { path: String, reason: String },
    /// No response arrived from the server.
    Network { reason: String },
}

impl ResourceError {
    /// Returns where the host should navigate in response, if anywhere.
    #[must_use]
    pub fn redirect_target(&self) -> Option<Route> {
        match self {
            Self::Unauthenticated => Some(Route::Login),
            _ => None,
        }
    }

    /// Returns the message a screen should display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please sign in to continue.".to_string(),
            Self::Forbidden { message } => message.clone(),
            Self::NotFound { .. } => "The requested record was not found.".to_string(),
            Self::Invalid(fields) => fields.to_string(),
            Self::UnexpectedStatus { status, .. } => {
                format!("The request failed (HTTP {status}). Please try again.")
            }
            Self::Malformed { .. } => "Unexpected response from the server.".to_string(),
            Self::Network { .. } => "Unable to reach the server. Please try again.".to_string(),
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "not authenticated"),
            Self::Forbidden { message } => write!(f, "forbidden: {message}"),
            Self::NotFound { path } => write!(f, "'{path}' not found"),
            Self::Invalid(fields) => write!(f, "invalid request: {fields}"),
            Self::UnexpectedStatus { path, status } => {
                write!(f, "unexpected HTTP {status} from '{path}'")
            }
            Self::Malformed { path, reason } => {
                write!(f, "malformed response from '{path}': {reason}")
            }
            Self::Network { reason } => write!(f, "network error: {reason}"),
        }
    }
}

impl std::error::Error for ResourceError {}
