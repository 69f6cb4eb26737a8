//! Error types for the access crate.
//!
//! Errors are layered:
//! - `StorageError`: the durable token storage failed (wrapped in a rootcause `Report`)
//! - `TransportError`: no HTTP response arrived (wrapped in a rootcause `Report`)
//! - `ClaimsError`: an access token payload could not be decoded
//! - `AuthError`: what the gateway hands to screens, always with a user-facing message

use crate::register::FieldErrors;
use std::fmt;

/// Errors from the durable token storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is disabled or cannot be reached at all.
    Unavailable { reason: String },
    /// Reading or writing the backing file failed.
    Io { path: String, reason: String },
    /// The backing file exists but does not hold a key/value object.
    Corrupt { path: String, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "session storage unavailable: {reason}"),
            Self::Io { path, reason } => write!(f, "session file '{path}' I/O error: {reason}"),
            Self::Corrupt { path, reason } => {
                write!(f, "session file '{path}' is corrupt: {reason}")
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Errors raised before any HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    ClientBuild { details: String },
    /// The connection could not be established or was dropped.
    ConnectionFailed { endpoint: String, reason: String },
    /// The request exceeded the configured timeout.
    Timeout { endpoint: String },
    /// The response body could not be read.
    BodyRead { endpoint: String, reason: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientBuild { details } => write!(f, "failed to build HTTP client: {details}"),
            Self::ConnectionFailed { endpoint, reason } => {
                write!(f, "failed to connect to '{endpoint}': {reason}")
            }
            Self::Timeout { endpoint } => write!(f, "request to '{endpoint}' timed out"),
            Self::BodyRead { endpoint, reason } => {
                write!(f, "failed to read response from '{endpoint}': {reason}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors from decoding access token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    /// The token does not have the three dot-separated JWT segments.
    NotAJwt,
    /// The payload segment is not valid base64url.
    Encoding { reason: String },
    /// The payload is not the expected JSON object.
    Payload { reason: String },
}

impl fmt::Display for ClaimsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAJwt => write!(f, "token is not a JWT"),
            Self::Encoding { reason } => write!(f, "token payload is not base64url: {reason}"),
            Self::Payload { reason } => write!(f, "token payload is not valid JSON: {reason}"),
        }
    }
}

impl std::error::Error for ClaimsError {}

/// Errors surfaced by the authentication gateway.
///
/// Every variant maps to a human-readable message via [`AuthError::user_message`];
/// screens display that message instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server rejected the email/password pair.
    InvalidCredentials { message: String },
    /// No access token, or the server rejected it.
    Unauthorized,
    /// The refresh token was missing or rejected; the session has been cleared.
    RefreshFailed { reason: String },
    /// Registration input was rejected, per field.
    Validation(FieldErrors),
    /// No response arrived from the server.
    Network { reason: String },
    /// The server answered with a status this flow does not expect.
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// The server answered successfully but the body had the wrong shape.
    MalformedResponse { endpoint: String, reason: String },
    /// Tokens could not be written to session storage.
    SessionUnavailable { reason: String },
}

impl AuthError {
    /// Returns the message a screen should display for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials { message } => message.clone(),
            Self::Unauthorized | Self::RefreshFailed { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::Validation(fields) => fields.primary_message(),
            Self::Network { .. } => "Unable to reach the server. Please try again.".to_string(),
            Self::UnexpectedStatus {
                message: Some(message),
                ..
            } => message.clone(),
            Self::UnexpectedStatus { status, .. } => {
                format!("The request failed (HTTP {status}). Please try again.")
            }
            Self::MalformedResponse { .. } => "Unexpected response from the server.".to_string(),
            Self::SessionUnavailable { .. } => {
                "Unable to store your session on this device.".to_string()
            }
        }
    }

    /// Returns true if the caller should send the visitor to the sign-in route.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::RefreshFailed { .. })
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials { message } => write!(f, "invalid credentials: {message}"),
            Self::Unauthorized => write!(f, "not authenticated"),
            Self::RefreshFailed { reason } => write!(f, "token refresh failed: {reason}"),
            Self::Validation(fields) => write!(f, "validation failed: {fields}"),
            Self::Network { reason } => write!(f, "network error: {reason}"),
            Self::UnexpectedStatus {
                endpoint, status, ..
            } => write!(f, "unexpected HTTP {status} from '{endpoint}'"),
            Self::MalformedResponse { endpoint, reason } => {
                write!(f, "malformed response from '{endpoint}': {reason}")
            }
            Self::SessionUnavailable { reason } => write!(f, "session unavailable: {reason}"),
        }
    }
}

impl std::error::Error for AuthError {}
