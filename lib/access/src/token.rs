//! Unverified reading of access token claims.
//!
//! The signature is never checked here; the server remains the authority on
//! whether a token is valid. Claims are read only to decide whether a refresh
//! is worth attempting before a request and to show session details.

use crate::error::ClaimsError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// The claims of interest in a JWT access token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessClaims {
    /// Expiry, seconds since the epoch.
    #[serde(default)]
    exp: Option<i64>,
    /// Subject; numeric or string depending on backend settings.
    #[serde(default)]
    user_id: Option<JsonValue>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    jti: Option<String>,
}

impl AccessClaims {
    /// Decodes the payload segment of a JWT.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not three dot-separated segments or
    /// the payload is not base64url-encoded JSON.
    pub fn decode(token: &str) -> Result<Self, ClaimsError> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
            _ => return Err(ClaimsError::NotAJwt),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClaimsError::Encoding {
                reason: e.to_string(),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| ClaimsError::Payload {
            reason: e.to_string(),
        })
    }

    /// Returns when the token expires, if it says.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Returns true if the token has an expiry at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    /// Returns the subject as text.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        match self.user_id.as_ref()? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    #[must_use]
    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    #[must_use]
    pub fn jti(&self) -> Option<&str> {
        self.jti.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn token_with(payload: &JsonValue) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decodes_simplejwt_access_token() {
        let token = token_with(&json!({
            "token_type": "access",
            "exp": 1_767_225_600,
            "jti": "abc123",
            "user_id": 7
        }));
        let claims = AccessClaims::decode(&token).expect("decode");

        assert_eq!(claims.user_id().as_deref(), Some("7"));
        assert_eq!(claims.token_type(), Some("access"));
        assert_eq!(claims.jti(), Some("abc123"));
        assert_eq!(
            claims.expires_at(),
            Utc.timestamp_opt(1_767_225_600, 0).single()
        );
    }

    #[test]
    fn expiry_comparison() {
        let token = token_with(&json!({"exp": 1_000}));
        let claims = AccessClaims::decode(&token).expect("decode");

        let before = DateTime::from_timestamp(999, 0).expect("ts");
        let after = DateTime::from_timestamp(1_000, 0).expect("ts");
        assert!(!claims.is_expired_at(before));
        assert!(claims.is_expired_at(after));
    }

    #[test]
    fn missing_exp_never_expires() {
        let claims = AccessClaims::decode(&token_with(&json!({}))).expect("decode");
        assert!(!claims.is_expired_at(Utc::now()));
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn opaque_token_is_not_a_jwt() {
        assert_eq!(AccessClaims::decode("AAA"), Err(ClaimsError::NotAJwt));
        assert_eq!(AccessClaims::decode("a..c"), Err(ClaimsError::NotAJwt));
        assert_eq!(AccessClaims::decode("a.b.c.d"), Err(ClaimsError::NotAJwt));
    }

    #[test]
    fn bad_payload_is_reported() {
        assert!(matches!(
            AccessClaims::decode("a.!!!.c"),
            Err(ClaimsError::Encoding { .. })
        ));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("nope"));
        assert!(matches!(
            AccessClaims::decode(&not_json),
            Err(ClaimsError::Payload { .. })
        ));
    }
}
