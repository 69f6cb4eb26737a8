//! The authentication gateway.
//!
//! `AuthGateway` performs the credential exchanges with the backend and is the
//! only writer of the [`SessionStore`]. Screens never navigate from here:
//! every operation returns a typed outcome carrying the route the host should
//! open next.

use crate::config::AuthEndpoints;
use crate::error::{AuthError, StorageError, TransportError};
use crate::register::{FieldErrors, RegistrationForm};
use crate::route::{Route, role_home};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::user::AuthenticatedUser;
use rootcause::prelude::Report;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::{debug, info, instrument, warn};

const LOGIN_FAILED: &str = "Login failed";
const REFRESH_FAILED: &str = "Token refresh failed";
const LOGOUT_OK: &str = "Logout successful";
const LOGOUT_FAILED: &str = "Logout API call failed";
const LOGOUT_ERROR: &str = "Logout API call error";

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The identity the new access token belongs to.
    pub user: AuthenticatedUser,
    /// The landing route for the user's role.
    pub destination: Route,
}

/// Result of a sign-out. Sign-out itself cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// True if the server confirmed the logout.
    pub remote_acknowledged: bool,
    /// What to tell the visitor.
    pub message: String,
    /// Always the sign-in route.
    pub destination: Route,
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    /// The created account, when the server echoed it back.
    pub user: Option<AuthenticatedUser>,
    /// Always the sign-in route; registration does not sign in.
    pub destination: Route,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

impl TokenPair {
    fn access(&self) -> Option<&str> {
        self.access.as_deref().filter(|t| !t.is_empty())
    }

    fn refresh(&self) -> Option<&str> {
        self.refresh.as_deref().filter(|t| !t.is_empty())
    }
}

/// Talks to the authentication endpoints and owns session writes.
pub struct AuthGateway<T> {
    transport: T,
    session: SessionStore,
    endpoints: AuthEndpoints,
}

impl<T: HttpTransport> AuthGateway<T> {
    /// Creates a gateway with the default endpoint paths.
    pub fn new(transport: T, session: SessionStore) -> Self {
        Self::with_endpoints(transport, session, AuthEndpoints::default())
    }

    /// Creates a gateway with custom endpoint paths.
    pub fn with_endpoints(transport: T, session: SessionStore, endpoints: AuthEndpoints) -> Self {
        Self {
            transport,
            session,
            endpoints,
        }
    }

    /// Returns the session store this gateway writes.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &AuthEndpoints {
        &self.endpoints
    }

    /// Returns true if an access token is stored. Never touches the network.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_present()
    }

    /// Returns the stored access token.
    pub fn access_token(&self) -> Option<String> {
        self.session.read()
    }

    /// Exchanges credentials for a token pair, stores it, then resolves the
    /// user's identity and landing route.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` on any 4xx; the session is left untouched.
    /// - `Network`, `UnexpectedStatus` or `MalformedResponse` before the save;
    ///   nothing is written.
    /// - `SessionUnavailable` if the tokens could not be stored.
    /// - Any `current_user` error after the save; the stored tokens remain.
    #[instrument(skip_all, fields(endpoint = %self.endpoints.token))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let request = ApiRequest::post(&self.endpoints.token)
            .with_json(json!({ "email": email, "password": password }));
        let response = self.send(request).await?;

        if response.is_client_error() {
            let message = response.detail().unwrap_or_else(|| LOGIN_FAILED.to_string());
            info!(status = response.status(), "login rejected");
            return Err(AuthError::InvalidCredentials { message });
        }
        if !response.is_success() {
            return Err(unexpected(&self.endpoints.token, &response));
        }

        let pair: TokenPair = response
            .json()
            .map_err(|e| malformed(&self.endpoints.token, e.to_string()))?;
        let access = pair
            .access()
            .ok_or_else(|| malformed(&self.endpoints.token, "missing access token"))?;

        self.session
            .save(access, pair.refresh())
            .map_err(|e| storage_failure(&e))?;

        let user = self.current_user().await?;
        let destination = role_home(user.role());
        info!(role = %user.role(), %destination, "login succeeded");

        Ok(LoginOutcome { user, destination })
    }

    /// Fetches the identity behind the stored access token.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without any request when no token is stored, and when
    /// the server answers 401 or 403.
    #[instrument(skip_all, fields(endpoint = %self.endpoints.user))]
    pub async fn current_user(&self) -> Result<AuthenticatedUser, AuthError> {
        let Some(token) = self.session.read() else {
            debug!("no access token stored");
            return Err(AuthError::Unauthorized);
        };

        let response = self
            .send(ApiRequest::get(&self.endpoints.user).with_bearer(token))
            .await?;

        match response.status() {
            401 | 403 => {
                debug!(status = response.status(), "access token rejected");
                Err(AuthError::Unauthorized)
            }
            _ if response.is_success() => response
                .json()
                .map_err(|e| malformed(&self.endpoints.user, e.to_string())),
            _ => Err(unexpected(&self.endpoints.user, &response)),
        }
    }

    /// Trades the refresh token for a new access token and stores it.
    ///
    /// If the server rotates the refresh token too, both are stored.
    ///
    /// # Errors
    ///
    /// `RefreshFailed` when no refresh token is stored or the server rejects
    /// it; the session is cleared in both cases. `Network` leaves the session
    /// as it was.
    #[instrument(skip_all, fields(endpoint = %self.endpoints.refresh))]
    pub async fn refresh_access_token(&self) -> Result<String, AuthError> {
        let Some(refresh) = self.session.read_refresh() else {
            self.session.clear();
            return Err(AuthError::RefreshFailed {
                reason: "No refresh token available".to_string(),
            });
        };

        let request =
            ApiRequest::post(&self.endpoints.refresh).with_json(json!({ "refresh": refresh }));
        let response = self.send(request).await?;

        if !response.is_success() {
            info!(status = response.status(), "refresh rejected");
            self.session.clear();
            return Err(AuthError::RefreshFailed {
                reason: response.detail().unwrap_or_else(|| REFRESH_FAILED.to_string()),
            });
        }

        let pair = response.json::<TokenPair>().ok();
        let Some(access) = pair.as_ref().and_then(TokenPair::access) else {
            warn!("refresh response carried no access token");
            self.session.clear();
            return Err(AuthError::RefreshFailed {
                reason: REFRESH_FAILED.to_string(),
            });
        };

        let stored = match pair.as_ref().and_then(TokenPair::refresh) {
            Some(rotated) => self.session.save(access, Some(rotated)),
            None => self.session.replace_access(access),
        };
        stored.map_err(|e| storage_failure(&e))?;

        debug!("access token refreshed");
        Ok(access.to_string())
    }

    /// Notifies the server, then clears the session whatever the outcome.
    #[instrument(skip_all, fields(endpoint = %self.endpoints.logout))]
    pub async fn logout(&self) -> LogoutOutcome {
        let request =
            ApiRequest::post(&self.endpoints.logout).with_optional_bearer(self.session.read());

        let (remote_acknowledged, message) = match self.transport.send(request).await {
            Ok(response) if response.is_success() => (true, LOGOUT_OK.to_string()),
            Ok(response) => {
                info!(status = response.status(), "logout not acknowledged");
                (
                    false,
                    response.detail().unwrap_or_else(|| LOGOUT_FAILED.to_string()),
                )
            }
            Err(e) => {
                warn!(error = %e, "logout request failed");
                (false, LOGOUT_ERROR.to_string())
            }
        };

        self.session.clear();

        LogoutOutcome {
            remote_acknowledged,
            message,
            destination: Route::Login,
        }
    }

    /// Creates an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// `Validation` when the form fails local checks (no request is sent) or
    /// the server rejects fields with a 400.
    #[instrument(skip_all, fields(endpoint = %self.endpoints.register))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<RegistrationOutcome, AuthError> {
        form.validate().map_err(AuthError::Validation)?;

        let request = ApiRequest::post(&self.endpoints.register).with_json(form.to_request_body());
        let response = self.send(request).await?;

        if response.status() == 400 {
            let fields = FieldErrors::from_response_body(response.body());
            info!(fields = fields.iter().count(), "registration rejected");
            return Err(AuthError::Validation(fields));
        }
        if !response.is_success() {
            return Err(unexpected(&self.endpoints.register, &response));
        }

        info!("account registered");
        Ok(RegistrationOutcome {
            user: registered_user(response.body()),
            destination: Route::Login,
        })
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AuthError> {
        self.transport
            .send(request)
            .await
            .map_err(|e| network_failure(&e))
    }
}

/// The register endpoint answers either `{user, access, refresh}` or the bare
/// user record.
fn registered_user(body: &JsonValue) -> Option<AuthenticatedUser> {
    let record = body.get("user").unwrap_or(body);
    if !record.is_object() {
        return None;
    }
    serde_json::from_value(record.clone()).ok()
}

fn unexpected(endpoint: &str, response: &ApiResponse) -> AuthError {
    warn!(endpoint, status = response.status(), "unexpected response status");
    AuthError::UnexpectedStatus {
        endpoint: endpoint.to_string(),
        status: response.status(),
        message: response.detail(),
    }
}

fn storage_failure(report: &Report<StorageError>) -> AuthError {
    warn!(error = %report, "session write failed");
    AuthError::SessionUnavailable {
        reason: report.current_context().to_string(),
    }
}

fn network_failure(report: &Report<TransportError>) -> AuthError {
    warn!(error = %report, "request failed");
    AuthError::Network {
        reason: report.current_context().to_string(),
    }
}

fn malformed(endpoint: &str, reason: impl Into<String>) -> AuthError {
    AuthError::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use crate::session::{
        ACCESS_TOKEN_KEY, FileStorage, MemoryStorage, REFRESH_TOKEN_KEY, UnavailableStorage,
    };
    use crate::transport::Method;
    use crate::transport::mock::ScriptedTransport;

    fn gateway(transport: ScriptedTransport) -> AuthGateway<ScriptedTransport> {
        AuthGateway::new(transport, SessionStore::in_memory())
    }

    fn signed_in(transport: ScriptedTransport) -> AuthGateway<ScriptedTransport> {
        let storage =
            MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, "AAA"), (REFRESH_TOKEN_KEY, "BBB")]);
        AuthGateway::new(transport, SessionStore::new(storage))
    }

    fn tokens(access: &str, refresh: &str) -> ApiResponse {
        ApiResponse::ok(json!({ "access": access, "refresh": refresh }))
    }

    fn user_with_role(role: &str) -> ApiResponse {
        ApiResponse::ok(json!({
            "id": 3,
            "email": "a@b.com",
            "first_name": "Alex",
            "last_name": "Reed",
            "role": role
        }))
    }

    #[tokio::test]
    async fn login_stores_tokens_then_dispatches_by_role() {
        let gw = gateway(
            ScriptedTransport::new()
                .respond(Method::Post, "/token/", tokens("AAA", "BBB"))
                .respond(Method::Get, "/user/", user_with_role("lawyer")),
        );

        let outcome = gw.login("a@b.com", "right").await.expect("login");

        assert_eq!(outcome.destination, Route::LawyerDashboard);
        assert_eq!(outcome.destination.path(), "/lawyerdashboard");
        assert_eq!(outcome.user.role(), &Role::Lawyer);
        assert_eq!(gw.session().read().as_deref(), Some("AAA"));
        assert_eq!(gw.session().read_refresh().as_deref(), Some("BBB"));
    }

    #[tokio::test]
    async fn login_requests_are_ordered_and_carry_headers() {
        let gw = gateway(
            ScriptedTransport::new()
                .respond(Method::Post, "/token/", tokens("AAA", "BBB"))
                .respond(Method::Get, "/user/", user_with_role("client")),
        );
        gw.login("a@b.com", "right").await.expect("login");

        let sent = gw.transport().requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].path(), "/token/");
        assert_eq!(sent[0].bearer(), None);
        assert_eq!(
            sent[0].body(),
            Some(&json!({ "email": "a@b.com", "password": "right" }))
        );
        assert_eq!(sent[1].path(), "/user/");
        assert_eq!(sent[1].bearer(), Some("AAA"));
    }

    #[tokio::test]
    async fn login_dispatch_covers_every_role() {
        for (role, expected) in [
            ("admin", "/admin"),
            ("client", "/clientdashboard"),
            ("superadmin", "/"),
        ] {
            let gw = gateway(
                ScriptedTransport::new()
                    .respond(Method::Post, "/token/", tokens("AAA", "BBB"))
                    .respond(Method::Get, "/user/", user_with_role(role)),
            );
            let outcome = gw.login("a@b.com", "right").await.expect("login");
            assert_eq!(outcome.destination.path(), expected, "role {role}");
        }
    }

    #[tokio::test]
    async fn invalid_credentials_leave_store_empty() {
        let gw = gateway(ScriptedTransport::new().respond(
            Method::Post,
            "/token/",
            ApiResponse::new(401, json!({ "detail": "Invalid credentials" })),
        ));

        let err = gw.login("a@b.com", "wrong").await.expect_err("should fail");

        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(gw.session().read(), None);
        assert_eq!(gw.transport().request_count(), 1);
    }

    #[tokio::test]
    async fn invalid_credentials_keep_existing_session() {
        let gw = signed_in(ScriptedTransport::new().respond(
            Method::Post,
            "/token/",
            ApiResponse::new(400, json!({})),
        ));

        let err = gw.login("a@b.com", "wrong").await.expect_err("should fail");

        assert_eq!(
            err,
            AuthError::InvalidCredentials {
                message: "Login failed".to_string()
            }
        );
        assert_eq!(gw.session().read().as_deref(), Some("AAA"));
    }

    #[tokio::test]
    async fn login_network_failure_writes_nothing() {
        let gw = gateway(ScriptedTransport::new().fail(Method::Post, "/token/"));
        let err = gw.login("a@b.com", "pw").await.expect_err("should fail");

        assert_eq!(
            err,
            AuthError::Network {
                reason: "failed to connect to '/token/': connection refused".to_string()
            }
        );
        assert!(!gw.is_authenticated());
    }

    #[tokio::test]
    async fn login_without_access_token_is_malformed() {
        let gw = gateway(ScriptedTransport::new().respond(
            Method::Post,
            "/token/",
            ApiResponse::ok(json!({ "refresh": "BBB" })),
        ));
        let err = gw.login("a@b.com", "pw").await.expect_err("should fail");

        assert!(matches!(err, AuthError::MalformedResponse { .. }));
        assert_eq!(gw.session().read_refresh(), None);
    }

    #[tokio::test]
    async fn login_with_disabled_storage_has_no_destination() {
        let gw = AuthGateway::new(
            ScriptedTransport::new()
                .respond(Method::Post, "/token/", tokens("AAA", "BBB"))
                .respond(Method::Get, "/user/", user_with_role("admin")),
            SessionStore::new(UnavailableStorage),
        );
        let err = gw.login("a@b.com", "pw").await.expect_err("should fail");

        assert_eq!(
            err,
            AuthError::SessionUnavailable {
                reason: StorageError::Unavailable {
                    reason: "storage is disabled".to_string()
                }
                .to_string()
            }
        );
        assert!(gw.transport().requests_to("/user/").is_empty());
    }

    #[tokio::test]
    async fn login_recovers_from_corrupt_session_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").expect("write");

        let gw = AuthGateway::new(
            ScriptedTransport::new()
                .respond(Method::Post, "/token/", tokens("AAA", "BBB"))
                .respond(Method::Get, "/user/", user_with_role("client"))
                .respond(Method::Post, "/logout/", ApiResponse::ok(json!({}))),
            SessionStore::new(FileStorage::new(&path)),
        );

        let outcome = gw.login("a@b.com", "pw").await.expect("login");
        assert_eq!(outcome.destination, Route::ClientDashboard);
        assert_eq!(gw.access_token().as_deref(), Some("AAA"));

        gw.logout().await;
        assert!(!path.exists());
        gw.login("a@b.com", "pw").await.expect("second login");
    }

    #[tokio::test]
    async fn whoami_failure_after_login_keeps_tokens() {
        let gw = gateway(
            ScriptedTransport::new()
                .respond(Method::Post, "/token/", tokens("AAA", "BBB"))
                .respond(Method::Get, "/user/", ApiResponse::new(500, json!({}))),
        );
        let err = gw.login("a@b.com", "pw").await.expect_err("should fail");

        assert!(matches!(err, AuthError::UnexpectedStatus { status: 500, .. }));
        assert_eq!(gw.session().read().as_deref(), Some("AAA"));
    }

    #[tokio::test]
    async fn current_user_without_token_makes_no_request() {
        let gw = gateway(ScriptedTransport::new());
        assert_eq!(gw.current_user().await, Err(AuthError::Unauthorized));
        assert_eq!(gw.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn current_user_rejected_token_is_unauthorized() {
        let gw = signed_in(ScriptedTransport::new().respond(
            Method::Get,
            "/user/",
            ApiResponse::new(401, json!({ "detail": "Token is invalid or expired" })),
        ));
        assert_eq!(gw.current_user().await, Err(AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn refresh_replaces_only_access() {
        let gw = signed_in(ScriptedTransport::new().respond(
            Method::Post,
            "/token/refresh/",
            ApiResponse::ok(json!({ "access": "CCC" })),
        ));

        let token = gw.refresh_access_token().await.expect("refresh");

        assert_eq!(token, "CCC");
        assert_eq!(gw.session().read().as_deref(), Some("CCC"));
        assert_eq!(gw.session().read_refresh().as_deref(), Some("BBB"));
        let sent = gw.transport().requests_to("/token/refresh/");
        assert_eq!(sent[0].body(), Some(&json!({ "refresh": "BBB" })));
        assert_eq!(sent[0].bearer(), None);
    }

    #[tokio::test]
    async fn refresh_stores_rotated_refresh_token() {
        let gw = signed_in(ScriptedTransport::new().respond(
            Method::Post,
            "/token/refresh/",
            tokens("CCC", "DDD"),
        ));
        gw.refresh_access_token().await.expect("refresh");
        assert_eq!(gw.session().read_refresh().as_deref(), Some("DDD"));
    }

    #[tokio::test]
    async fn rejected_refresh_clears_session() {
        let gw = signed_in(ScriptedTransport::new().respond(
            Method::Post,
            "/token/refresh/",
            ApiResponse::new(401, json!({ "detail": "Token is blacklisted" })),
        ));

        let err = gw.refresh_access_token().await.expect_err("should fail");

        assert!(err.is_unauthenticated());
        assert_eq!(
            err,
            AuthError::RefreshFailed {
                reason: "Token is blacklisted".to_string()
            }
        );
        assert!(!gw.is_authenticated());
        assert_eq!(gw.session().read_refresh(), None);
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_clears_and_skips_network() {
        let storage = MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, "AAA")]);
        let gw = AuthGateway::new(ScriptedTransport::new(), SessionStore::new(storage));

        let err = gw.refresh_access_token().await.expect_err("should fail");

        assert!(matches!(err, AuthError::RefreshFailed { .. }));
        assert!(!gw.is_authenticated());
        assert_eq!(gw.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn refresh_network_error_keeps_session() {
        let gw = signed_in(ScriptedTransport::new().fail(Method::Post, "/token/refresh/"));
        let err = gw.refresh_access_token().await.expect_err("should fail");

        assert!(matches!(err, AuthError::Network { .. }));
        assert_eq!(gw.session().read().as_deref(), Some("AAA"));
    }

    #[tokio::test]
    async fn logout_clears_on_success() {
        let gw = signed_in(ScriptedTransport::new().respond(
            Method::Post,
            "/logout/",
            ApiResponse::ok(json!({ "detail": "Successfully logged out." })),
        ));

        let outcome = gw.logout().await;

        assert!(outcome.remote_acknowledged);
        assert_eq!(outcome.message, "Logout successful");
        assert_eq!(outcome.destination, Route::Login);
        assert!(!gw.is_authenticated());
        assert_eq!(
            gw.transport().requests_to("/logout/")[0].bearer(),
            Some("AAA")
        );
    }

    #[tokio::test]
    async fn logout_clears_when_server_refuses() {
        let gw = signed_in(ScriptedTransport::new().respond(
            Method::Post,
            "/logout/",
            ApiResponse::new(500, json!({})),
        ));
        let outcome = gw.logout().await;

        assert!(!outcome.remote_acknowledged);
        assert_eq!(outcome.message, "Logout API call failed");
        assert_eq!(gw.session().snapshot(), crate::session::Session::default());
    }

    #[tokio::test]
    async fn logout_clears_when_unreachable() {
        let gw = signed_in(ScriptedTransport::new().fail(Method::Post, "/logout/"));
        let outcome = gw.logout().await;

        assert_eq!(outcome.message, "Logout API call error");
        assert!(!gw.is_authenticated());
    }

    fn registration() -> RegistrationForm {
        RegistrationForm {
            first_name: "Alex".to_string(),
            last_name: "Reed".to_string(),
            email: "a@b.com".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
            agree_terms: true,
            ..RegistrationForm::default()
        }
    }

    #[tokio::test]
    async fn register_sends_to_login_without_storing_tokens() {
        let gw = gateway(ScriptedTransport::new().respond(
            Method::Post,
            "/register/",
            ApiResponse::new(
                201,
                json!({
                    "user": { "id": 9, "email": "a@b.com", "role": "client" },
                    "access": "AAA",
                    "refresh": "BBB"
                }),
            ),
        ));

        let outcome = gw.register(&registration()).await.expect("register");

        assert_eq!(outcome.destination, Route::Login);
        assert_eq!(
            outcome.user.as_ref().map(|u| u.email()),
            Some("a@b.com")
        );
        assert!(!gw.is_authenticated());
    }

    #[tokio::test]
    async fn register_local_validation_skips_network() {
        let gw = gateway(ScriptedTransport::new());
        let mut form = registration();
        form.confirm_password = "other".to_string();

        let err = gw.register(&form).await.expect_err("should fail");

        assert_eq!(err.user_message(), "Passwords do not match");
        assert_eq!(gw.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn register_server_field_errors() {
        let gw = gateway(ScriptedTransport::new().respond(
            Method::Post,
            "/register/",
            ApiResponse::new(
                400,
                json!({ "email": ["user with this email already exists."] }),
            ),
        ));
        let err = gw.register(&registration()).await.expect_err("should fail");
        assert_eq!(err.user_message(), "user with this email already exists.");
    }
}
