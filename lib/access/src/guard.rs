//! Route guard: decides whether a requested path may be rendered.

use crate::error::AuthError;
use crate::gateway::AuthGateway;
use crate::route::{Route, role_home};
use crate::transport::HttpTransport;
use crate::user::AuthenticatedUser;
use std::sync::Arc;
use tracing::{debug, instrument};

/// What the host should do with a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the route. `user` is set for protected routes only.
    Allow {
        route: Route,
        user: Option<AuthenticatedUser>,
    },
    /// No usable session; go to the sign-in route.
    RedirectToLogin,
    /// Signed in, but the route belongs to another role's portal.
    RedirectTo(Route),
    /// The path is not in the route table.
    NotFound,
}

impl RouteDecision {
    /// Returns the route the host ends up on, if any.
    #[must_use]
    pub fn destination(&self) -> Option<Route> {
        match self {
            Self::Allow { route, .. } => Some(*route),
            Self::RedirectToLogin => Some(Route::Login),
            Self::RedirectTo(route) => Some(*route),
            Self::NotFound => None,
        }
    }

    /// Returns true if the requested route may be rendered.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

/// Resolves identity before any protected screen is produced.
pub struct RouteGuard<T> {
    gateway: Arc<AuthGateway<T>>,
}

impl<T> Clone for RouteGuard<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<T: HttpTransport> RouteGuard<T> {
    pub fn new(gateway: Arc<AuthGateway<T>>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &AuthGateway<T> {
        &self.gateway
    }

    /// Decides what to do with `path`.
    ///
    /// Public routes are allowed without looking at the session. A protected
    /// route with no stored token redirects to sign-in without any request.
    /// Otherwise the identity is fetched fresh and its role checked against
    /// the route's area.
    ///
    /// # Errors
    ///
    /// Errors other than `Unauthorized` (network failures, unexpected
    /// statuses) are returned rather than turned into redirects.
    #[instrument(skip(self))]
    pub async fn resolve(&self, path: &str) -> Result<RouteDecision, AuthError> {
        let Some(route) = Route::from_path(path) else {
            debug!("no such route");
            return Ok(RouteDecision::NotFound);
        };

        if !route.is_protected() {
            return Ok(RouteDecision::Allow { route, user: None });
        }

        if !self.gateway.is_authenticated() {
            debug!(%route, "no session; redirecting to sign-in");
            return Ok(RouteDecision::RedirectToLogin);
        }

        let user = match self.gateway.current_user().await {
            Ok(user) => user,
            Err(AuthError::Unauthorized) => {
                debug!(%route, "session rejected; redirecting to sign-in");
                return Ok(RouteDecision::RedirectToLogin);
            }
            Err(e) => return Err(e),
        };

        if !route.area().admits(user.role()) {
            let home = role_home(user.role());
            debug!(%route, role = %user.role(), %home, "route belongs to another portal");
            return Ok(RouteDecision::RedirectTo(home));
        }

        Ok(RouteDecision::Allow {
            route,
            user: Some(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ACCESS_TOKEN_KEY, MemoryStorage, SessionStore};
    use crate::transport::mock::ScriptedTransport;
    use crate::transport::{ApiResponse, Method};
    use serde_json::json;

    fn guard(transport: ScriptedTransport, token: Option<&str>) -> RouteGuard<ScriptedTransport> {
        let storage = match token {
            Some(t) => MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, t)]),
            None => MemoryStorage::new(),
        };
        RouteGuard::new(Arc::new(AuthGateway::new(
            transport,
            SessionStore::new(storage),
        )))
    }

    fn whoami(role: &str) -> ScriptedTransport {
        ScriptedTransport::new().respond(
            Method::Get,
            "/user/",
            ApiResponse::ok(json!({ "id": 1, "role": role })),
        )
    }

    #[tokio::test]
    async fn protected_route_without_token_redirects_without_requests() {
        let g = guard(ScriptedTransport::new(), None);

        let decision = g.resolve("/admin").await.expect("resolve");

        assert_eq!(decision, RouteDecision::RedirectToLogin);
        assert_eq!(decision.destination(), Some(Route::Login));
        assert_eq!(g.gateway().transport().request_count(), 0);
    }

    #[tokio::test]
    async fn public_route_needs_no_identity() {
        let g = guard(ScriptedTransport::new(), Some("AAA"));
        let decision = g.resolve("/services").await.expect("resolve");

        assert_eq!(
            decision,
            RouteDecision::Allow {
                route: Route::Services,
                user: None
            }
        );
        assert_eq!(g.gateway().transport().request_count(), 0);
    }

    #[tokio::test]
    async fn owner_role_is_allowed() {
        let g = guard(whoami("admin"), Some("AAA"));
        let decision = g.resolve("/admin/case").await.expect("resolve");

        match decision {
            RouteDecision::Allow { route, user } => {
                assert_eq!(route, Route::AdminCases);
                assert!(user.expect("user").role().is_admin());
            }
            other => panic!("expected allow, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_roles_are_sent_home() {
        let g = guard(whoami("client"), Some("AAA"));
        let decision = g.resolve("/lawyer-cases").await.expect("resolve");
        assert_eq!(decision, RouteDecision::RedirectTo(Route::ClientDashboard));
    }

    #[tokio::test]
    async fn unknown_role_is_sent_to_home_page() {
        let g = guard(whoami("superadmin"), Some("AAA"));
        let decision = g.resolve("/admin").await.expect("resolve");
        assert_eq!(decision, RouteDecision::RedirectTo(Route::Home));
    }

    #[tokio::test]
    async fn rejected_token_redirects_to_sign_in() {
        let g = guard(
            ScriptedTransport::new().respond(Method::Get, "/user/", ApiResponse::new(401, json!({}))),
            Some("stale"),
        );
        let decision = g.resolve("/clientdashboard").await.expect("resolve");
        assert_eq!(decision, RouteDecision::RedirectToLogin);
    }

    #[tokio::test]
    async fn network_failure_is_an_error() {
        let g = guard(ScriptedTransport::new().fail(Method::Get, "/user/"), Some("AAA"));
        let err = g.resolve("/clientdashboard").await.expect_err("should fail");
        assert!(matches!(err, AuthError::Network { .. }));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let g = guard(ScriptedTransport::new(), Some("AAA"));
        assert_eq!(g.resolve("/nope").await.expect("resolve"), RouteDecision::NotFound);
        assert_eq!(RouteDecision::NotFound.destination(), None);
    }
}
