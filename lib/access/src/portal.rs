//! The navigating host.
//!
//! The gateway and guard only return decisions. `Portal` is the single place
//! that acts on them: it follows redirects, invokes screens, and keeps the
//! navigation history.

use crate::error::AuthError;
use crate::gateway::{AuthGateway, LoginOutcome, LogoutOutcome};
use crate::guard::{RouteDecision, RouteGuard};
use crate::route::Route;
use crate::transport::HttpTransport;
use crate::user::AuthenticatedUser;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// What happened when a path was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit<V> {
    /// The screen was produced.
    Rendered { route: Route, view: V },
    /// The visitor was sent elsewhere; the screen never ran.
    Redirected { to: Route },
    /// The path is not in the route table.
    NotFound { path: String },
}

/// A portal session with navigation history.
pub struct Portal<T> {
    gateway: Arc<AuthGateway<T>>,
    guard: RouteGuard<T>,
    history: Mutex<Vec<Route>>,
}

impl<T: HttpTransport> Portal<T> {
    pub fn new(gateway: AuthGateway<T>) -> Self {
        let gateway = Arc::new(gateway);
        Self {
            guard: RouteGuard::new(Arc::clone(&gateway)),
            gateway,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn gateway(&self) -> &AuthGateway<T> {
        &self.gateway
    }

    pub fn guard(&self) -> &RouteGuard<T> {
        &self.guard
    }

    /// Opens `path`, running `screen` only if the guard allows it.
    ///
    /// Protected screens receive the freshly resolved user; public screens
    /// receive `None`. Only the route finally landed on is recorded.
    ///
    /// # Errors
    ///
    /// Propagates guard errors other than an expired session.
    pub async fn open<V, F, Fut>(&self, path: &str, screen: F) -> Result<Visit<V>, AuthError>
    where
        F: FnOnce(Option<AuthenticatedUser>) -> Fut,
        Fut: Future<Output = V>,
    {
        match self.guard.resolve(path).await? {
            RouteDecision::Allow { route, user } => {
                self.navigate(route);
                let view = screen(user).await;
                Ok(Visit::Rendered { route, view })
            }
            RouteDecision::RedirectToLogin => {
                self.navigate(Route::Login);
                Ok(Visit::Redirected { to: Route::Login })
            }
            RouteDecision::RedirectTo(route) => {
                self.navigate(route);
                Ok(Visit::Redirected { to: route })
            }
            RouteDecision::NotFound => Ok(Visit::NotFound {
                path: path.to_string(),
            }),
        }
    }

    /// Signs in and moves to the role's landing route.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; nothing is navigated on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let outcome = self.gateway.login(email, password).await?;
        self.navigate(outcome.destination);
        Ok(outcome)
    }

    /// Signs out and moves to the sign-in route.
    pub async fn logout(&self) -> LogoutOutcome {
        let outcome = self.gateway.logout().await;
        self.navigate(outcome.destination);
        outcome
    }

    /// Returns every route navigated to, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the route most recently navigated to.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    fn navigate(&self, route: Route) {
        info!(%route, "navigate");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}
