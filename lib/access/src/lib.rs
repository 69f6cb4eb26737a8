//! Session storage, authentication and route guarding for lawfirm-portal.
//!
//! This crate provides:
//! - Durable token storage (`SessionStore` over a `TokenStorage` backend)
//! - The authentication gateway (`AuthGateway`): login, logout, refresh,
//!   registration and the "who am I" lookup
//! - Role dispatch (`role_home`) and the route table (`Route`)
//! - The route guard (`RouteGuard`) and a navigating host (`Portal`)
//!
//! # Access Control Model
//!
//! A visitor is signed in exactly when an access token is stored. Every
//! protected route belongs to one role's portal; the guard fetches the user
//! fresh on each protected visit and sends other roles to their own landing
//! route.
//!
//! # Example
//!
//! ```
//! use lawfirm_portal_access::{Role, Route, SessionStore, role_home};
//!
//! let session = SessionStore::in_memory();
//! assert!(!session.is_present());
//!
//! assert_eq!(role_home(&Role::Lawyer), Route::LawyerDashboard);
//! assert_eq!(role_home(&Role::parse("superadmin")).path(), "/");
//! assert!(Route::from_path("/admin/user").is_some_and(Route::is_protected));
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod portal;
pub mod register;
pub mod role;
pub mod route;
pub mod session;
pub mod token;
pub mod transport;
pub mod user;

// Re-export main types at crate root
pub use config::{ApiConfig, ApiConfigBuilder, AuthEndpoints};
pub use error::{AuthError, ClaimsError, StorageError, TransportError};
pub use gateway::{AuthGateway, LoginOutcome, LogoutOutcome, RegistrationOutcome};
pub use guard::{RouteDecision, RouteGuard};
pub use portal::{Portal, Visit};
pub use register::{FieldErrors, RegistrationForm};
pub use role::{LawyerType, Role};
pub use route::{Area, Route, role_home};
#[cfg(feature = "browser")]
pub use session::BrowserStorage;
pub use session::{
    FileStorage, MemoryStorage, Session, SessionStore, TokenStorage, UnavailableStorage,
};
pub use token::AccessClaims;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};
pub use user::AuthenticatedUser;
