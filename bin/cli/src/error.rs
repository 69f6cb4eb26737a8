//! Errors reported by the command-line host.

use lawfirm_portal_access::{AuthError, Route};
use lawfirm_portal_resources::ResourceError;
use std::fmt;

/// Command failures. `Display` is the text shown to the user.
#[derive(Debug)]
pub enum CliError {
    /// An authentication operation failed.
    Auth(AuthError),
    /// A resource request failed.
    Resource(ResourceError),
    /// The path is not a portal route.
    NoSuchRoute { path: String },
    /// The resource name is not a known collection.
    UnknownResource { name: String },
    /// Configuration could not be loaded.
    Config { details: String },
    /// The HTTP client could not be set up.
    Transport { details: String },
    /// Command output could not be rendered.
    Render { details: String },
}

impl CliError {
    /// Returns where the visitor should be sent after this failure.
    #[must_use]
    pub fn redirect_target(&self) -> Option<Route> {
        match self {
            Self::Auth(e) if e.is_unauthenticated() => Some(Route::Login),
            Self::Resource(e) => e.redirect_target(),
            _ => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(e) => f.write_str(&e.user_message()),
            Self::Resource(e) => f.write_str(&e.user_message()),
            Self::NoSuchRoute { path } => write!(f, "No page at '{path}'"),
            Self::UnknownResource { name } => write!(f, "Unknown resource '{name}'"),
            Self::Config { details } => write!(f, "configuration error: {details}"),
            Self::Transport { details } => write!(f, "HTTP client error: {details}"),
            Self::Render { details } => write!(f, "failed to render output: {details}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<AuthError> for CliError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<ResourceError> for CliError {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}
