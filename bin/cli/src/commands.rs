//! Subcommands and their execution.
//!
//! Each command returns the text to print. Navigations are printed as
//! `→ <route>`; the portal's history records them as well.

use crate::error::CliError;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use lawfirm_portal_access::{
    AccessClaims, Area, AuthEndpoints, AuthGateway, HttpTransport, Portal, RegistrationForm,
    Route, SessionStore, Visit,
};
use lawfirm_portal_resources::{Collection, ResourceClient};
use serde_json::Value as JsonValue;
use tracing::debug;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and go to your portal
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(long, env = "LAWFIRM_PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Trade the refresh token for a new access token
    Refresh,

    /// Create a client account
    Register(RegisterArgs),

    /// Show whether a session is stored and when it expires
    Status,

    /// Open a portal page through the route guard
    Open {
        /// Page path, e.g. /clientdashboard/my-cases
        path: String,
    },

    /// List a resource collection
    #[command(alias = "ls")]
    List {
        /// appointments, book, contact-messages, case-summaries, case-updates,
        /// documents, users or lawyers
        resource: String,
    },

    /// Print the route table
    Routes,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "LAWFIRM_PORTAL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Repeat the password
    #[arg(long)]
    pub confirm_password: String,

    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long, default_value = "")]
    pub sex: String,

    /// Accept the terms and conditions
    #[arg(long)]
    pub agree_terms: bool,
}

impl From<RegisterArgs> for RegistrationForm {
    fn from(args: RegisterArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            password: args.password,
            confirm_password: args.confirm_password,
            address: args.address,
            age: args.age,
            sex: args.sex,
            agree_terms: args.agree_terms,
        }
    }
}

/// The host: a portal for navigation plus a resource client, sharing one
/// session store and transport.
pub struct App<T> {
    portal: Portal<T>,
    resources: ResourceClient<T>,
}

impl<T: HttpTransport + Clone> App<T> {
    pub fn new(transport: T, session: SessionStore, endpoints: AuthEndpoints) -> Self {
        let gateway = AuthGateway::with_endpoints(transport.clone(), session.clone(), endpoints);
        Self {
            portal: Portal::new(gateway),
            resources: ResourceClient::new(transport, session),
        }
    }

    pub fn portal(&self) -> &Portal<T> {
        &self.portal
    }

    /// Runs one command and returns its output.
    ///
    /// # Errors
    ///
    /// Returns the failure to report; its `Display` is user-facing.
    pub async fn run(&self, command: Command) -> Result<String, CliError> {
        match command {
            Command::Login { email, password } => self.login(&email, &password).await,
            Command::Logout => Ok(self.logout().await),
            Command::Whoami => self.whoami().await,
            Command::Refresh => self.refresh().await,
            Command::Register(args) => self.register(args.into()).await,
            Command::Status => Ok(self.status_at(Utc::now())),
            Command::Open { path } => self.open(&path).await,
            Command::List { resource } => self.list(&resource).await,
            Command::Routes => Ok(routes()),
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, CliError> {
        let outcome = self.portal.login(email, password).await?;
        Ok(format!(
            "Signed in as {} ({})\n→ {}",
            outcome.user.display_name(),
            outcome.user.role(),
            outcome.destination
        ))
    }

    async fn logout(&self) -> String {
        let outcome = self.portal.logout().await;
        format!("{}\n→ {}", outcome.message, outcome.destination)
    }

    async fn whoami(&self) -> Result<String, CliError> {
        let user = self.portal.gateway().current_user().await?;

        let mut lines = vec![
            user.display_name(),
            format!("email: {}", user.email()),
            format!("role:  {}", user.role()),
        ];
        if let Some(lawyer_type) = user.lawyer_type() {
            lines.push(format!("practice: {}", lawyer_type.label()));
        }
        if let Some(joined) = user.joined_at() {
            lines.push(format!("joined: {}", joined.format("%Y-%m-%d")));
        }
        Ok(lines.join("\n"))
    }

    async fn refresh(&self) -> Result<String, CliError> {
        self.portal.gateway().refresh_access_token().await?;
        Ok("Access token refreshed".to_string())
    }

    async fn register(&self, form: RegistrationForm) -> Result<String, CliError> {
        let outcome = self.portal.gateway().register(&form).await?;
        let email = outcome
            .user
            .as_ref()
            .map_or(form.email.as_str(), |user| user.email());
        Ok(format!(
            "Account created for {email}. Please sign in.\n→ {}",
            outcome.destination
        ))
    }

    fn status_at(&self, now: DateTime<Utc>) -> String {
        let session = self.portal.gateway().session().snapshot();
        let Some(access) = session.access_token() else {
            return "Not signed in".to_string();
        };

        let mut lines = vec!["Signed in".to_string()];
        match AccessClaims::decode(access) {
            Ok(claims) => {
                if let Some(user_id) = claims.user_id() {
                    lines.push(format!("user id: {user_id}"));
                }
                if let Some(expires) = claims.expires_at() {
                    let verb = if claims.is_expired_at(now) {
                        "expired at"
                    } else {
                        "expires at"
                    };
                    lines.push(format!("access token {verb} {}", expires.to_rfc3339()));
                }
            }
            Err(e) => debug!(error = %e, "access token is opaque"),
        }
        let refresh = if session.refresh_token().is_some() {
            "stored"
        } else {
            "none"
        };
        lines.push(format!("refresh token: {refresh}"));
        lines.join("\n")
    }

    async fn open(&self, path: &str) -> Result<String, CliError> {
        let visit = self
            .portal
            .open(path, |user| async move {
                user.map(|u| format!("Welcome, {}", u.display_name()))
            })
            .await?;

        match visit {
            Visit::Rendered {
                route,
                view: Some(greeting),
            } => Ok(format!("→ {route}\n{greeting}")),
            Visit::Rendered { route, view: None } => Ok(format!("→ {route}")),
            Visit::Redirected { to } => Ok(format!("→ {to}")),
            Visit::NotFound { path } => Err(CliError::NoSuchRoute { path }),
        }
    }

    async fn list(&self, resource: &str) -> Result<String, CliError> {
        let collection =
            Collection::from_name(resource).ok_or_else(|| CliError::UnknownResource {
                name: resource.to_string(),
            })?;
        let items: Vec<JsonValue> = self.resources.list(collection).await?;
        if items.is_empty() {
            return Ok(format!("No {collection} found"));
        }
        serde_json::to_string_pretty(&items).map_err(|e| CliError::Render {
            details: e.to_string(),
        })
    }
}

fn routes() -> String {
    Route::ALL
        .iter()
        .map(|route| {
            let area = match route.area() {
                Area::Public => "public",
                Area::Client => "client",
                Area::Lawyer => "lawyer",
                Area::Admin => "admin",
            };
            format!("{:<28} {area}", route.path())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
