//! The portal's route table and role dispatch.
//!
//! Routes are grouped into areas. Public routes need no identity; every other
//! area belongs to exactly one role.

use crate::role::Role;
use std::fmt;

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// Anyone, signed in or not.
    Public,
    Client,
    Lawyer,
    Admin,
}

impl Area {
    /// Returns true if `role` may open routes in this area.
    #[must_use]
    pub fn admits(self, role: &Role) -> bool {
        match self {
            Self::Public => true,
            Self::Client => role.is_client(),
            Self::Lawyer => role.is_lawyer(),
            Self::Admin => role.is_admin(),
        }
    }
}

/// A screen of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Advocates,
    Services,
    BookAppointment,
    Contact,
    Register,
    Login,
    ClientDashboard,
    ClientCases,
    ClientProfile,
    AdminDashboard,
    AdminAppointments,
    AdminContactMessages,
    AdminCases,
    AdminUsers,
    LawyerDashboard,
    LawyerCases,
    LawyerAppointments,
}

impl Route {
    /// Every route, public ones first.
    pub const ALL: [Route; 18] = [
        Self::Home,
        Self::Advocates,
        Self::Services,
        Self::BookAppointment,
        Self::Contact,
        Self::Register,
        Self::Login,
        Self::ClientDashboard,
        Self::ClientCases,
        Self::ClientProfile,
        Self::AdminDashboard,
        Self::AdminAppointments,
        Self::AdminContactMessages,
        Self::AdminCases,
        Self::AdminUsers,
        Self::LawyerDashboard,
        Self::LawyerCases,
        Self::LawyerAppointments,
    ];

    /// Returns the URL path of this route.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Advocates => "/AdvocatePage",
            Self::Services => "/services",
            Self::BookAppointment => "/AppointmentPage",
            Self::Contact => "/ContactPage",
            Self::Register => "/register",
            Self::Login => "/login",
            Self::ClientDashboard => "/clientdashboard",
            Self::ClientCases => "/clientdashboard/my-cases",
            Self::ClientProfile => "/clientdashboard/profile",
            Self::AdminDashboard => "/admin",
            Self::AdminAppointments => "/admin/appointment",
            Self::AdminContactMessages => "/admin/contact-message",
            Self::AdminCases => "/admin/case",
            Self::AdminUsers => "/admin/user",
            Self::LawyerDashboard => "/lawyerdashboard",
            Self::LawyerCases => "/lawyer-cases",
            Self::LawyerAppointments => "/lawyer-appointments",
        }
    }

    /// Resolves a URL path.
    ///
    /// Matching ignores ASCII case, a trailing slash, the query string and the
    /// fragment. Returns `None` for paths outside the table.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        if !normalized.starts_with('/') {
            return None;
        }

        Self::ALL
            .into_iter()
            .find(|route| route.path().eq_ignore_ascii_case(normalized))
    }

    /// Returns the area this route belongs to.
    #[must_use]
    pub fn area(self) -> Area {
        match self {
            Self::Home
            | Self::Advocates
            | Self::Services
            | Self::BookAppointment
            | Self::Contact
            | Self::Register
            | Self::Login => Area::Public,
            Self::ClientDashboard | Self::ClientCases | Self::ClientProfile => Area::Client,
            Self::AdminDashboard
            | Self::AdminAppointments
            | Self::AdminContactMessages
            | Self::AdminCases
            | Self::AdminUsers => Area::Admin,
            Self::LawyerDashboard | Self::LawyerCases | Self::LawyerAppointments => Area::Lawyer,
        }
    }

    /// Returns true if opening this route needs a signed-in identity.
    #[must_use]
    pub fn is_protected(self) -> bool {
        self.area() != Area::Public
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Returns the landing route for a role.
///
/// Total over every role value; anything unrecognized lands on the home page.
#[must_use]
pub fn role_home(role: &Role) -> Route {
    match role {
        Role::Admin => Route::AdminDashboard,
        Role::Lawyer => Route::LawyerDashboard,
        Role::Client => Route::ClientDashboard,
        Role::Unrecognized(_) => Route::Home,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_dispatch() {
        assert_eq!(role_home(&Role::Admin).path(), "/admin");
        assert_eq!(role_home(&Role::Lawyer).path(), "/lawyerdashboard");
        assert_eq!(role_home(&Role::Client).path(), "/clientdashboard");
    }

    #[test]
    fn unknown_roles_land_home() {
        assert_eq!(role_home(&Role::parse("superadmin")), Route::Home);
        assert_eq!(role_home(&Role::default()).path(), "/");
    }

    #[test]
    fn every_path_resolves_to_its_route() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }

    #[test]
    fn path_matching_is_lenient() {
        assert_eq!(Route::from_path("/Admin/"), Some(Route::AdminDashboard));
        assert_eq!(Route::from_path("/appointmentpage"), Some(Route::BookAppointment));
        assert_eq!(
            Route::from_path("/clientdashboard/my-cases?page=2#top"),
            Some(Route::ClientCases)
        );
        assert_eq!(Route::from_path(""), Some(Route::Home));
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        assert_eq!(Route::from_path("/admin/secret"), None);
        assert_eq!(Route::from_path("admin"), None);
    }

    #[test]
    fn areas_match_portals() {
        assert!(!Route::Login.is_protected());
        assert!(!Route::Register.is_protected());
        assert_eq!(Route::AdminUsers.area(), Area::Admin);
        assert_eq!(Route::LawyerCases.area(), Area::Lawyer);
        assert_eq!(Route::ClientProfile.area(), Area::Client);
    }

    #[test]
    fn each_role_owns_its_home() {
        for role in [Role::Admin, Role::Lawyer, Role::Client] {
            assert!(role_home(&role).area().admits(&role));
        }
        assert!(!Area::Admin.admits(&Role::Lawyer));
        assert!(!Area::Client.admits(&Role::parse("superadmin")));
    }
}
