//! Portal resources: appointments, contact messages, cases, documents, users
//! and lawyers.
//!
//! Requests go through the same [`HttpTransport`] and [`SessionStore`] as the
//! authentication gateway, so a stored access token is attached to every
//! protected call and an expired one surfaces as
//! [`ResourceError::Unauthenticated`].
//!
//! [`HttpTransport`]: lawfirm_portal_access::HttpTransport
//! [`SessionStore`]: lawfirm_portal_access::SessionStore

pub mod client;
pub mod error;
pub mod models;

pub use client::{Collection, ResourceClient};
pub use error::ResourceError;
pub use models::{
    Appointment, CaseStatus, CaseSummary, CaseUpdate, ContactMessage, DOCUMENT_KINDS, Document,
    Lawyer, ManagedUser, NewAppointment, NewCaseSummary, RoleAssignment,
};
