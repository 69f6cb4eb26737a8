//! Core domain types and utilities for lawfirm-portal.
//!
//! This crate provides the foundational types shared by the access and
//! resource crates: the rootcause-based `Result` alias and the strongly-typed
//! identifiers the backend assigns to its records.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{
    AppointmentId, CaseId, CaseUpdateId, ContactMessageId, DocumentId, ParseIdError, UserId,
};
