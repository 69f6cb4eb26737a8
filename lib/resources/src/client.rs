//! Authenticated access to the resource endpoints.

use crate::error::ResourceError;
use crate::models::{
    Appointment, CaseSummary, CaseUpdate, ContactMessage, Document, Lawyer, ManagedUser,
    NewAppointment, NewCaseSummary, RoleAssignment,
};
use lawfirm_portal_access::{
    ApiRequest, ApiResponse, FieldErrors, HttpTransport, LawyerType, Method, SessionStore,
};
use lawfirm_portal_core::{AppointmentId, CaseId, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value as JsonValue, json};
use std::fmt;
use tracing::{debug, instrument, warn};

/// A REST collection on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Appointments,
    /// Public booking endpoint.
    Bookings,
    ContactMessages,
    CaseSummaries,
    CaseUpdates,
    Documents,
    /// Admin user list and role changes.
    Users,
    Lawyers,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Self::Appointments,
        Self::Bookings,
        Self::ContactMessages,
        Self::CaseSummaries,
        Self::CaseUpdates,
        Self::Documents,
        Self::Users,
        Self::Lawyers,
    ];

    /// Returns the collection path, relative to the API root.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Appointments => "/appointments/",
            Self::Bookings => "/book/",
            Self::ContactMessages => "/contact-messages/",
            Self::CaseSummaries => "/case-summaries/",
            Self::CaseUpdates => "/case-updates/",
            Self::Documents => "/documents/",
            Self::Users => "/update-role/",
            Self::Lawyers => "/lawyers/",
        }
    }

    /// Returns the path of one record.
    #[must_use]
    pub fn item_path(self, id: impl fmt::Display) -> String {
        format!("{}{id}/", self.path())
    }

    /// Parses a collection name such as `case-summaries` or `users`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_matches('/').to_ascii_lowercase();
        match name.as_str() {
            "appointments" => Some(Self::Appointments),
            "book" | "bookings" => Some(Self::Bookings),
            "contact-messages" | "messages" => Some(Self::ContactMessages),
            "case-summaries" | "cases" => Some(Self::CaseSummaries),
            "case-updates" | "updates" => Some(Self::CaseUpdates),
            "documents" => Some(Self::Documents),
            "update-role" | "users" => Some(Self::Users),
            "lawyers" => Some(Self::Lawyers),
            _ => None,
        }
    }

    /// Returns true if `method` on this collection needs a signed-in visitor.
    ///
    /// Booking an appointment, the lawyer directory and sending a contact
    /// message are open to anonymous visitors.
    #[must_use]
    pub fn requires_auth(self, method: Method) -> bool {
        match self {
            Self::Bookings | Self::Lawyers => false,
            Self::Appointments | Self::ContactMessages => method != Method::Post,
            _ => true,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_matches('/'))
    }
}

/// Sends resource requests with the stored bearer token.
///
/// The client only reads the session. A 401 is reported as
/// [`ResourceError::Unauthenticated`]; the host decides whether to refresh or
/// send the visitor to sign in.
pub struct ResourceClient<T> {
    transport: T,
    session: SessionStore,
}

impl<T: HttpTransport> ResourceClient<T> {
    pub fn new(transport: T, session: SessionStore) -> Self {
        Self { transport, session }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Lists a collection. Accepts both a bare array and a paginated
    /// `{"results": [...]}` body.
    ///
    /// # Errors
    ///
    /// See [`ResourceError`].
    #[instrument(skip(self))]
    pub async fn list<M: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<M>, ResourceError> {
        self.list_at(collection, collection.path().to_string()).await
    }

    /// Lists records under a path that belongs to `collection`: a filtered
    /// query or a nested route.
    async fn list_at<M: DeserializeOwned>(
        &self,
        collection: Collection,
        path: String,
    ) -> Result<Vec<M>, ResourceError> {
        let response = self.send(collection, ApiRequest::get(&path)).await?;
        let items = match response.body() {
            JsonValue::Object(map) if map.contains_key("results") => map["results"].clone(),
            other => other.clone(),
        };
        let items: Vec<M> =
            serde_json::from_value(items).map_err(|e| ResourceError::Malformed {
                path,
                reason: e.to_string(),
            })?;
        debug!(count = items.len(), "listed");
        Ok(items)
    }

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// See [`ResourceError`].
    pub async fn get<M: DeserializeOwned>(
        &self,
        collection: Collection,
        id: impl fmt::Display,
    ) -> Result<M, ResourceError> {
        let response = self
            .send(collection, ApiRequest::get(collection.item_path(id)))
            .await?;
        decode(&response, collection.path())
    }

    /// Creates a record and returns the server's copy.
    ///
    /// # Errors
    ///
    /// See [`ResourceError`].
    pub async fn create<B: Serialize, M: DeserializeOwned>(
        &self,
        collection: Collection,
        body: &B,
    ) -> Result<M, ResourceError> {
        let request = ApiRequest::post(collection.path()).with_json(to_json(body, collection)?);
        let response = self.send(collection, request).await?;
        decode(&response, collection.path())
    }

    /// Partially updates a record.
    ///
    /// # Errors
    ///
    /// See [`ResourceError`].
    pub async fn update<B: Serialize, M: DeserializeOwned>(
        &self,
        collection: Collection,
        id: impl fmt::Display,
        body: &B,
    ) -> Result<M, ResourceError> {
        let request =
            ApiRequest::patch(collection.item_path(id)).with_json(to_json(body, collection)?);
        let response = self.send(collection, request).await?;
        decode(&response, collection.path())
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// See [`ResourceError`].
    pub async fn delete(
        &self,
        collection: Collection,
        id: impl fmt::Display,
    ) -> Result<(), ResourceError> {
        self.send(collection, ApiRequest::delete(collection.item_path(id)))
            .await?;
        Ok(())
    }

    pub async fn appointments(&self) -> Result<Vec<Appointment>, ResourceError> {
        self.list(Collection::Appointments).await
    }

    /// Appointments booked with one lawyer.
    pub async fn lawyer_appointments(
        &self,
        lawyer: UserId,
    ) -> Result<Vec<Appointment>, ResourceError> {
        let path = format!("{}?lawyer={lawyer}", Collection::Appointments.path());
        self.list_at(Collection::Appointments, path).await
    }

    pub async fn delete_appointment(&self, id: AppointmentId) -> Result<(), ResourceError> {
        self.delete(Collection::Appointments, id).await
    }

    /// Books a consultation with a lawyer from the public appointment page.
    pub async fn book_appointment(
        &self,
        booking: &NewAppointment,
    ) -> Result<Appointment, ResourceError> {
        booking.validate().map_err(ResourceError::Invalid)?;
        self.create(Collection::Appointments, booking).await
    }

    pub async fn contact_messages(&self) -> Result<Vec<ContactMessage>, ResourceError> {
        self.list(Collection::ContactMessages).await
    }

    /// Sends a contact form message. No sign-in needed.
    pub async fn send_contact_message(
        &self,
        message: &ContactMessage,
    ) -> Result<ContactMessage, ResourceError> {
        message.validate().map_err(ResourceError::Invalid)?;
        self.create(Collection::ContactMessages, message).await
    }

    pub async fn case_summaries(&self) -> Result<Vec<CaseSummary>, ResourceError> {
        self.list(Collection::CaseSummaries).await
    }

    pub async fn case_summary(&self, id: CaseId) -> Result<CaseSummary, ResourceError> {
        self.get(Collection::CaseSummaries, id).await
    }

    /// Cases assigned to one lawyer.
    pub async fn lawyer_cases(&self, lawyer: UserId) -> Result<Vec<CaseSummary>, ResourceError> {
        let path = format!("{}?lawyer_id={lawyer}", Collection::CaseSummaries.path());
        self.list_at(Collection::CaseSummaries, path).await
    }

    /// Documents filed under one case.
    pub async fn case_documents(&self, case: CaseId) -> Result<Vec<Document>, ResourceError> {
        self.list_at(Collection::Documents, case_child_path(case, "documents"))
            .await
    }

    /// Progress updates posted on one case.
    pub async fn case_updates(&self, case: CaseId) -> Result<Vec<CaseUpdate>, ResourceError> {
        self.list_at(Collection::CaseUpdates, case_child_path(case, "updates"))
            .await
    }

    pub async fn open_case(&self, case: &NewCaseSummary) -> Result<CaseSummary, ResourceError> {
        self.create(Collection::CaseSummaries, case).await
    }

    pub async fn post_case_update(&self, update: &CaseUpdate) -> Result<CaseUpdate, ResourceError> {
        self.create(Collection::CaseUpdates, update).await
    }

    pub async fn documents(&self) -> Result<Vec<Document>, ResourceError> {
        self.list(Collection::Documents).await
    }

    pub async fn users(&self) -> Result<Vec<ManagedUser>, ResourceError> {
        self.list(Collection::Users).await
    }

    /// Changes a user's role and practice area.
    pub async fn assign_role(
        &self,
        user: UserId,
        assignment: &RoleAssignment,
    ) -> Result<ManagedUser, ResourceError> {
        self.update(Collection::Users, user, assignment).await
    }

    /// Changes a lawyer's practice area.
    pub async fn update_lawyer_type(
        &self,
        user: UserId,
        lawyer_type: &LawyerType,
    ) -> Result<ManagedUser, ResourceError> {
        let path = format!("/update-lawyer-type/{user}/");
        let request = ApiRequest::patch(&path).with_json(json!({ "lawyer_type": lawyer_type }));
        let response = self.send(Collection::Users, request).await?;
        decode(&response, &path)
    }

    pub async fn lawyers(&self) -> Result<Vec<Lawyer>, ResourceError> {
        self.list(Collection::Lawyers).await
    }

    async fn send(
        &self,
        collection: Collection,
        request: ApiRequest,
    ) -> Result<ApiResponse, ResourceError> {
        let token = self.session.read();
        if token.is_none() && collection.requires_auth(request.method()) {
            debug!(%collection, "no access token; not sending");
            return Err(ResourceError::Unauthenticated);
        }

        let path = request.path().to_string();
        let response = self
            .transport
            .send(request.with_optional_bearer(token))
            .await
            .map_err(|e| {
                warn!(%collection, error = %e, "resource request failed");
                ResourceError::Network {
                    reason: e.current_context().to_string(),
                }
            })?;

        match response.status() {
            status if (200..300).contains(&status) => Ok(response),
            401 => Err(ResourceError::Unauthenticated),
            403 => Err(ResourceError::Forbidden {
                message: response.detail().unwrap_or_else(|| {
                    "You do not have permission to perform this action.".to_string()
                }),
            }),
            404 => Err(ResourceError::NotFound { path }),
            400 => Err(ResourceError::Invalid(FieldErrors::from_response_body(
                response.body(),
            ))),
            status => {
                warn!(%collection, status, "unexpected response status");
                Err(ResourceError::UnexpectedStatus { path, status })
            }
        }
    }
}

fn case_child_path(case: CaseId, child: &str) -> String {
    format!("/case-summary/{case}/{child}/")
}

fn decode<M: DeserializeOwned>(response: &ApiResponse, path: &str) -> Result<M, ResourceError> {
    response.json().map_err(|e| ResourceError::Malformed {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn to_json<B: Serialize>(body: &B, collection: Collection) -> Result<JsonValue, ResourceError> {
    serde_json::to_value(body).map_err(|e| ResourceError::Malformed {
        path: collection.path().to_string(),
        reason: e.to_string(),
    })
}
