//! Transport seam for the events resource.
//!
//! Implementations perform exactly one HTTP round trip per call and report
//! whatever status came back; they never retry or interpret statuses. That
//! is the engine's job.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::BearerToken;
use crate::event::{BoundaryPatch, NewEvent, ResourceId};

/// Raw HTTP answer: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 404 Not Found or 410 Gone.
    pub fn is_gone(&self) -> bool {
        self.status == 404 || self.status == 410
    }
}

/// The request never produced an HTTP status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait EventsApi: Send + Sync {
    /// `GET /events/{id}`
    async fn get_event(
        &self,
        token: &BearerToken,
        id: &ResourceId,
    ) -> Result<ApiResponse, TransportError>;

    /// `DELETE /events/{id}`
    async fn delete_event(
        &self,
        token: &BearerToken,
        id: &ResourceId,
    ) -> Result<ApiResponse, TransportError>;

    /// `PATCH /events/{id}` with only the boundary fields.
    async fn patch_event(
        &self,
        token: &BearerToken,
        id: &ResourceId,
        patch: &BoundaryPatch,
    ) -> Result<ApiResponse, TransportError>;

    /// `POST /events`
    async fn insert_event(
        &self,
        token: &BearerToken,
        event: &NewEvent,
    ) -> Result<ApiResponse, TransportError>;
}
