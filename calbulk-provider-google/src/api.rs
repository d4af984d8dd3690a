//! Events resource of the Google Calendar v3 REST API.
//!
//! Responses are handed back raw (status + body) so the engine can classify
//! them; nothing here interprets a non-2xx status.

use anyhow::{Context, Result};
use async_trait::async_trait;
use calbulk_core::event::{BoundaryPatch, NewEvent};
use calbulk_core::{ApiResponse, BearerToken, EventsApi, ResourceId, TransportError};
use reqwest::RequestBuilder;
use url::Url;

use crate::config::GoogleConfig;

#[derive(Clone)]
pub struct GoogleCalendarApi {
    http: reqwest::Client,
    base_url: Url,
    calendar_id: String,
}

impl GoogleCalendarApi {
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url)
            .with_context(|| format!("Invalid Google API base URL: {}", config.api_base_url))?;

        if base_url.cannot_be_a_base() {
            anyhow::bail!("Google API base URL must be hierarchical: {}", base_url);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(GoogleCalendarApi {
            http,
            base_url,
            calendar_id: config.calendar_id.clone(),
        })
    }

    /// `{base}/calendars/{calendar_id}/events[/{id}]`, with every segment
    /// percent-encoded.
    pub fn events_url(&self, id: Option<&ResourceId>) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TransportError(format!("Cannot extend URL {}", self.base_url)))?;
            segments
                .pop_if_empty()
                .extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        token: &BearerToken,
    ) -> Result<ApiResponse, TransportError> {
        let response = request
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("Failed to read response body: {}", e)))?;

        tracing::trace!(status, "Google Calendar responded");

        Ok(ApiResponse::new(status, body))
    }
}

#[async_trait]
impl EventsApi for GoogleCalendarApi {
    async fn get_event(
        &self,
        token: &BearerToken,
        id: &ResourceId,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.events_url(Some(id))?;
        self.send(self.http.get(url), token).await
    }

    async fn delete_event(
        &self,
        token: &BearerToken,
        id: &ResourceId,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.events_url(Some(id))?;
        self.send(self.http.delete(url), token).await
    }

    async fn patch_event(
        &self,
        token: &BearerToken,
        id: &ResourceId,
        patch: &BoundaryPatch,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.events_url(Some(id))?;
        self.send(self.http.patch(url).json(patch), token).await
    }

    async fn insert_event(
        &self,
        token: &BearerToken,
        event: &NewEvent,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.events_url(None)?;
        self.send(self.http.post(url).json(event), token).await
    }
}
