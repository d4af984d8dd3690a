//! Snapshot capture before mutation.

use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::auth::BearerToken;
use crate::event::{RemoteEvent, ResourceId, ResourceSnapshot};
use crate::remote::EventsApi;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Valid(ResourceSnapshot),
    /// 404/410: the resource no longer exists.
    Gone(ResourceId),
    /// Any other failure. Not retried; the id is left out of the batch.
    Unreachable { id: ResourceId, cause: String },
}

#[derive(Clone)]
pub struct ResourceFetcher {
    api: Arc<dyn EventsApi>,
}

impl ResourceFetcher {
    pub fn new(api: Arc<dyn EventsApi>) -> Self {
        ResourceFetcher { api }
    }

    pub async fn fetch(&self, token: &BearerToken, id: &ResourceId) -> FetchOutcome {
        let response = match self.api.get_event(token, id).await {
            Ok(response) => response,
            Err(e) => {
                debug!(id = %id, error = %e, "Excluding event: fetch failed");
                return FetchOutcome::Unreachable {
                    id: id.clone(),
                    cause: format!("network error: {}", e),
                };
            }
        };

        if response.is_gone() {
            debug!(id = %id, status = response.status, "Excluding event: already gone");
            return FetchOutcome::Gone(id.clone());
        }

        if !response.is_success() {
            debug!(id = %id, status = response.status, "Excluding event: fetch returned error");
            return FetchOutcome::Unreachable {
                id: id.clone(),
                cause: format!("HTTP {}", response.status),
            };
        }

        match serde_json::from_str::<RemoteEvent>(&response.body) {
            Ok(remote) => FetchOutcome::Valid(remote.into_snapshot(id.clone())),
            Err(e) => {
                debug!(id = %id, error = %e, "Excluding event: unreadable body");
                FetchOutcome::Unreachable {
                    id: id.clone(),
                    cause: format!("invalid event body: {}", e),
                }
            }
        }
    }

    /// Fetch every id concurrently, unbounded. Output order follows `ids`.
    pub async fn fetch_all(&self, token: &BearerToken, ids: &[ResourceId]) -> Vec<FetchOutcome> {
        join_all(ids.iter().map(|id| self.fetch(token, id))).await
    }
}
