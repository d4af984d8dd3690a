//! Single-resource mutation with retries.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::auth::BearerToken;
use crate::event::{BoundaryPatch, NewEvent, ResourceSnapshot};
use crate::outcome::{AttemptOutcome, Failure, FailureReason, Operation, SkipReason};
use crate::remote::{ApiResponse, EventsApi, TransportError};
use crate::retry::{AttemptError, RetryDecision, RetryPolicy};

/// The request body prepared once per resource, before the first attempt.
enum PreparedRequest {
    Delete,
    Patch(BoundaryPatch),
    Insert(NewEvent),
}

#[derive(Clone)]
pub struct MutationExecutor {
    api: Arc<dyn EventsApi>,
    policy: RetryPolicy,
}

impl MutationExecutor {
    pub fn new(api: Arc<dyn EventsApi>, policy: RetryPolicy) -> Self {
        MutationExecutor { api, policy }
    }

    /// Drive one resource to a terminal outcome.
    ///
    /// The returned outcome always carries `snapshot` as it was before the
    /// mutation, never the server's post-mutation representation.
    pub async fn execute(
        &self,
        token: &BearerToken,
        snapshot: ResourceSnapshot,
        operation: &Operation,
    ) -> AttemptOutcome {
        let request = match operation {
            Operation::Delete => PreparedRequest::Delete,
            Operation::MoveBy(minutes) => match BoundaryPatch::shift(&snapshot, *minutes) {
                Ok(patch) => PreparedRequest::Patch(patch),
                Err(_) => {
                    error!(
                        title = %snapshot.title,
                        start = ?snapshot.start,
                        end = ?snapshot.end,
                        "Invalid time for event"
                    );
                    return AttemptOutcome::Failed {
                        snapshot,
                        failure: Failure::new(FailureReason::InvalidTime),
                    };
                }
            },
            Operation::Recreate => PreparedRequest::Insert(NewEvent::from(&snapshot)),
        };

        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let attempt_error = match self.send(token, &snapshot, &request).await {
                Ok(response)
                    if response.is_success()
                        || (operation.absence_is_success() && response.is_gone()) =>
                {
                    return AttemptOutcome::Success(snapshot);
                }
                Ok(ApiResponse { status, body }) => AttemptError::Status { status, body },
                Err(TransportError(message)) => AttemptError::Network(message),
            };

            match self.policy.classify(attempt, &attempt_error) {
                RetryDecision::Retry(delay) => {
                    warn!(
                        title = %snapshot.title,
                        "{} for event, attempt {}/{}, retrying in {:?}",
                        attempt_error,
                        attempt,
                        max_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Skip => {
                    debug!(title = %snapshot.title, "Skipping event (403 - no permission)");
                    return AttemptOutcome::Skipped {
                        snapshot,
                        reason: SkipReason::NoPermission,
                    };
                }
                RetryDecision::Fail(reason) => {
                    error!(
                        title = %snapshot.title,
                        reason = %reason,
                        "Failed to {} event after {} attempt(s): {}",
                        operation.verb(),
                        attempt,
                        attempt_error
                    );
                    let failure = match attempt_error {
                        AttemptError::Status { status, body } => Failure {
                            reason,
                            status: Some(status),
                            body: Some(body),
                            network_error: None,
                        },
                        AttemptError::Network(message) => Failure {
                            reason,
                            status: None,
                            body: None,
                            network_error: Some(message),
                        },
                    };
                    return AttemptOutcome::Failed { snapshot, failure };
                }
            }
        }
    }

    async fn send(
        &self,
        token: &BearerToken,
        snapshot: &ResourceSnapshot,
        request: &PreparedRequest,
    ) -> Result<ApiResponse, TransportError> {
        match request {
            PreparedRequest::Delete => self.api.delete_event(token, &snapshot.id).await,
            PreparedRequest::Patch(patch) => self.api.patch_event(token, &snapshot.id, patch).await,
            PreparedRequest::Insert(event) => self.api.insert_event(token, event).await,
        }
    }
}
