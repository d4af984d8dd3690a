//! Batch orchestration: fetch, filter, schedule, aggregate, record undo.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::auth::{AuthorizationProvider, BearerToken};
use crate::config::EngineConfig;
use crate::error::{BulkError, BulkResult};
use crate::event::{ResourceId, ResourceSnapshot};
use crate::executor::MutationExecutor;
use crate::fetcher::{FetchOutcome, ResourceFetcher};
use crate::outcome::{BatchResult, Operation};
use crate::remote::EventsApi;
use crate::retry::RetryPolicy;
use crate::scheduler::BatchScheduler;
use crate::selection::SelectionState;
use crate::undo::{UndoAction, UndoRecord, UndoStore};

/// Receives `(processed, total)` at every wave boundary.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

pub struct BulkOperationEngine {
    auth: Arc<dyn AuthorizationProvider>,
    fetcher: ResourceFetcher,
    scheduler: BatchScheduler,
    undo_store: Arc<dyn UndoStore>,
    progress: Option<ProgressFn>,
}

impl BulkOperationEngine {
    pub fn new(
        api: Arc<dyn EventsApi>,
        auth: Arc<dyn AuthorizationProvider>,
        undo_store: Arc<dyn UndoStore>,
        config: &EngineConfig,
    ) -> Self {
        let executor = MutationExecutor::new(api.clone(), RetryPolicy::from(&config.retry));

        BulkOperationEngine {
            auth,
            fetcher: ResourceFetcher::new(api),
            scheduler: BatchScheduler::new(executor, config.wave_width()),
            undo_store,
            progress: None,
        }
    }

    pub fn set_progress_callback(&mut self, callback: ProgressFn) {
        self.progress = Some(callback);
    }

    pub async fn bulk_delete(&self, selection: &SelectionState) -> BulkResult<BatchResult> {
        self.run(selection.ids(), Operation::Delete).await
    }

    pub async fn bulk_move(
        &self,
        selection: &SelectionState,
        delta_minutes: i64,
    ) -> BulkResult<BatchResult> {
        if delta_minutes == 0 {
            return Err(BulkError::ZeroDelta);
        }
        self.run(selection.ids(), Operation::MoveBy(delta_minutes)).await
    }

    /// The record the next `undo_last_action` would consume.
    pub fn last_action(&self) -> BulkResult<Option<UndoRecord>> {
        self.undo_store.load()
    }

    /// Revert the last recorded batch.
    ///
    /// A move is reverted by moving the same events by the negated delta. A
    /// delete is reverted by recreating each event from its snapshot; the new
    /// events get new ids and only summary, description, start and end are
    /// restored. The record is consumed once the undo batch has run,
    /// whatever its per-event outcomes. Returns `None` when there is nothing
    /// to undo.
    pub async fn undo_last_action(&self) -> BulkResult<Option<BatchResult>> {
        let Some(record) = self.undo_store.load()? else {
            return Ok(None);
        };

        let token = self.auth.get_token(true).await?;

        let result = match record.action {
            UndoAction::Move => {
                let delta = record.delta.filter(|d| *d != 0).ok_or_else(|| {
                    BulkError::UndoStore("move record is missing its delta".into())
                })?;
                let ids: Vec<ResourceId> =
                    record.snapshots.iter().map(|s| s.id.clone()).collect();
                info!(count = ids.len(), delta = -delta, "Undoing move");
                self.execute(&token, &ids, Operation::MoveBy(-delta)).await
            }
            UndoAction::Delete => {
                info!(count = record.snapshots.len(), "Undoing delete by recreating events");
                self.mutate(&token, record.snapshots, Operation::Recreate).await
            }
        };

        if let Err(e) = self.undo_store.clear() {
            warn!(error = %e, "Could not clear undo record after undo");
        }

        Ok(Some(result))
    }

    async fn run(&self, ids: &[ResourceId], operation: Operation) -> BulkResult<BatchResult> {
        if ids.is_empty() {
            return Ok(BatchResult::default());
        }

        let token = self.auth.get_token(true).await?;
        let result = self.execute(&token, ids, operation).await;

        if !result.successes.is_empty() {
            self.record_undo(&result, operation);
        }

        Ok(result)
    }

    async fn execute(
        &self,
        token: &BearerToken,
        ids: &[ResourceId],
        operation: Operation,
    ) -> BatchResult {
        let fetched = self.fetcher.fetch_all(token, ids).await;

        let mut snapshots = Vec::with_capacity(fetched.len());
        let (mut gone, mut unreachable) = (0, 0);
        for outcome in fetched {
            match outcome {
                FetchOutcome::Valid(snapshot) => snapshots.push(snapshot),
                FetchOutcome::Gone(_) => gone += 1,
                FetchOutcome::Unreachable { .. } => unreachable += 1,
            }
        }

        info!(
            requested = ids.len(),
            valid = snapshots.len(),
            gone,
            unreachable,
            "Fetched events for {}",
            operation.verb()
        );

        if snapshots.is_empty() {
            return BatchResult::default();
        }

        self.mutate(token, snapshots, operation).await
    }

    async fn mutate(
        &self,
        token: &BearerToken,
        snapshots: Vec<ResourceSnapshot>,
        operation: Operation,
    ) -> BatchResult {
        let result = self
            .scheduler
            .run(token, snapshots, &operation, self.progress.as_deref())
            .await;

        info!(
            succeeded = result.successes.len(),
            skipped = result.skipped.len(),
            failed = result.failures.len(),
            "Bulk {} finished",
            operation.verb()
        );

        result
    }

    fn record_undo(&self, result: &BatchResult, operation: Operation) {
        let snapshots = result.success_snapshots();
        let record = match operation {
            Operation::Delete => UndoRecord::deleted(snapshots),
            Operation::MoveBy(delta) => UndoRecord::moved(snapshots, delta),
            Operation::Recreate => return,
        };

        if let Err(e) = self.undo_store.save(&record) {
            error!(error = %e, "Could not save undo record");
        }
    }
}
