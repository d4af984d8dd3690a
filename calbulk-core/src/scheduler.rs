//! Wave-based fan-out.
//!
//! Resources are processed in consecutive waves of at most `width`
//! concurrent mutations. A wave must fully settle before the next one starts,
//! so in-flight requests never exceed `width` and progress only moves
//! forward. Outcomes are aggregated by the scheduler at wave boundaries; the
//! in-flight futures never touch the result buckets.

use futures::future::join_all;
use tracing::info;

use crate::auth::BearerToken;
use crate::event::ResourceSnapshot;
use crate::executor::MutationExecutor;
use crate::outcome::{BatchResult, Operation};

#[derive(Clone)]
pub struct BatchScheduler {
    executor: MutationExecutor,
    width: usize,
}

impl BatchScheduler {
    pub fn new(executor: MutationExecutor, width: usize) -> Self {
        BatchScheduler {
            executor,
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Run every snapshot to a terminal outcome.
    ///
    /// `progress` receives `(processed, total)` once before the first wave
    /// and once after each wave.
    pub async fn run(
        &self,
        token: &BearerToken,
        snapshots: Vec<ResourceSnapshot>,
        operation: &Operation,
        progress: Option<&(dyn Fn(usize, usize) + Send + Sync)>,
    ) -> BatchResult {
        let total = snapshots.len();
        let mut result = BatchResult::default();
        let mut processed = 0;

        let report = |processed: usize| {
            if let Some(progress) = progress {
                progress(processed, total);
            }
        };

        report(processed);

        for (index, wave) in snapshots.chunks(self.width).enumerate() {
            info!(
                wave = index + 1,
                size = wave.len(),
                "Processing wave ({}/{} done)",
                processed,
                total
            );

            let outcomes = join_all(
                wave.iter()
                    .cloned()
                    .map(|snapshot| self.executor.execute(token, snapshot, operation)),
            )
            .await;

            processed += wave.len();
            result.extend(outcomes);
            report(processed);
        }

        result
    }
}
