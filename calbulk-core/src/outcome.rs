//! Operations, per-resource outcomes and batch aggregation.

use serde::{Deserialize, Serialize};

use crate::event::{ResourceId, ResourceSnapshot};

/// The mutation applied to every resource of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Delete,
    /// Shift start and end by this many minutes (never zero).
    MoveBy(i64),
    /// Create a new event from the snapshot. Used to undo a delete.
    Recreate,
}

impl Operation {
    /// Whether 404/410 means the mutation has effectively happened.
    ///
    /// True for calls addressed to the resource itself; a `Recreate` posts to
    /// the collection, so a 404 there means the calendar is missing.
    pub fn absence_is_success(&self) -> bool {
        !matches!(self, Operation::Recreate)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Delete => "delete",
            Operation::MoveBy(_) => "move",
            Operation::Recreate => "restore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Transient errors persisted through every allowed attempt.
    MaxRetries,
    /// Rate-limit 403s persisted through every allowed attempt.
    RateLimitExceeded,
    /// A non-retryable status.
    Permanent,
    /// The snapshot's start or end could not be parsed.
    InvalidTime,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::MaxRetries => "max_retries",
            FailureReason::RateLimitExceeded => "rate_limit_exceeded",
            FailureReason::Permanent => "permanent",
            FailureReason::InvalidTime => "invalid_time",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoPermission,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoPermission => "no_permission",
        }
    }
}

/// Diagnostics carried by a terminal failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub reason: FailureReason,
    pub status: Option<u16>,
    pub body: Option<String>,
    /// Transport error message when the last attempt never got a status.
    pub network_error: Option<String>,
}

impl Failure {
    pub fn new(reason: FailureReason) -> Self {
        Failure {
            reason,
            status: None,
            body: None,
            network_error: None,
        }
    }
}

/// Terminal outcome for one resource. Always carries the pre-mutation snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(ResourceSnapshot),
    Skipped {
        snapshot: ResourceSnapshot,
        reason: SkipReason,
    },
    Failed {
        snapshot: ResourceSnapshot,
        failure: Failure,
    },
}

impl AttemptOutcome {
    pub fn snapshot(&self) -> &ResourceSnapshot {
        match self {
            AttemptOutcome::Success(snapshot)
            | AttemptOutcome::Skipped { snapshot, .. }
            | AttemptOutcome::Failed { snapshot, .. } => snapshot,
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.snapshot().id
    }
}

/// Every mutated resource lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub successes: Vec<AttemptOutcome>,
    pub skipped: Vec<AttemptOutcome>,
    pub failures: Vec<AttemptOutcome>,
}

impl BatchResult {
    pub fn push(&mut self, outcome: AttemptOutcome) {
        match outcome {
            AttemptOutcome::Success(_) => self.successes.push(outcome),
            AttemptOutcome::Skipped { .. } => self.skipped.push(outcome),
            AttemptOutcome::Failed { .. } => self.failures.push(outcome),
        }
    }

    pub fn total(&self) -> usize {
        self.successes.len() + self.skipped.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn success_snapshots(&self) -> Vec<ResourceSnapshot> {
        self.successes.iter().map(|o| o.snapshot().clone()).collect()
    }

    /// What the caller should tell the user, and whether it may reflect the
    /// change (reload derived state).
    pub fn verdict(&self) -> BatchVerdict {
        if !self.failures.is_empty() {
            return BatchVerdict::Inconsistent {
                failed_titles: self
                    .failures
                    .iter()
                    .map(|o| o.snapshot().title.clone())
                    .collect(),
            };
        }

        if self.successes.is_empty() {
            if self.skipped.is_empty() {
                return BatchVerdict::NothingToDo;
            }
            return BatchVerdict::NothingPermitted {
                skipped: self.skipped.len(),
            };
        }

        BatchVerdict::Applied {
            succeeded: self.successes.len(),
            skipped: self.skipped.len(),
        }
    }

    pub fn should_reflect(&self) -> bool {
        matches!(self.verdict(), BatchVerdict::Applied { .. })
    }
}

impl Extend<AttemptOutcome> for BatchResult {
    fn extend<T: IntoIterator<Item = AttemptOutcome>>(&mut self, iter: T) {
        for outcome in iter {
            self.push(outcome);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchVerdict {
    /// Some resources failed; the data is in a known-inconsistent state and
    /// the change must not be reflected.
    Inconsistent { failed_titles: Vec<String> },
    /// Every mutated resource was skipped for lack of permission.
    NothingPermitted { skipped: usize },
    /// No resource reached the mutation stage.
    NothingToDo,
    Applied { succeeded: usize, skipped: usize },
}
