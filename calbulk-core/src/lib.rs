//! Core engine for calbulk.
//!
//! This crate turns a selection of remote calendar event identifiers into a
//! reliably executed batch of remote mutations:
//! - `retry` classifies every HTTP outcome and computes backoff delays
//! - `fetcher` captures pre-mutation snapshots
//! - `executor` drives one resource's mutation through the retry policy
//! - `scheduler` fans resources out in fixed-width waves
//! - `engine` orchestrates a whole batch and records undo state
//!
//! Transport, authorization and undo persistence are collaborators expressed
//! as traits (`remote::EventsApi`, `auth::AuthorizationProvider`,
//! `undo::UndoStore`).

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod executor;
pub mod fetcher;
pub mod outcome;
pub mod remote;
pub mod retry;
pub mod scheduler;
pub mod selection;
pub mod undo;

pub use auth::{AuthError, AuthorizationProvider, BearerToken, StaticTokenProvider};
pub use config::{EngineConfig, RetryConfig};
pub use engine::{BulkOperationEngine, ProgressFn};
pub use error::{BulkError, BulkResult};
pub use event::{EventBoundary, ResourceId, ResourceSnapshot};
pub use executor::MutationExecutor;
pub use fetcher::{FetchOutcome, ResourceFetcher};
pub use outcome::{
    AttemptOutcome, BatchResult, BatchVerdict, Failure, FailureReason, Operation, SkipReason,
};
pub use remote::{ApiResponse, EventsApi, TransportError};
pub use retry::{AttemptError, RetryDecision, RetryPolicy};
pub use scheduler::BatchScheduler;
pub use selection::SelectionState;
pub use undo::{FileUndoStore, MemoryUndoStore, UndoAction, UndoRecord, UndoStore};
