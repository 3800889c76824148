mod ledger_store;
mod member_store;
mod schedule_store;
mod task_store;

#[cfg(test)]
pub mod mock;

pub use ledger_store::LedgerStore;
pub use member_store::MemberStore;
pub use schedule_store::{NewScheduleBlock, ScheduleStore};
pub use task_store::{NewTask, TaskStore, UpdateTask};

use thiserror::Error;

/// Errors from the record store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("not found: {0}")]
    NotFound(String),
    /// An expected-prior-state precondition did not hold (e.g. accepting a
    /// task that is no longer `done`). Retries surface this instead of
    /// double-applying ledger effects.
    #[error("precondition failed: {0}")]
    Conflict(String),
}
