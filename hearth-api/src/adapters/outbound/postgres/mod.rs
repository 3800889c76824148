//! sqlx Postgres implementations of the outbound store ports.
//!
//! Queries are runtime-bound against a shared [`sqlx::PgPool`]. The
//! multi-step ledger mutations run inside a single transaction with the
//! task's prior status as a write precondition (see `PgLedgerStore`).

mod ledger_store;
mod member_store;
mod schedule_store;
mod task_store;

pub use ledger_store::PgLedgerStore;
pub use member_store::PgMemberStore;
pub use schedule_store::PgScheduleStore;
pub use task_store::PgTaskStore;

use crate::domain::ports::outbound::StoreError;

/// Wrap a row-decoding failure (corrupt enum string, out-of-range minute)
/// as a store error.
fn decode_err(e: impl std::error::Error + Send + Sync + 'static) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(Box::new(e)))
}
