use async_trait::async_trait;

use crate::domain::models::{LedgerEntryWithTask, MemberId, TaskId};

use super::StoreError;

/// Outbound port for the star ledger and its coupled balance counter.
///
/// `grant` and `revoke` are the two multi-step mutations of the system:
/// each flips the task's status, touches the ledger, and adjusts the
/// member's balance. Implementations must apply all three as one atomic
/// unit (partial application would let the balance and the ledger
/// diverge) and must use the task's current status as a precondition so
/// a blind retry is rejected with [`StoreError::Conflict`] instead of
/// granting twice.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Most recent entries for a member, newest first.
    async fn recent_for_member(
        &self,
        member_id: MemberId,
        limit: i64,
    ) -> Result<Vec<LedgerEntryWithTask>, StoreError>;

    /// Accept a `done` task: status → `accepted` with timestamp, insert
    /// one ledger entry of `stars`, increment the member's balance.
    async fn grant(
        &self,
        task_id: TaskId,
        member_id: MemberId,
        stars: i32,
    ) -> Result<(), StoreError>;

    /// Un-accept an `accepted` task: status → `done`, delete the ledger
    /// entry, decrement the balance by the stars that entry actually
    /// granted. Returns the revoked star amount.
    async fn revoke(&self, task_id: TaskId, member_id: MemberId) -> Result<i32, StoreError>;
}
