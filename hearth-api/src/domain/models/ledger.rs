use time::OffsetDateTime;

use super::{LedgerEntryId, MemberId, TaskId};

/// An immutable record of stars granted for one accepted task.
///
/// The ledger is the source of truth for what was ever granted; a member's
/// `star_balance` is a denormalized counter kept in sync by applying the
/// same signed delta inside the transaction that inserts or deletes an
/// entry. Un-acceptance removes the entry (compensating delete), so at
/// most one entry exists per (member, task) at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarLedgerEntry {
    pub id: LedgerEntryId,
    pub member_id: MemberId,
    pub task_id: TaskId,
    pub stars: i32,
    pub earned_at: OffsetDateTime,
}

/// A ledger entry joined with its task's title, for the history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntryWithTask {
    pub entry: StarLedgerEntry,
    pub task_title: String,
}
