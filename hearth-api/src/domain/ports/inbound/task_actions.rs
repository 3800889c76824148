use async_trait::async_trait;

use crate::domain::{
    error::DomainError,
    models::{FamilyMember, Task, TaskId},
};

/// Inbound port for the task lifecycle state machine.
///
/// `pending → done → accepted`, with the reversals `done → pending`
/// (undo) and `accepted → done` (unaccept). Every method re-checks the
/// authorization matrix server-side, since the UI hiding a control is not
/// a security boundary. Methods return the task as it stands after the
/// transition.
#[async_trait]
pub trait TaskActions: Send + Sync + 'static {
    /// Child (child-input tasks) or parent (parent-input tasks) marks a
    /// pending task done. No ledger effect.
    async fn mark_done(&self, actor: &FamilyMember, task_id: TaskId)
        -> Result<Task, DomainError>;

    /// Child reverts their own done task to pending. No ledger effect.
    async fn undo(&self, actor: &FamilyMember, task_id: TaskId) -> Result<Task, DomainError>;

    /// Parent accepts a done task: one ledger entry and a balance
    /// increment, applied atomically with the status flip.
    async fn accept(&self, actor: &FamilyMember, task_id: TaskId) -> Result<Task, DomainError>;

    /// Parent reverts an accepted task to done: the ledger entry is
    /// deleted and the balance decremented, atomically.
    async fn unaccept(&self, actor: &FamilyMember, task_id: TaskId)
        -> Result<Task, DomainError>;

    /// Parent selects (or toggles off) a picklist option. Points are
    /// provisional: status becomes `done`, never `accepted`, and the
    /// ledger is untouched until a separate accept.
    async fn picklist_select(
        &self,
        actor: &FamilyMember,
        task_id: TaskId,
        value: &str,
    ) -> Result<Task, DomainError>;
}
