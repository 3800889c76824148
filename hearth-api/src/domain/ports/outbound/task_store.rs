use async_trait::async_trait;
use time::{Date, OffsetDateTime};

use crate::domain::{
    day_type::DayType,
    models::{
        BlockId, FamilyId, MemberId, PicklistState, Task, TaskId, TaskInput, TaskKind,
    },
};

use super::StoreError;

/// Fields for creating a task by explicit parent action.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub family_id: FamilyId,
    pub member_id: MemberId,
    pub date: Date,
    pub title: String,
    pub block_id: Option<BlockId>,
    pub day_section: Option<String>,
    pub duration_minutes: i32,
    pub star_value: i32,
    pub sort_order: i32,
    pub input_type: TaskInput,
    pub kind: TaskKind,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub day_section: Option<String>,
    /// `Some(None)` detaches the task from its block.
    pub block_id: Option<Option<BlockId>>,
    pub duration_minutes: Option<i32>,
    pub star_value: Option<i32>,
    pub sort_order: Option<i32>,
    pub input_type: Option<TaskInput>,
}

/// Outbound port for task persistence.
///
/// Status transitions take the expected prior status as a write
/// precondition; an update that matches zero rows reports
/// [`StoreError::Conflict`] so a raced or retried call cannot apply twice.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    async fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Tasks for one member and date, ordered by section/block then
    /// sort_order.
    async fn for_member_date(
        &self,
        member_id: MemberId,
        date: Date,
    ) -> Result<Vec<Task>, StoreError>;

    async fn for_family_date(
        &self,
        family_id: FamilyId,
        date: Date,
    ) -> Result<Vec<Task>, StoreError>;

    async fn insert(&self, task: &NewTask) -> Result<Task, StoreError>;

    async fn update(&self, id: TaskId, update: &UpdateTask) -> Result<Task, StoreError>;

    async fn delete(&self, id: TaskId) -> Result<(), StoreError>;

    /// `pending → done`, recording the completion timestamp.
    async fn mark_done(&self, id: TaskId, at: OffsetDateTime) -> Result<(), StoreError>;

    /// `done → pending`, clearing the completion timestamp.
    async fn mark_undone(&self, id: TaskId) -> Result<(), StoreError>;

    /// Apply a computed picklist selection (selection, status, star value
    /// and completion timestamp) as one write. Precondition: the task is
    /// not `accepted`.
    async fn apply_picklist(
        &self,
        id: TaskId,
        state: &PicklistState,
    ) -> Result<(), StoreError>;

    /// Materialize tasks for `date` from the recurring templates.
    /// Idempotent: templates already materialized for the date are skipped,
    /// so calling twice yields the same task set. Returns the number of
    /// tasks created by this call.
    async fn spawn_for_date(&self, date: Date, day_type: DayType) -> Result<u64, StoreError>;
}
