use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{Date, OffsetDateTime};

use super::{BlockId, FamilyId, MemberId, TaskId, TaskTemplateId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Done,
    Accepted,
}

/// Who may mark the task done: the child it is assigned to, or a parent
/// (e.g. observed behaviors the child cannot self-report).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TaskInput {
    Child,
    Parent,
}

/// One selectable option of a picklist task, carrying its own point value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicklistOption {
    pub value: String,
    pub label: String,
    pub points: i32,
}

/// Task payload variants. A picklist task is graded by the parent picking
/// one of several mutually exclusive options; a simple task is just done
/// or not. Keeping this a tagged union makes "picklist metadata on a
/// simple task" unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Simple,
    Picklist {
        options: Vec<PicklistOption>,
        selected: Option<String>,
    },
}

/// A single dated unit of work assigned to one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub family_id: FamilyId,
    pub member_id: MemberId,
    pub date: Date,
    pub title: String,
    /// Schedule block this task belongs to; `None` makes it a bonus task.
    pub block_id: Option<BlockId>,
    /// Legacy sectioned layout association ("morning" etc).
    pub day_section: Option<String>,
    pub duration_minutes: i32,
    pub star_value: i32,
    pub sort_order: i32,
    pub input_type: TaskInput,
    pub status: TaskStatus,
    pub completed_at: Option<OffsetDateTime>,
    pub accepted_at: Option<OffsetDateTime>,
    pub kind: TaskKind,
    /// Template that materialized this task, if it was spawned.
    pub template_id: Option<TaskTemplateId>,
    pub created_at: OffsetDateTime,
}

impl Task {
    /// Done or accepted, the states the timeline treats as finished.
    pub fn is_complete(&self) -> bool {
        matches!(self.status, TaskStatus::Done | TaskStatus::Accepted)
    }

    pub fn is_bonus(&self) -> bool {
        self.block_id.is_none()
    }
}

/// The computed next state of a picklist selection, applied to the store
/// as one partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicklistState {
    pub selected: Option<String>,
    pub status: TaskStatus,
    pub star_value: i32,
    pub completed_at: Option<OffsetDateTime>,
}
