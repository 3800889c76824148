use thiserror::Error;

use super::models::{MemberId, TaskId, TaskStatus};
use super::ports::outbound::StoreError;
use super::timeclock::TimeclockError;

/// Errors surfaced by the day-view and task-action services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),
    #[error("not permitted: {0}")]
    NotPermitted(String),
    #[error("cannot {action} a task in status '{from}'")]
    InvalidTransition {
        from: TaskStatus,
        action: &'static str,
    },
    #[error("task {0} is not a picklist")]
    NotAPicklist(TaskId),
    #[error("unknown picklist option '{0}'")]
    UnknownOption(String),
    #[error(transparent)]
    Timeclock(#[from] TimeclockError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn not_permitted(msg: impl Into<String>) -> Self {
        Self::NotPermitted(msg.into())
    }
}
