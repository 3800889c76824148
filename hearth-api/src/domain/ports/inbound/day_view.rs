use async_trait::async_trait;
use time::Date;

use crate::domain::{
    classifier::PhaseTag,
    day_type::DayType,
    error::DomainError,
    models::{DaySection, MemberId, ScheduleBlock, ScheduleTemplate, Task},
    timeline::TimelineSlot,
};

/// One schedule block annotated with its phase and the tasks grouped
/// under it.
#[derive(Debug, Clone)]
pub struct BlockView {
    pub block: ScheduleBlock,
    pub tag: PhaseTag,
    pub tasks: Vec<Task>,
}

/// A member's fully assembled day: the resolved template's blocks with
/// phases, plus the bonus tasks that belong to no block.
#[derive(Debug, Clone)]
pub struct DayView {
    pub date: Date,
    pub day_type: DayType,
    pub template: Option<ScheduleTemplate>,
    pub blocks: Vec<BlockView>,
    pub bonus_tasks: Vec<Task>,
}

/// The legacy sectioned layout: the currently active section (if any) with
/// its tasks laid out sequentially.
#[derive(Debug, Clone)]
pub struct SectionTimeline {
    pub section: Option<DaySection>,
    pub tasks: Vec<Task>,
    pub slots: Vec<TimelineSlot>,
}

/// Inbound port for the read side: assemble a member's day.
///
/// Implementations are re-entrant and side-effect free given fresh store
/// reads; callers re-invoke on a timer (phase depends on the wall clock)
/// and on change events.
#[async_trait]
pub trait DayViewService: Send + Sync + 'static {
    /// The block-based day view. Past dates classify every block as
    /// `review`; future dates as `later`.
    async fn day_view(&self, member_id: MemberId, date: Date) -> Result<DayView, DomainError>;

    /// The legacy sequential layout for the family's currently active day
    /// section.
    async fn section_timeline(
        &self,
        member_id: MemberId,
        date: Date,
    ) -> Result<SectionTimeline, DomainError>;
}
