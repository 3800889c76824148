//! HTTP response types.
//!
//! These serialize to the camelCase JSON shape the family dashboard and
//! timeline views consume. Times are rendered both as raw minute values
//! (for layout math) and preformatted display strings.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::{
    classifier::Phase,
    day_type::DayType,
    models::{
        DaySection, FamilyMember, LedgerEntryWithTask, PicklistOption, ScheduleBlock,
        ScheduleTemplate, Task, TaskKind,
    },
    ports::inbound::{BlockView, DayView, SectionTimeline},
    timeclock::{format_time_range, minutes_to_display},
    timeline::{SlotPhase, TimelineSlot},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PicklistResponse {
    pub options: Vec<PicklistOption>,
    pub selected: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub member_id: i64,
    pub date: String,
    pub title: String,
    pub block_id: Option<i64>,
    pub day_section: Option<String>,
    pub duration_minutes: i32,
    pub duration_display: String,
    pub star_value: i32,
    pub sort_order: i32,
    pub input_type: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub accepted_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picklist: Option<PicklistResponse>,
    pub bonus: bool,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        let bonus = task.is_bonus();
        let picklist = match task.kind {
            TaskKind::Simple => None,
            TaskKind::Picklist { options, selected } => {
                Some(PicklistResponse { options, selected })
            }
        };
        Self {
            id: task.id.as_i64(),
            member_id: task.member_id.as_i64(),
            date: task.date.to_string(),
            title: task.title,
            block_id: task.block_id.map(|id| id.as_i64()),
            day_section: task.day_section,
            duration_minutes: task.duration_minutes,
            duration_display: minutes_to_display(task.duration_minutes),
            star_value: task.star_value,
            sort_order: task.sort_order,
            input_type: task.input_type.to_string(),
            status: task.status.to_string(),
            completed_at: task.completed_at,
            accepted_at: task.accepted_at,
            picklist,
            bonus,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlockResponse {
    pub id: i64,
    pub template_id: i64,
    pub label: String,
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub block_type: String,
    pub start_minute: u16,
    pub end_minute: u16,
    pub time_range: String,
    pub sort_order: i32,
}

impl From<ScheduleBlock> for ScheduleBlockResponse {
    fn from(block: ScheduleBlock) -> Self {
        Self {
            id: block.id.as_i64(),
            template_id: block.template_id.as_i64(),
            label: block.label,
            emoji: block.emoji,
            description: block.description,
            block_type: block.block_type.to_string(),
            start_minute: block.start.get(),
            end_minute: block.end.get(),
            time_range: format_time_range(block.start, block.end),
            sort_order: block.sort_order,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockViewResponse {
    #[serde(flatten)]
    pub block: ScheduleBlockResponse,
    pub phase: Phase,
    pub remaining_minutes: Option<u16>,
    /// Preformatted countdown, empty when not the active block.
    pub remaining_display: String,
    pub tasks: Vec<TaskResponse>,
}

impl From<BlockView> for BlockViewResponse {
    fn from(view: BlockView) -> Self {
        let remaining_display = view
            .tag
            .remaining_minutes
            .map(|m| minutes_to_display(m as i32))
            .unwrap_or_default();
        Self {
            block: view.block.into(),
            phase: view.tag.phase,
            remaining_minutes: view.tag.remaining_minutes,
            remaining_display,
            tasks: view.tasks.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTemplateResponse {
    pub id: i64,
    pub family_id: i64,
    pub member_id: i64,
    pub name: String,
    pub day_types: Vec<DayType>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ScheduleTemplate> for ScheduleTemplateResponse {
    fn from(template: ScheduleTemplate) -> Self {
        Self {
            id: template.id.as_i64(),
            family_id: template.family_id.as_i64(),
            member_id: template.member_id.as_i64(),
            name: template.name,
            day_types: template.day_types,
            created_at: template.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayViewResponse {
    pub date: String,
    pub day_type: DayType,
    pub template: Option<ScheduleTemplateResponse>,
    pub blocks: Vec<BlockViewResponse>,
    pub bonus_tasks: Vec<TaskResponse>,
}

impl From<DayView> for DayViewResponse {
    fn from(view: DayView) -> Self {
        Self {
            date: view.date.to_string(),
            day_type: view.day_type,
            template: view.template.map(Into::into),
            blocks: view.blocks.into_iter().map(Into::into).collect(),
            bonus_tasks: view.bonus_tasks.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySectionResponse {
    pub label: String,
    pub start_minute: u16,
    pub end_minute: u16,
    pub time_range: String,
}

impl From<DaySection> for DaySectionResponse {
    fn from(section: DaySection) -> Self {
        Self {
            label: section.label.clone(),
            start_minute: section.start.get(),
            end_minute: section.end.get(),
            time_range: format_time_range(section.start, section.end),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItemResponse {
    #[serde(flatten)]
    pub task: TaskResponse,
    pub scheduled_start: i32,
    pub scheduled_end: i32,
    pub phase: SlotPhase,
    pub remaining_ms: Option<i64>,
}

impl TimelineItemResponse {
    pub fn new(task: Task, slot: TimelineSlot) -> Self {
        Self {
            task: task.into(),
            scheduled_start: slot.scheduled_start,
            scheduled_end: slot.scheduled_end,
            phase: slot.phase,
            remaining_ms: slot.remaining_ms,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTimelineResponse {
    pub section: Option<DaySectionResponse>,
    pub items: Vec<TimelineItemResponse>,
}

impl From<SectionTimeline> for SectionTimelineResponse {
    fn from(timeline: SectionTimeline) -> Self {
        let items = timeline
            .tasks
            .into_iter()
            .zip(timeline.slots)
            .map(|(task, slot)| TimelineItemResponse::new(task, slot))
            .collect();
        Self {
            section: timeline.section.map(Into::into),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: i64,
    pub family_id: i64,
    pub name: String,
    pub role: String,
    pub star_balance: i32,
}

impl From<FamilyMember> for MemberResponse {
    fn from(member: FamilyMember) -> Self {
        Self {
            id: member.id.as_i64(),
            family_id: member.family_id.as_i64(),
            name: member.name,
            role: member.role.to_string(),
            star_balance: member.star_balance,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub task_id: i64,
    pub task_title: String,
    pub stars: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub earned_at: OffsetDateTime,
}

impl From<LedgerEntryWithTask> for LedgerEntryResponse {
    fn from(entry: LedgerEntryWithTask) -> Self {
        Self {
            id: entry.entry.id.as_i64(),
            task_id: entry.entry.task_id.as_i64(),
            task_title: entry.task_title,
            stars: entry.entry.stars,
            earned_at: entry.entry.earned_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnResponse {
    pub spawned: u64,
    pub date: String,
}
