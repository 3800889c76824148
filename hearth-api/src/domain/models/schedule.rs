use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::domain::{
    classifier::TimeWindow,
    day_type::DayType,
    timeclock::MinuteOfDay,
};

use super::{BlockId, FamilyId, MemberId, TemplateId};

/// A named recurring weekly schedule for one member, applied on the
/// weekdays listed in `day_types`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTemplate {
    pub id: TemplateId,
    pub family_id: FamilyId,
    pub member_id: MemberId,
    pub name: String,
    pub day_types: Vec<DayType>,
    pub created_at: OffsetDateTime,
}

impl ScheduleTemplate {
    pub fn applies_on(&self, day_type: DayType) -> bool {
        self.day_types.contains(&day_type)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Routine,
    Activity,
    FreeTime,
    Passive,
}

/// A fixed time-range segment of a daily schedule (e.g. "Breakfast",
/// 07:00–07:30). Within one template, blocks are non-overlapping and
/// ordered by start time with `sort_order` as tiebreak; the store query
/// applies that ordering and the classifier trusts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleBlock {
    pub id: BlockId,
    pub template_id: TemplateId,
    pub label: String,
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub block_type: BlockType,
    pub start: MinuteOfDay,
    pub end: MinuteOfDay,
    pub sort_order: i32,
}

impl TimeWindow for ScheduleBlock {
    fn window_start(&self) -> MinuteOfDay {
        self.start
    }

    fn window_end(&self) -> MinuteOfDay {
        self.end
    }
}

/// A coarse section of the day used by the legacy sequential timeline view
/// ("morning", "afternoon", "evening").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySection {
    pub family_id: FamilyId,
    pub label: String,
    pub start: MinuteOfDay,
    pub end: MinuteOfDay,
}

impl DaySection {
    pub fn contains(&self, at: MinuteOfDay) -> bool {
        at >= self.start && at < self.end
    }
}

/// The first section whose window contains `now`, if any.
pub fn current_section(sections: &[DaySection], now: MinuteOfDay) -> Option<&DaySection> {
    sections.iter().find(|s| s.contains(now))
}
