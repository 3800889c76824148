//! Day assembly: resolve the date's template, classify its blocks, and
//! group the date's tasks under them.

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use time::Date;

use crate::domain::{
    classifier::{classify, classify_review, classify_upcoming},
    day_type::DayType,
    error::DomainError,
    models::{current_section, MemberId, Task},
    ports::{
        inbound::{BlockView, DayView, DayViewService, SectionTimeline},
        outbound::{MemberStore, ScheduleStore, TaskStore},
    },
    timeclock::Clock,
    timeline::lay_out,
};

pub struct DayAssembler<S, T, M, C> {
    schedules: Arc<S>,
    tasks: Arc<T>,
    members: Arc<M>,
    clock: C,
}

impl<S, T, M, C> DayAssembler<S, T, M, C> {
    pub fn new(schedules: Arc<S>, tasks: Arc<T>, members: Arc<M>, clock: C) -> Self {
        Self {
            schedules,
            tasks,
            members,
            clock,
        }
    }
}

#[async_trait]
impl<S, T, M, C> DayViewService for DayAssembler<S, T, M, C>
where
    S: ScheduleStore,
    T: TaskStore,
    M: MemberStore,
    C: Clock,
{
    async fn day_view(&self, member_id: MemberId, date: Date) -> Result<DayView, DomainError> {
        let member = self
            .members
            .get(member_id)
            .await?
            .ok_or(DomainError::MemberNotFound(member_id))?;

        let day_type = DayType::of(date);
        let mut templates = self.schedules.templates_for(member_id, day_type).await?;
        if templates.len() > 1 {
            // Most recently created wins; anything else is a configuration
            // smell worth surfacing.
            tracing::warn!(
                "{} templates match member {} on {}; using '{}'",
                templates.len(),
                member.name,
                day_type,
                templates[0].name
            );
        }
        let template = if templates.is_empty() {
            None
        } else {
            Some(templates.remove(0))
        };

        let blocks = match &template {
            Some(t) => self.schedules.blocks(t.id).await?,
            None => Vec::new(),
        };

        let tasks = self.tasks.for_member_date(member_id, date).await?;

        let today = self.clock.today();
        let tags = if date < today {
            classify_review(&blocks)
        } else if date > today {
            classify_upcoming(&blocks)
        } else {
            classify(&blocks, self.clock.minute_of_day())
        };

        let (attached, bonus_tasks): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(|t| t.block_id.is_some());
        let mut by_block = attached
            .into_iter()
            .filter_map(|t| t.block_id.map(|block_id| (block_id, t)))
            .into_group_map();

        let blocks = blocks
            .into_iter()
            .zip(tags)
            .map(|(block, tag)| {
                let tasks = by_block.remove(&block.id).unwrap_or_default();
                BlockView { block, tag, tasks }
            })
            .collect();

        Ok(DayView {
            date,
            day_type,
            template,
            blocks,
            bonus_tasks,
        })
    }

    async fn section_timeline(
        &self,
        member_id: MemberId,
        date: Date,
    ) -> Result<SectionTimeline, DomainError> {
        let member = self
            .members
            .get(member_id)
            .await?
            .ok_or(DomainError::MemberNotFound(member_id))?;

        let sections = self.schedules.day_sections(member.family_id).await?;
        let now = self.clock.minute_of_day();

        let Some(section) = current_section(&sections, now).cloned() else {
            return Ok(SectionTimeline {
                section: None,
                tasks: Vec::new(),
                slots: Vec::new(),
            });
        };

        let tasks: Vec<Task> = self
            .tasks
            .for_member_date(member_id, date)
            .await?
            .into_iter()
            .filter(|t| t.day_section.as_deref() == Some(section.label.as_str()))
            .collect();

        let slots = lay_out(&tasks, section.start, now);

        Ok(SectionTimeline {
            section: Some(section),
            tasks,
            slots,
        })
    }
}
