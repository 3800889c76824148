use async_trait::async_trait;

use crate::domain::{
    day_type::DayType,
    models::{
        BlockId, BlockType, DaySection, FamilyId, MemberId, ScheduleBlock, ScheduleTemplate,
        TemplateId,
    },
    timeclock::MinuteOfDay,
};

use super::StoreError;

/// Fields for creating or replacing a schedule block.
#[derive(Debug, Clone)]
pub struct NewScheduleBlock {
    pub label: String,
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub block_type: BlockType,
    pub start: MinuteOfDay,
    pub end: MinuteOfDay,
    pub sort_order: i32,
}

/// Outbound port for schedule templates, their blocks, and the legacy day
/// sections.
#[async_trait]
pub trait ScheduleStore: Send + Sync + 'static {
    /// Templates for a member that declare `day_type` in their day-type
    /// set, newest first (the tiebreak when several match).
    async fn templates_for(
        &self,
        member_id: MemberId,
        day_type: DayType,
    ) -> Result<Vec<ScheduleTemplate>, StoreError>;

    async fn templates_for_family(
        &self,
        family_id: FamilyId,
    ) -> Result<Vec<ScheduleTemplate>, StoreError>;

    /// Blocks of a template ordered by (start, sort_order).
    async fn blocks(&self, template_id: TemplateId) -> Result<Vec<ScheduleBlock>, StoreError>;

    async fn create_template(
        &self,
        family_id: FamilyId,
        member_id: MemberId,
        name: &str,
        day_types: &[DayType],
    ) -> Result<ScheduleTemplate, StoreError>;

    async fn delete_template(&self, id: TemplateId) -> Result<(), StoreError>;

    async fn create_block(
        &self,
        template_id: TemplateId,
        block: &NewScheduleBlock,
    ) -> Result<ScheduleBlock, StoreError>;

    async fn delete_block(&self, id: BlockId) -> Result<(), StoreError>;

    /// The legacy sections of a family's day, ordered by start time.
    async fn day_sections(&self, family_id: FamilyId) -> Result<Vec<DaySection>, StoreError>;
}
