use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{
    day_type::DayType,
    models::{
        BlockId, DaySection, FamilyId, MemberId, ScheduleBlock, ScheduleTemplate, TemplateId,
    },
    ports::outbound::{NewScheduleBlock, ScheduleStore, StoreError},
    timeclock::MinuteOfDay,
};

use super::decode_err;

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: i64,
    family_id: i64,
    member_id: i64,
    name: String,
    day_types: Vec<String>,
    created_at: OffsetDateTime,
}

impl TryFrom<TemplateRow> for ScheduleTemplate {
    type Error = StoreError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        let day_types = row
            .day_types
            .iter()
            .map(|s| s.parse::<DayType>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_err)?;

        Ok(ScheduleTemplate {
            id: TemplateId::new(row.id),
            family_id: FamilyId::new(row.family_id),
            member_id: MemberId::new(row.member_id),
            name: row.name,
            day_types,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BlockRow {
    id: i64,
    template_id: i64,
    label: String,
    emoji: Option<String>,
    description: Option<String>,
    block_type: String,
    start_minute: i16,
    end_minute: i16,
    sort_order: i32,
}

impl TryFrom<BlockRow> for ScheduleBlock {
    type Error = StoreError;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        Ok(ScheduleBlock {
            id: BlockId::new(row.id),
            template_id: TemplateId::new(row.template_id),
            label: row.label,
            emoji: row.emoji,
            description: row.description,
            block_type: row.block_type.parse().map_err(decode_err)?,
            start: MinuteOfDay::new(row.start_minute as u16).map_err(decode_err)?,
            end: MinuteOfDay::new(row.end_minute as u16).map_err(decode_err)?,
            sort_order: row.sort_order,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SectionRow {
    family_id: i64,
    label: String,
    start_minute: i16,
    end_minute: i16,
}

impl TryFrom<SectionRow> for DaySection {
    type Error = StoreError;

    fn try_from(row: SectionRow) -> Result<Self, Self::Error> {
        Ok(DaySection {
            family_id: FamilyId::new(row.family_id),
            label: row.label,
            start: MinuteOfDay::new(row.start_minute as u16).map_err(decode_err)?,
            end: MinuteOfDay::new(row.end_minute as u16).map_err(decode_err)?,
        })
    }
}

pub struct PgScheduleStore {
    pool: PgPool,
}

impl PgScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn templates_for(
        &self,
        member_id: MemberId,
        day_type: DayType,
    ) -> Result<Vec<ScheduleTemplate>, StoreError> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, family_id, member_id, name, day_types, created_at \
             FROM schedule_templates \
             WHERE member_id = $1 AND $2 = ANY(day_types) \
             ORDER BY created_at DESC",
        )
        .bind(member_id.as_i64())
        .bind(day_type.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ScheduleTemplate::try_from).collect()
    }

    async fn templates_for_family(
        &self,
        family_id: FamilyId,
    ) -> Result<Vec<ScheduleTemplate>, StoreError> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, family_id, member_id, name, day_types, created_at \
             FROM schedule_templates \
             WHERE family_id = $1 \
             ORDER BY member_id, created_at DESC",
        )
        .bind(family_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ScheduleTemplate::try_from).collect()
    }

    async fn blocks(&self, template_id: TemplateId) -> Result<Vec<ScheduleBlock>, StoreError> {
        let rows = sqlx::query_as::<_, BlockRow>(
            "SELECT id, template_id, label, emoji, description, block_type, \
                    start_minute, end_minute, sort_order \
             FROM schedule_blocks \
             WHERE template_id = $1 \
             ORDER BY start_minute, sort_order",
        )
        .bind(template_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ScheduleBlock::try_from).collect()
    }

    async fn create_template(
        &self,
        family_id: FamilyId,
        member_id: MemberId,
        name: &str,
        day_types: &[DayType],
    ) -> Result<ScheduleTemplate, StoreError> {
        let day_types: Vec<String> = day_types.iter().map(|d| d.to_string()).collect();

        let row = sqlx::query_as::<_, TemplateRow>(
            "INSERT INTO schedule_templates (family_id, member_id, name, day_types) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, family_id, member_id, name, day_types, created_at",
        )
        .bind(family_id.as_i64())
        .bind(member_id.as_i64())
        .bind(name)
        .bind(&day_types)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete_template(&self, id: TemplateId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM schedule_templates WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("schedule template {id}")));
        }
        Ok(())
    }

    async fn create_block(
        &self,
        template_id: TemplateId,
        block: &NewScheduleBlock,
    ) -> Result<ScheduleBlock, StoreError> {
        let row = sqlx::query_as::<_, BlockRow>(
            "INSERT INTO schedule_blocks (template_id, label, emoji, description, block_type, \
                                          start_minute, end_minute, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, template_id, label, emoji, description, block_type, \
                       start_minute, end_minute, sort_order",
        )
        .bind(template_id.as_i64())
        .bind(&block.label)
        .bind(&block.emoji)
        .bind(&block.description)
        .bind(block.block_type.to_string())
        .bind(block.start.get() as i16)
        .bind(block.end.get() as i16)
        .bind(block.sort_order)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete_block(&self, id: BlockId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM schedule_blocks WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("schedule block {id}")));
        }
        Ok(())
    }

    async fn day_sections(&self, family_id: FamilyId) -> Result<Vec<DaySection>, StoreError> {
        let rows = sqlx::query_as::<_, SectionRow>(
            "SELECT family_id, label, start_minute, end_minute \
             FROM day_sections \
             WHERE family_id = $1 \
             ORDER BY start_minute",
        )
        .bind(family_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DaySection::try_from).collect()
    }
}
