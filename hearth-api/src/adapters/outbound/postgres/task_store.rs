use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use time::{Date, OffsetDateTime};

use crate::domain::{
    day_type::DayType,
    models::{
        BlockId, FamilyId, MemberId, PicklistOption, PicklistState, Task, TaskId, TaskKind,
        TaskTemplateId,
    },
    ports::outbound::{NewTask, StoreError, TaskStore, UpdateTask},
};

use super::decode_err;

const TASK_COLUMNS: &str = "id, family_id, member_id, task_date, title, block_id, day_section, \
     duration_minutes, star_value, sort_order, input_type, status, completed_at, accepted_at, \
     picklist, template_id, created_at";

/// JSONB shape of the picklist column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct PicklistMeta {
    pub options: Vec<PicklistOption>,
    #[serde(default)]
    pub selected: Option<String>,
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    family_id: i64,
    member_id: i64,
    task_date: Date,
    title: String,
    block_id: Option<i64>,
    day_section: Option<String>,
    duration_minutes: i32,
    star_value: i32,
    sort_order: i32,
    input_type: String,
    status: String,
    completed_at: Option<OffsetDateTime>,
    accepted_at: Option<OffsetDateTime>,
    picklist: Option<Json<PicklistMeta>>,
    template_id: Option<i64>,
    created_at: OffsetDateTime,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let kind = match row.picklist {
            Some(Json(meta)) => TaskKind::Picklist {
                options: meta.options,
                selected: meta.selected,
            },
            None => TaskKind::Simple,
        };

        Ok(Task {
            id: TaskId::new(row.id),
            family_id: FamilyId::new(row.family_id),
            member_id: MemberId::new(row.member_id),
            date: row.task_date,
            title: row.title,
            block_id: row.block_id.map(BlockId::new),
            day_section: row.day_section,
            duration_minutes: row.duration_minutes,
            star_value: row.star_value,
            sort_order: row.sort_order,
            input_type: row.input_type.parse().map_err(decode_err)?,
            status: row.status.parse().map_err(decode_err)?,
            completed_at: row.completed_at,
            accepted_at: row.accepted_at,
            kind,
            template_id: row.template_id.map(TaskTemplateId::new),
            created_at: row.created_at,
        })
    }
}

fn picklist_column(kind: &TaskKind) -> Option<Json<PicklistMeta>> {
    match kind {
        TaskKind::Simple => None,
        TaskKind::Picklist { options, selected } => Some(Json(PicklistMeta {
            options: options.clone(),
            selected: selected.clone(),
        })),
    }
}

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguish "gone" from "wrong prior status" after a guarded update
    /// matched zero rows.
    async fn conflict_or_missing(&self, id: TaskId, want: &str) -> StoreError {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM tasks WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .ok()
                .flatten();
        match status {
            None => StoreError::NotFound(format!("task {id}")),
            Some(status) => StoreError::Conflict(format!(
                "task {id} is '{status}', expected '{want}'"
            )),
        }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }

    async fn for_member_date(
        &self,
        member_id: MemberId,
        date: Date,
    ) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE member_id = $1 AND task_date = $2 \
             ORDER BY day_section, sort_order, id"
        ))
        .bind(member_id.as_i64())
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn for_family_date(
        &self,
        family_id: FamilyId,
        date: Date,
    ) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE family_id = $1 AND task_date = $2 \
             ORDER BY member_id, day_section, sort_order, id"
        ))
        .bind(family_id.as_i64())
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn insert(&self, task: &NewTask) -> Result<Task, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "INSERT INTO tasks (family_id, member_id, task_date, title, block_id, day_section, \
                                duration_minutes, star_value, sort_order, input_type, picklist) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.family_id.as_i64())
        .bind(task.member_id.as_i64())
        .bind(task.date)
        .bind(&task.title)
        .bind(task.block_id.map(|id| id.as_i64()))
        .bind(&task.day_section)
        .bind(task.duration_minutes)
        .bind(task.star_value)
        .bind(task.sort_order)
        .bind(task.input_type.to_string())
        .bind(picklist_column(&task.kind))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, id: TaskId, update: &UpdateTask) -> Result<Task, StoreError> {
        let (set_block, block_id) = match update.block_id {
            Some(value) => (true, value.map(|id| id.as_i64())),
            None => (false, None),
        };

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "UPDATE tasks SET \
                 title = COALESCE($2, title), \
                 day_section = COALESCE($3, day_section), \
                 block_id = CASE WHEN $4 THEN $5 ELSE block_id END, \
                 duration_minutes = COALESCE($6, duration_minutes), \
                 star_value = COALESCE($7, star_value), \
                 sort_order = COALESCE($8, sort_order), \
                 input_type = COALESCE($9, input_type) \
             WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(&update.title)
        .bind(&update.day_section)
        .bind(set_block)
        .bind(block_id)
        .bind(update.duration_minutes)
        .bind(update.star_value)
        .bind(update.sort_order)
        .bind(update.input_type.map(|i| i.to_string()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("task {id}")))?;

        row.try_into()
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("task {id}")));
        }
        Ok(())
    }

    async fn mark_done(&self, id: TaskId, at: OffsetDateTime) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE tasks SET status = 'done', completed_at = $2 \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.as_i64())
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.conflict_or_missing(id, "pending").await);
        }
        Ok(())
    }

    async fn mark_undone(&self, id: TaskId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE tasks SET status = 'pending', completed_at = NULL \
             WHERE id = $1 AND status = 'done'",
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.conflict_or_missing(id, "done").await);
        }
        Ok(())
    }

    async fn apply_picklist(
        &self,
        id: TaskId,
        state: &PicklistState,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE tasks SET \
                 picklist = jsonb_set(picklist, '{selected}', \
                                      COALESCE(to_jsonb($2::text), 'null'::jsonb)), \
                 status = $3, star_value = $4, completed_at = $5 \
             WHERE id = $1 AND picklist IS NOT NULL AND status <> 'accepted'",
        )
        .bind(id.as_i64())
        .bind(&state.selected)
        .bind(state.status.to_string())
        .bind(state.star_value)
        .bind(state.completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.conflict_or_missing(id, "an unaccepted picklist").await);
        }
        Ok(())
    }

    async fn spawn_for_date(&self, date: Date, day_type: DayType) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO tasks (family_id, member_id, task_date, title, block_id, day_section, \
                                duration_minutes, star_value, sort_order, input_type, picklist, \
                                template_id) \
             SELECT t.family_id, t.member_id, $1, t.title, t.block_id, t.day_section, \
                    t.duration_minutes, t.star_value, t.sort_order, t.input_type, t.picklist, \
                    t.id \
             FROM task_templates t \
             WHERE t.repeat = 'daily' \
                OR (t.repeat = 'weekdays' AND $2 NOT IN ('saturday', 'sunday')) \
                OR (t.repeat = 'weekly' AND t.weekly_day = $2) \
             ON CONFLICT (template_id, member_id, task_date) DO NOTHING",
        )
        .bind(date)
        .bind(day_type.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
