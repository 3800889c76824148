use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{
    models::{LedgerEntryId, LedgerEntryWithTask, MemberId, StarLedgerEntry, TaskId},
    ports::outbound::{LedgerStore, StoreError},
};

#[derive(sqlx::FromRow)]
struct LedgerRow {
    id: i64,
    member_id: i64,
    task_id: i64,
    stars: i32,
    earned_at: OffsetDateTime,
    task_title: String,
}

impl From<LedgerRow> for LedgerEntryWithTask {
    fn from(row: LedgerRow) -> Self {
        Self {
            entry: StarLedgerEntry {
                id: LedgerEntryId::new(row.id),
                member_id: MemberId::new(row.member_id),
                task_id: TaskId::new(row.task_id),
                stars: row.stars,
                earned_at: row.earned_at,
            },
            task_title: row.task_title,
        }
    }
}

pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn recent_for_member(
        &self,
        member_id: MemberId,
        limit: i64,
    ) -> Result<Vec<LedgerEntryWithTask>, StoreError> {
        let rows = sqlx::query_as::<_, LedgerRow>(
            "SELECT l.id, l.member_id, l.task_id, l.stars, l.earned_at, t.title AS task_title \
             FROM star_ledger l \
             JOIN tasks t ON t.id = l.task_id \
             WHERE l.member_id = $1 \
             ORDER BY l.earned_at DESC \
             LIMIT $2",
        )
        .bind(member_id.as_i64())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn grant(
        &self,
        task_id: TaskId,
        member_id: MemberId,
        stars: i32,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Status flip doubles as the idempotence guard: a concurrent or
        // retried grant matches zero rows and the transaction rolls back.
        let updated = sqlx::query(
            "UPDATE tasks SET status = 'accepted', accepted_at = now() \
             WHERE id = $1 AND status = 'done'",
        )
        .bind(task_id.as_i64())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(StoreError::Conflict(format!(
                "task {task_id} is not awaiting acceptance"
            )));
        }

        sqlx::query("INSERT INTO star_ledger (member_id, task_id, stars) VALUES ($1, $2, $3)")
            .bind(member_id.as_i64())
            .bind(task_id.as_i64())
            .bind(stars)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE family_members SET star_balance = star_balance + $2 WHERE id = $1")
            .bind(member_id.as_i64())
            .bind(stars)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn revoke(&self, task_id: TaskId, member_id: MemberId) -> Result<i32, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE tasks SET status = 'done', accepted_at = NULL \
             WHERE id = $1 AND status = 'accepted'",
        )
        .bind(task_id.as_i64())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(StoreError::Conflict(format!(
                "task {task_id} is not accepted"
            )));
        }

        // Decrement by what the entry actually granted, not the task's
        // current star_value; the two can differ after a regrade.
        let stars: Option<i32> = sqlx::query_scalar(
            "DELETE FROM star_ledger WHERE member_id = $1 AND task_id = $2 RETURNING stars",
        )
        .bind(member_id.as_i64())
        .bind(task_id.as_i64())
        .fetch_optional(&mut *tx)
        .await?;

        let stars = stars.ok_or_else(|| {
            StoreError::Conflict(format!("no ledger entry for task {task_id}"))
        })?;

        sqlx::query("UPDATE family_members SET star_balance = star_balance - $2 WHERE id = $1")
            .bind(member_id.as_i64())
            .bind(stars)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(stars)
    }
}
