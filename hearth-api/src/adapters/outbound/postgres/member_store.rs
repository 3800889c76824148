use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{
    models::{FamilyId, FamilyMember, MemberId, Role},
    ports::outbound::{MemberStore, StoreError},
};

use super::decode_err;

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: i64,
    family_id: i64,
    name: String,
    role: String,
    star_balance: i32,
    created_at: OffsetDateTime,
}

impl TryFrom<MemberRow> for FamilyMember {
    type Error = StoreError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(FamilyMember {
            id: MemberId::new(row.id),
            family_id: FamilyId::new(row.family_id),
            name: row.name,
            role: row.role.parse().map_err(decode_err)?,
            star_balance: row.star_balance,
            created_at: row.created_at,
        })
    }
}

pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn get(&self, id: MemberId) -> Result<Option<FamilyMember>, StoreError> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT id, family_id, name, role, star_balance, created_at \
             FROM family_members WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(FamilyMember::try_from).transpose()
    }

    async fn for_family(
        &self,
        family_id: FamilyId,
        role: Option<Role>,
    ) -> Result<Vec<FamilyMember>, StoreError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT id, family_id, name, role, star_balance, created_at \
             FROM family_members \
             WHERE family_id = $1 AND ($2::text IS NULL OR role = $2) \
             ORDER BY name",
        )
        .bind(family_id.as_i64())
        .bind(role.map(|r| r.to_string()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FamilyMember::try_from).collect()
    }
}
