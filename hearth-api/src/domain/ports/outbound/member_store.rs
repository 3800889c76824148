use async_trait::async_trait;

use crate::domain::models::{FamilyId, FamilyMember, MemberId, Role};

use super::StoreError;

/// Outbound port for family member lookups.
#[async_trait]
pub trait MemberStore: Send + Sync + 'static {
    async fn get(&self, id: MemberId) -> Result<Option<FamilyMember>, StoreError>;

    /// Members of a family ordered by name, optionally filtered by role.
    async fn for_family(
        &self,
        family_id: FamilyId,
        role: Option<Role>,
    ) -> Result<Vec<FamilyMember>, StoreError>;
}
