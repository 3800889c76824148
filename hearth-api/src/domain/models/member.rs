use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::{FamilyId, MemberId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Child,
}

/// A member of a family: a parent who assigns and reviews, or a child who
/// works through the day's blocks and tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyMember {
    pub id: MemberId,
    pub family_id: FamilyId,
    pub name: String,
    pub role: Role,
    /// Denormalized counter; only ever mutated inside the ledger
    /// transactions so it stays equal to the signed sum of applied grants.
    pub star_balance: i32,
    pub created_at: OffsetDateTime,
}

impl FamilyMember {
    pub fn is_parent(&self) -> bool {
        self.role == Role::Parent
    }

    pub fn is_child(&self) -> bool {
        self.role == Role::Child
    }
}
