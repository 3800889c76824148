use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::ops::Deref;

use crate::{
    app_state::AppState,
    domain::{
        models::{FamilyMember, MemberId},
        ports::outbound::MemberStore,
    },
    routes::ApiError,
};

/// The family member performing the request.
///
/// PIN login and session handling live in the fronting auth layer, which
/// injects the authenticated member's id as the `x-member-id` header. This
/// extractor resolves that id against the member store so every handler
/// gets a full [`FamilyMember`]. Role checks then happen server-side in
/// the engine, never in the client.
#[derive(Debug, Clone)]
pub struct Actor {
    member: FamilyMember,
}

impl Actor {
    pub fn member(&self) -> &FamilyMember {
        &self.member
    }

    pub fn require_parent(&self) -> Result<(), ApiError> {
        if self.member.is_parent() {
            Ok(())
        } else {
            Err(ApiError::forbidden("parent access required"))
        }
    }
}

impl Deref for Actor {
    type Target = FamilyMember;

    fn deref(&self) -> &Self::Target {
        &self.member
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id: i64 = parts
            .headers
            .get("x-member-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| ApiError::unauthorized("missing or invalid x-member-id header"))?;

        let member = state
            .member_store
            .get(MemberId::new(id))
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::unauthorized("unknown member"))?;

        Ok(Actor { member })
    }
}
