use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    actor::Actor,
    adapters::inbound::http::MemberResponse,
    app_state::AppState,
    domain::{
        models::{FamilyId, Role},
        ports::outbound::MemberStore,
    },
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_members))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembersQuery {
    /// Defaults to the actor's own family.
    family_id: Option<i64>,
    role: Option<Role>,
}

#[instrument(name = "list_members", skip(app_state, actor))]
async fn list_members(
    actor: Actor,
    State(app_state): State<AppState>,
    Query(query): Query<MembersQuery>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let family_id = query
        .family_id
        .map(FamilyId::new)
        .unwrap_or(actor.family_id);

    let members = app_state
        .member_store
        .for_family(family_id, query.role)
        .await?;

    Ok(Json(members.into_iter().map(Into::into).collect()))
}
