use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    actor::Actor,
    adapters::inbound::http::LedgerEntryResponse,
    app_state::AppState,
    domain::{models::MemberId, ports::outbound::LedgerStore},
    routes::ApiError,
};

const HISTORY_LIMIT: i64 = 50;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(star_history))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StarsQuery {
    member_id: i64,
}

#[instrument(name = "star_history", skip(app_state, _actor))]
async fn star_history(
    _actor: Actor,
    State(app_state): State<AppState>,
    Query(query): Query<StarsQuery>,
) -> Result<Json<Vec<LedgerEntryResponse>>, ApiError> {
    let entries = app_state
        .ledger_store
        .recent_for_member(MemberId::new(query.member_id), HISTORY_LIMIT)
        .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
