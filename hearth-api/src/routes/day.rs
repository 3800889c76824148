use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    actor::Actor,
    adapters::inbound::http::{DayViewResponse, SectionTimelineResponse},
    app_state::AppState,
    domain::{models::MemberId, ports::inbound::DayViewService},
    routes::{parse_date, ApiError},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(day_view))
        .route("/section", get(section_timeline))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayQuery {
    member_id: i64,
    /// Defaults to today in the family's timezone.
    date: Option<String>,
}

impl DayQuery {
    fn resolve_date(&self, app_state: &AppState) -> Result<time::Date, ApiError> {
        match self.date.as_deref() {
            Some(raw) => parse_date(raw),
            None => Ok(app_state.clock.today()),
        }
    }
}

#[instrument(name = "day_view", skip(app_state, _actor))]
async fn day_view(
    _actor: Actor,
    State(app_state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayViewResponse>, ApiError> {
    let date = query.resolve_date(&app_state)?;
    let view = app_state
        .day_views
        .day_view(MemberId::new(query.member_id), date)
        .await?;

    Ok(Json(view.into()))
}

#[instrument(name = "section_timeline", skip(app_state, _actor))]
async fn section_timeline(
    _actor: Actor,
    State(app_state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<SectionTimelineResponse>, ApiError> {
    let date = query.resolve_date(&app_state)?;
    let timeline = app_state
        .day_views
        .section_timeline(MemberId::new(query.member_id), date)
        .await?;

    Ok(Json(timeline.into()))
}
