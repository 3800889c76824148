use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    actor::Actor,
    adapters::inbound::http::{ScheduleBlockResponse, ScheduleTemplateResponse},
    app_state::AppState,
    domain::{
        change_feed::{ChangeEvent, ChangeResource},
        day_type::DayType,
        models::{BlockId, BlockType, MemberId, TemplateId},
        ports::outbound::{NewScheduleBlock, ScheduleStore},
        timeclock::MinuteOfDay,
    },
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route("/:id", delete(delete_template))
        .route("/:id/blocks", get(list_blocks).post(create_block))
        .route("/blocks/:id", delete(delete_block))
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplatesQuery {
    member_id: Option<i64>,
    day_type: Option<DayType>,
}

#[instrument(name = "list_templates", skip(app_state, actor))]
async fn list_templates(
    actor: Actor,
    State(app_state): State<AppState>,
    Query(query): Query<TemplatesQuery>,
) -> Result<Json<Vec<ScheduleTemplateResponse>>, ApiError> {
    let templates = match (query.member_id, query.day_type) {
        (Some(member_id), Some(day_type)) => {
            app_state
                .schedule_store
                .templates_for(MemberId::new(member_id), day_type)
                .await?
        }
        _ => {
            app_state
                .schedule_store
                .templates_for_family(actor.family_id)
                .await?
        }
    };

    Ok(Json(templates.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTemplatePayload {
    member_id: i64,
    name: String,
    day_types: Vec<DayType>,
}

#[instrument(name = "create_template", skip(app_state, actor, body))]
async fn create_template(
    actor: Actor,
    State(app_state): State<AppState>,
    Json(body): Json<CreateTemplatePayload>,
) -> Result<(StatusCode, Json<ScheduleTemplateResponse>), ApiError> {
    actor.require_parent()?;

    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    if body.day_types.is_empty() {
        return Err(ApiError::bad_request("day_types must not be empty"));
    }

    let template = app_state
        .schedule_store
        .create_template(
            actor.family_id,
            MemberId::new(body.member_id),
            &body.name,
            &body.day_types,
        )
        .await?;

    app_state
        .change_feed
        .publish(ChangeEvent::family_wide(ChangeResource::Schedule));

    Ok((StatusCode::CREATED, Json(template.into())))
}

#[instrument(name = "delete_template", skip(app_state, actor))]
async fn delete_template(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    actor.require_parent()?;

    app_state
        .schedule_store
        .delete_template(TemplateId::new(id))
        .await?;

    app_state
        .change_feed
        .publish(ChangeEvent::family_wide(ChangeResource::Schedule));

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Blocks
// ============================================================================

#[instrument(name = "list_blocks", skip(app_state, _actor))]
async fn list_blocks(
    _actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ScheduleBlockResponse>>, ApiError> {
    let blocks = app_state
        .schedule_store
        .blocks(TemplateId::new(id))
        .await?;

    Ok(Json(blocks.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBlockPayload {
    label: String,
    emoji: Option<String>,
    description: Option<String>,
    block_type: BlockType,
    /// Wall-clock times as "HH:MM".
    start: String,
    end: String,
    #[serde(default)]
    sort_order: i32,
}

#[instrument(name = "create_block", skip(app_state, actor, body))]
async fn create_block(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CreateBlockPayload>,
) -> Result<(StatusCode, Json<ScheduleBlockResponse>), ApiError> {
    actor.require_parent()?;

    let start = MinuteOfDay::parse(&body.start)?;
    let end = MinuteOfDay::parse(&body.end)?;
    if end <= start {
        return Err(ApiError::bad_request("block must end after it starts"));
    }

    let block = app_state
        .schedule_store
        .create_block(
            TemplateId::new(id),
            &NewScheduleBlock {
                label: body.label,
                emoji: body.emoji,
                description: body.description,
                block_type: body.block_type,
                start,
                end,
                sort_order: body.sort_order,
            },
        )
        .await?;

    app_state
        .change_feed
        .publish(ChangeEvent::family_wide(ChangeResource::Schedule));

    Ok((StatusCode::CREATED, Json(block.into())))
}

#[instrument(name = "delete_block", skip(app_state, actor))]
async fn delete_block(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    actor.require_parent()?;

    app_state
        .schedule_store
        .delete_block(BlockId::new(id))
        .await?;

    app_state
        .change_feed
        .publish(ChangeEvent::family_wide(ChangeResource::Schedule));

    Ok(StatusCode::NO_CONTENT)
}
