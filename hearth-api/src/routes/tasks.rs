use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    actor::Actor,
    adapters::inbound::http::{SpawnResponse, TaskResponse},
    app_state::AppState,
    domain::{
        change_feed::{ChangeEvent, ChangeResource},
        day_type::DayType,
        models::{BlockId, MemberId, PicklistOption, TaskId, TaskInput, TaskKind},
        ports::{
            inbound::TaskActions,
            outbound::{NewTask, TaskStore, UpdateTask},
        },
    },
    routes::{parse_date, ApiError},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/spawn", post(spawn_tasks))
        .route("/:id", axum::routing::patch(update_task).delete(delete_task))
        .route("/:id/done", post(mark_done))
        .route("/:id/undo", post(undo))
        .route("/:id/accept", post(accept))
        .route("/:id/unaccept", post(unaccept))
        .route("/:id/select", post(picklist_select))
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    member_id: Option<i64>,
    date: Option<String>,
}

#[instrument(name = "list_tasks", skip(app_state, actor))]
async fn list_tasks(
    actor: Actor,
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => app_state.clock.today(),
    };

    let tasks = match query.member_id {
        Some(member_id) => {
            app_state
                .task_store
                .for_member_date(MemberId::new(member_id), date)
                .await?
        }
        None => {
            app_state
                .task_store
                .for_family_date(actor.family_id, date)
                .await?
        }
    };

    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}

// ============================================================================
// Parent CRUD
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PicklistPayload {
    options: Vec<PicklistOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskPayload {
    member_id: i64,
    date: Option<String>,
    title: String,
    block_id: Option<i64>,
    day_section: Option<String>,
    #[serde(default)]
    duration_minutes: i32,
    #[serde(default)]
    star_value: i32,
    #[serde(default)]
    sort_order: i32,
    input_type: Option<TaskInput>,
    picklist: Option<PicklistPayload>,
}

#[instrument(name = "create_task", skip(app_state, actor, body))]
async fn create_task(
    actor: Actor,
    State(app_state): State<AppState>,
    Json(body): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    actor.require_parent()?;

    if body.title.trim().is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }

    let date = match body.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => app_state.clock.today(),
    };

    let kind = match body.picklist {
        Some(picklist) => TaskKind::Picklist {
            options: picklist.options,
            selected: None,
        },
        None => TaskKind::Simple,
    };

    let task = app_state
        .task_store
        .insert(&NewTask {
            family_id: actor.family_id,
            member_id: MemberId::new(body.member_id),
            date,
            title: body.title,
            block_id: body.block_id.map(BlockId::new),
            day_section: body.day_section,
            duration_minutes: body.duration_minutes,
            star_value: body.star_value,
            sort_order: body.sort_order,
            input_type: body.input_type.unwrap_or(TaskInput::Child),
            kind,
        })
        .await?;

    app_state
        .change_feed
        .publish(ChangeEvent::tasks(task.member_id));

    Ok((StatusCode::CREATED, Json(task.into())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskPayload {
    title: Option<String>,
    day_section: Option<String>,
    block_id: Option<i64>,
    /// Detach the task from its block, making it a bonus task.
    #[serde(default)]
    clear_block: bool,
    duration_minutes: Option<i32>,
    star_value: Option<i32>,
    sort_order: Option<i32>,
    input_type: Option<TaskInput>,
}

#[instrument(name = "update_task", skip(app_state, actor, body))]
async fn update_task(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskPayload>,
) -> Result<Json<TaskResponse>, ApiError> {
    actor.require_parent()?;

    let block_id = if body.clear_block {
        Some(None)
    } else {
        body.block_id.map(|id| Some(BlockId::new(id)))
    };

    let task = app_state
        .task_store
        .update(
            TaskId::new(id),
            &UpdateTask {
                title: body.title,
                day_section: body.day_section,
                block_id,
                duration_minutes: body.duration_minutes,
                star_value: body.star_value,
                sort_order: body.sort_order,
                input_type: body.input_type,
            },
        )
        .await?;

    app_state
        .change_feed
        .publish(ChangeEvent::tasks(task.member_id));

    Ok(Json(task.into()))
}

#[instrument(name = "delete_task", skip(app_state, actor))]
async fn delete_task(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    actor.require_parent()?;

    let task_id = TaskId::new(id);
    let member_id = app_state.task_store.get(task_id).await?.map(|t| t.member_id);
    app_state.task_store.delete(task_id).await?;

    if let Some(member_id) = member_id {
        app_state.change_feed.publish(ChangeEvent::tasks(member_id));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Lifecycle transitions
// ============================================================================

#[instrument(name = "mark_done", skip(app_state, actor))]
async fn mark_done(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = app_state
        .task_actions
        .mark_done(actor.member(), TaskId::new(id))
        .await?;
    Ok(Json(task.into()))
}

#[instrument(name = "undo", skip(app_state, actor))]
async fn undo(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = app_state
        .task_actions
        .undo(actor.member(), TaskId::new(id))
        .await?;
    Ok(Json(task.into()))
}

#[instrument(name = "accept", skip(app_state, actor))]
async fn accept(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = app_state
        .task_actions
        .accept(actor.member(), TaskId::new(id))
        .await?;
    Ok(Json(task.into()))
}

#[instrument(name = "unaccept", skip(app_state, actor))]
async fn unaccept(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = app_state
        .task_actions
        .unaccept(actor.member(), TaskId::new(id))
        .await?;
    Ok(Json(task.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectPayload {
    value: String,
}

#[instrument(name = "picklist_select", skip(app_state, actor, body))]
async fn picklist_select(
    actor: Actor,
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SelectPayload>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = app_state
        .task_actions
        .picklist_select(actor.member(), TaskId::new(id), &body.value)
        .await?;
    Ok(Json(task.into()))
}

// ============================================================================
// Materialization
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpawnPayload {
    date: Option<String>,
}

#[instrument(name = "spawn_tasks", skip(app_state, actor, body))]
async fn spawn_tasks(
    actor: Actor,
    State(app_state): State<AppState>,
    Json(body): Json<SpawnPayload>,
) -> Result<Json<SpawnResponse>, ApiError> {
    actor.require_parent()?;

    let date = match body.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => app_state.clock.today(),
    };

    let spawned = app_state
        .task_store
        .spawn_for_date(date, DayType::of(date))
        .await?;

    if spawned > 0 {
        app_state
            .change_feed
            .publish(ChangeEvent::family_wide(ChangeResource::Tasks));
    }

    Ok(Json(SpawnResponse {
        spawned,
        date: date.to_string(),
    }))
}
