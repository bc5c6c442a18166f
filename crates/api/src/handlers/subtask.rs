//! Handlers for subtasks, nested under tasks for listing and creation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::PgPool;
use taskfund_core::budget::validate_amount;
use taskfund_core::error::CoreError;
use taskfund_core::hierarchy::validate_title;
use taskfund_core::schedule::{apply_change, validate_order, validate_within, DateRange};
use taskfund_core::status::WorkStatus;
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::DbId;
use taskfund_db::models::subtask::{CreateSubTask, SubTask, SubTaskDetail, UpdateSubTask};
use taskfund_db::models::task::Task;
use taskfund_db::repositories::{ExpertRepo, ProjectRepo, SubTaskRepo, TaskRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::access::{
    node_access, require_change, require_view, resolve_experts, resolve_manager,
    resolve_new_experts,
};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn node(id: DbId) -> Target {
    Target::new(TargetKind::SubTask, id)
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "SubTask",
        id,
    })
}

async fn ensure_task_exists(pool: &PgPool, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))
}

async fn ensure_subtask_exists(pool: &PgPool, id: DbId) -> AppResult<SubTask> {
    SubTaskRepo::find_by_id(pool, id).await?.ok_or(not_found(id))
}

/// Check a subtask's dates against its task and, for any bound the task
/// leaves open, against the project.
async fn validate_within_ancestors(pool: &PgPool, dates: DateRange, task: &Task) -> AppResult<()> {
    validate_within(dates, task.dates(), "task")?;
    if task.start_date.is_none() || task.end_date.is_none() {
        let project = ProjectRepo::find_by_id(pool, task.project_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: task.project_id,
            }))?;
        validate_within(dates, project.dates(), "project")?;
    }
    Ok(())
}

async fn detail(pool: &PgPool, subtask: SubTask) -> AppResult<SubTaskDetail> {
    let manager = match subtask.manager_id {
        Some(id) => UserRepo::find_by_id(pool, id).await?.map(Into::into),
        None => None,
    };
    let experts = ExpertRepo::list_users(pool, node(subtask.id))
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(SubTaskDetail {
        subtask,
        manager,
        experts,
    })
}

/// GET /api/v1/tasks/{task_id}/subtasks
///
/// Whoever may view the task sees every subtask; anyone else only the
/// subtasks they manage or serve on.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SubTask>>>> {
    let task = node_access(&state.pool, Target::new(TargetKind::Task, task_id)).await?;

    let subtasks = if task.can_view(auth.user_id) {
        SubTaskRepo::list_by_task(&state.pool, task_id).await?
    } else {
        SubTaskRepo::list_by_task_for_member(&state.pool, task_id, auth.user_id).await?
    };
    Ok(Json(DataResponse { data: subtasks }))
}

/// POST /api/v1/tasks/{task_id}/subtasks
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<DbId>,
    Json(input): Json<CreateSubTask>,
) -> AppResult<(StatusCode, Json<DataResponse<SubTaskDetail>>)> {
    require_change(
        &state.pool,
        Target::new(TargetKind::Task, task_id),
        auth.user_id,
    )
    .await?;
    let task = ensure_task_exists(&state.pool, task_id).await?;

    validate_title(&input.title)?;
    validate_amount(input.budget)?;
    let dates = DateRange::new(input.start_date, input.end_date);
    validate_order(dates)?;
    validate_within_ancestors(&state.pool, dates, &task).await?;

    let manager_id = match input.manager.as_deref() {
        Some(email) => resolve_manager(&state.pool, email).await?,
        None => auth.user_id,
    };
    let experts = resolve_experts(&state.pool, &input.experts).await?;
    let expert_ids: Vec<DbId> = experts.iter().map(|u| u.id).collect();

    let subtask =
        SubTaskRepo::create(&state.pool, task_id, manager_id, &input, &expert_ids).await?;

    tracing::info!(
        user_id = auth.user_id,
        task_id,
        subtask_id = subtask.id,
        "SubTask created"
    );
    let data = detail(&state.pool, subtask).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/subtasks/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SubTaskDetail>>> {
    require_view(&state.pool, node(id), auth.user_id).await?;
    let subtask = ensure_subtask_exists(&state.pool, id).await?;
    let data = detail(&state.pool, subtask).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT|PATCH /api/v1/subtasks/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubTask>,
) -> AppResult<Json<DataResponse<SubTaskDetail>>> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    let current = ensure_subtask_exists(&state.pool, id).await?;
    let task = ensure_task_exists(&state.pool, current.task_id).await?;

    if let Some(ref title) = input.title {
        validate_title(title)?;
    }
    validate_amount(input.budget)?;

    let dates = apply_change(
        current.dates(),
        DateRange::new(input.start_date, input.end_date),
    )?;
    if dates != current.dates() {
        validate_within_ancestors(&state.pool, dates, &task).await?;
    }

    let manager_id = match input.manager.as_deref() {
        Some(email) => Some(resolve_manager(&state.pool, email).await?),
        None => None,
    };
    let new_experts = resolve_new_experts(&state.pool, node(id), &input.experts).await?;

    let subtask = SubTaskRepo::update(&state.pool, id, manager_id, &input, &new_experts)
        .await?
        .ok_or(not_found(id))?;

    tracing::info!(user_id = auth.user_id, subtask_id = id, "SubTask updated");
    let data = detail(&state.pool, subtask).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/subtasks/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    if SubTaskRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, subtask_id = id, "SubTask deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/subtasks/{id}/complete
pub async fn complete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SubTask>>> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    let current = ensure_subtask_exists(&state.pool, id).await?;
    if current.status == WorkStatus::Completed {
        return Err(AppError::Core(CoreError::Conflict(
            "SubTask is already completed".into(),
        )));
    }

    let subtask = SubTaskRepo::complete(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict("SubTask is already completed".into()))
    })?;

    tracing::info!(user_id = auth.user_id, subtask_id = id, "SubTask completed");
    Ok(Json(DataResponse { data: subtask }))
}
