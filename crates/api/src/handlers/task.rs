//! Handlers for tasks, nested under projects for listing and creation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::PgPool;
use taskfund_core::budget::validate_amount;
use taskfund_core::error::CoreError;
use taskfund_core::hierarchy::validate_title;
use taskfund_core::schedule::{
    apply_change, validate_covers, validate_order, validate_within, DateRange,
};
use taskfund_core::status::WorkStatus;
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::DbId;
use taskfund_db::models::project::Project;
use taskfund_db::models::task::{CreateTask, Task, TaskDetail, UpdateTask};
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
    Target::new(TargetKind::Task, id)
}

async fn ensure_project_exists(pool: &PgPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

async fn ensure_task_exists(pool: &PgPool, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))
}

async fn detail(pool: &PgPool, task: Task) -> AppResult<TaskDetail> {
    let manager = match task.manager_id {
        Some(id) => UserRepo::find_by_id(pool, id).await?.map(Into::into),
        None => None,
    };
    let experts = ExpertRepo::list_users(pool, node(task.id))
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(TaskDetail {
        task,
        manager,
        experts,
    })
}

/// GET /api/v1/projects/{project_id}/tasks
///
/// The CEO and the project's experts see every task; anyone else only the
/// tasks they manage or serve on.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let project = node_access(
        &state.pool,
        Target::new(TargetKind::Project, project_id),
    )
    .await?;

    let tasks = if project.can_view(auth.user_id) {
        TaskRepo::list_by_project(&state.pool, project_id).await?
    } else {
        TaskRepo::list_by_project_for_member(&state.pool, project_id, auth.user_id).await?
    };
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/v1/projects/{project_id}/tasks
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskDetail>>)> {
    require_change(
        &state.pool,
        Target::new(TargetKind::Project, project_id),
        auth.user_id,
    )
    .await?;
    let project = ensure_project_exists(&state.pool, project_id).await?;

    validate_title(&input.title)?;
    validate_amount(input.budget)?;
    let dates = DateRange::new(input.start_date, input.end_date);
    validate_order(dates)?;
    validate_within(dates, project.dates(), "project")?;

    let manager_id = match input.manager.as_deref() {
        Some(email) => resolve_manager(&state.pool, email).await?,
        None => auth.user_id,
    };
    let experts = resolve_experts(&state.pool, &input.experts).await?;
    let expert_ids: Vec<DbId> = experts.iter().map(|u| u.id).collect();

    let task = TaskRepo::create(&state.pool, project_id, manager_id, &input, &expert_ids).await?;

    tracing::info!(user_id = auth.user_id, project_id, task_id = task.id, "Task created");
    let data = detail(&state.pool, task).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    require_view(&state.pool, node(id), auth.user_id).await?;
    let task = ensure_task_exists(&state.pool, id).await?;
    let data = detail(&state.pool, task).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT|PATCH /api/v1/tasks/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    let current = ensure_task_exists(&state.pool, id).await?;
    let project = ensure_project_exists(&state.pool, current.project_id).await?;

    if let Some(ref title) = input.title {
        validate_title(title)?;
    }
    validate_amount(input.budget)?;

    let dates = apply_change(
        current.dates(),
        DateRange::new(input.start_date, input.end_date),
    )?;
    if dates != current.dates() {
        validate_within(dates, project.dates(), "project")?;
        let subtasks = SubTaskRepo::date_envelope(&state.pool, id).await?;
        validate_covers(dates, subtasks, "subtask")?;
    }

    let manager_id = match input.manager.as_deref() {
        Some(email) => Some(resolve_manager(&state.pool, email).await?),
        None => None,
    };
    let new_experts = resolve_new_experts(&state.pool, node(id), &input.experts).await?;

    let task = TaskRepo::update(&state.pool, id, manager_id, &input, &new_experts)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    tracing::info!(user_id = auth.user_id, task_id = id, "Task updated");
    let data = detail(&state.pool, task).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    if TaskRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, task_id = id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Task", id }))
    }
}

/// POST /api/v1/tasks/{id}/complete
pub async fn complete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Task>>> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    let current = ensure_task_exists(&state.pool, id).await?;
    if current.status == WorkStatus::Completed {
        return Err(AppError::Core(CoreError::Conflict(
            "Task is already completed".into(),
        )));
    }

    let task = TaskRepo::complete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Task is already completed".into())))?;

    tracing::info!(user_id = auth.user_id, task_id = id, "Task completed");
    Ok(Json(DataResponse { data: task }))
}
