//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::PgPool;
use taskfund_core::budget::validate_amount;
use taskfund_core::error::CoreError;
use taskfund_core::hierarchy::validate_title;
use taskfund_core::schedule::{apply_change, validate_covers, validate_order, DateRange};
use taskfund_core::status::WorkStatus;
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::DbId;
use taskfund_db::models::project::{CreateProject, Project, ProjectDetail, UpdateProject};
use taskfund_db::repositories::{ExpertRepo, ProjectRepo, TaskRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::access::{require_change, require_view, resolve_experts, resolve_new_experts};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn node(id: DbId) -> Target {
    Target::new(TargetKind::Project, id)
}

async fn ensure_project_exists(pool: &PgPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

async fn detail(pool: &PgPool, project: Project) -> AppResult<ProjectDetail> {
    let ceo = UserRepo::find_by_id(pool, project.ceo_id).await?.map(Into::into);
    let experts = ExpertRepo::list_users(pool, node(project.id))
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ProjectDetail {
        project,
        ceo,
        experts,
    })
}

/// POST /api/v1/projects
///
/// The caller becomes the project's CEO.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectDetail>>)> {
    validate_title(&input.title)?;
    validate_amount(input.budget)?;
    validate_order(DateRange::new(input.start_date, input.end_date))?;
    let experts = resolve_experts(&state.pool, &input.experts).await?;
    let expert_ids: Vec<DbId> = experts.iter().map(|u| u.id).collect();

    let project = ProjectRepo::create(&state.pool, auth.user_id, &input, &expert_ids).await?;

    tracing::info!(user_id = auth.user_id, project_id = project.id, "Project created");
    let data = detail(&state.pool, project).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/projects
///
/// Projects where the caller is CEO or an expert.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let (limit, offset) = params.resolve();
    let projects = ProjectRepo::list_for_user(&state.pool, auth.user_id, limit, offset).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    require_view(&state.pool, node(id), auth.user_id).await?;
    let project = ensure_project_exists(&state.pool, id).await?;
    let data = detail(&state.pool, project).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT|PATCH /api/v1/projects/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    let current = ensure_project_exists(&state.pool, id).await?;

    if let Some(ref title) = input.title {
        validate_title(title)?;
    }
    validate_amount(input.budget)?;

    let dates = apply_change(
        current.dates(),
        DateRange::new(input.start_date, input.end_date),
    )?;
    if dates != current.dates() {
        let tasks = TaskRepo::date_envelope(&state.pool, id).await?;
        validate_covers(dates, tasks, "task")?;
    }
    let new_experts = resolve_new_experts(&state.pool, node(id), &input.experts).await?;

    let project = ProjectRepo::update(&state.pool, id, &input, &new_experts)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(user_id = auth.user_id, project_id = id, "Project updated");
    let data = detail(&state.pool, project).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/projects/{id}
///
/// Removes the project's tasks, subtasks, and every outcome charged to them.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    if ProjectRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, project_id = id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}

/// POST /api/v1/projects/{id}/complete
pub async fn complete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    require_change(&state.pool, node(id), auth.user_id).await?;
    let current = ensure_project_exists(&state.pool, id).await?;
    if current.status == WorkStatus::Completed {
        return Err(AppError::Core(CoreError::Conflict(
            "Project is already completed".into(),
        )));
    }

    let project = ProjectRepo::complete(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Conflict("Project is already completed".into()))
    })?;

    tracing::info!(user_id = auth.user_id, project_id = id, "Project completed");
    Ok(Json(DataResponse { data: project }))
}
