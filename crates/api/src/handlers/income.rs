//! Handlers for financial incomes. Only a project's CEO may record or see
//! its incomes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::PgPool;
use taskfund_core::error::CoreError;
use taskfund_core::hierarchy::validate_title;
use taskfund_core::ledger::{income_amount_update, validate_income_amount};
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::DbId;
use taskfund_db::models::income::{CreateIncome, FinancialIncome, UpdateIncome};
use taskfund_db::repositories::IncomeRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::access::require_change;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn project(id: DbId) -> Target {
    Target::new(TargetKind::Project, id)
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "FinancialIncome",
        id,
    })
}

async fn income_for_ceo(pool: &PgPool, id: DbId, user_id: DbId) -> AppResult<FinancialIncome> {
    let income = IncomeRepo::find_by_id(pool, id)
        .await?
        .ok_or(not_found(id))?;
    require_change(pool, project(income.project_id), user_id).await?;
    Ok(income)
}

/// GET /api/v1/financials/projects/{project_id}/incomes
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FinancialIncome>>>> {
    require_change(&state.pool, project(project_id), auth.user_id).await?;
    let incomes = IncomeRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: incomes }))
}

/// POST /api/v1/financials/projects/{project_id}/incomes
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateIncome>,
) -> AppResult<(StatusCode, Json<DataResponse<FinancialIncome>>)> {
    require_change(&state.pool, project(project_id), auth.user_id).await?;
    validate_title(&input.title)?;
    validate_income_amount(input.amount)?;

    let income = IncomeRepo::create(&state.pool, auth.user_id, project_id, &input).await?;

    tracing::info!(user_id = auth.user_id, project_id, income_id = income.id, "Income recorded");
    Ok((StatusCode::CREATED, Json(DataResponse { data: income })))
}

/// GET /api/v1/financials/incomes/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FinancialIncome>>> {
    let income = income_for_ceo(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: income }))
}

/// PUT|PATCH /api/v1/financials/incomes/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIncome>,
) -> AppResult<Json<DataResponse<FinancialIncome>>> {
    let current = income_for_ceo(&state.pool, id, auth.user_id).await?;
    if let Some(ref title) = input.title {
        validate_title(title)?;
    }
    income_amount_update(current.amount, input.amount)?;

    let income = IncomeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;

    tracing::info!(user_id = auth.user_id, income_id = id, "Income updated");
    Ok(Json(DataResponse { data: income }))
}

/// DELETE /api/v1/financials/incomes/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    income_for_ceo(&state.pool, id, auth.user_id).await?;
    if IncomeRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, income_id = id, "Income deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
