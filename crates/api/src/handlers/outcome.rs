//! Handlers for financial outcomes and the payment-method row behind each.
//!
//! Every operation requires change rights on the node the outcome is
//! charged to.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use taskfund_core::error::CoreError;
use taskfund_core::hierarchy::validate_title;
use taskfund_core::ledger::{reject_method_change, validate_price};
use taskfund_core::payment::{cash_update, check_update, installment_update};
use taskfund_core::status::PaymentMethod;
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::{today, DbId};
use taskfund_db::models::outcome::{CreateOutcome, FinancialOutcome, UpdateOutcome};
use taskfund_db::models::payment::{
    PaymentDetail, UpdateCashPayment, UpdateCheckPayment, UpdateInstallmentPayment,
};
use taskfund_db::repositories::{OutcomeRepo, PaymentRepo, ScheduleRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::access::require_change;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "FinancialOutcome",
        id,
    })
}

fn payment_missing(outcome_id: DbId) -> AppError {
    AppError::InternalError(format!("outcome {outcome_id} has no payment-method row"))
}

/// Load an outcome the user may change.
pub(crate) async fn outcome_for_change(
    pool: &PgPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<FinancialOutcome> {
    let outcome = OutcomeRepo::find_by_id(pool, id)
        .await?
        .ok_or(not_found(id))?;
    require_change(pool, outcome.target(), user_id).await?;
    Ok(outcome)
}

/// The payment-method row matching the outcome's method.
async fn payment_detail(pool: &PgPool, outcome: &FinancialOutcome) -> AppResult<PaymentDetail> {
    let detail = match outcome.payment_method {
        PaymentMethod::Cash => PaymentRepo::find_cash_by_outcome(pool, outcome.id)
            .await?
            .map(PaymentDetail::Cash),
        PaymentMethod::Check => PaymentRepo::find_check_by_outcome(pool, outcome.id)
            .await?
            .map(PaymentDetail::Check),
        PaymentMethod::Installment => {
            match PaymentRepo::find_installment_by_outcome(pool, outcome.id).await? {
                Some(payment) => {
                    let schedules = ScheduleRepo::list_by_installment(pool, payment.id).await?;
                    Some(PaymentDetail::Installment { payment, schedules })
                }
                None => None,
            }
        }
    };
    detail.ok_or_else(|| payment_missing(outcome.id))
}

fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// GET /api/v1/financials/outcomes/{target_type}/{target_id}
pub async fn list_by_target(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((target_type, target_id)): Path<(String, DbId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<FinancialOutcome>>>> {
    let target = Target::new(TargetKind::parse(&target_type)?, target_id);
    require_change(&state.pool, target, auth.user_id).await?;

    let (limit, offset) = params.resolve();
    let outcomes = OutcomeRepo::list_by_target(&state.pool, target, limit, offset).await?;
    Ok(Json(DataResponse { data: outcomes }))
}

/// POST /api/v1/financials/outcomes/{target_type}/{target_id}
///
/// Also creates the matching cash, check, or installment row.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((target_type, target_id)): Path<(String, DbId)>,
    Json(input): Json<CreateOutcome>,
) -> AppResult<(StatusCode, Json<DataResponse<FinancialOutcome>>)> {
    let target = Target::new(TargetKind::parse(&target_type)?, target_id);
    require_change(&state.pool, target, auth.user_id).await?;

    validate_title(&input.title)?;
    validate_price(input.price)?;

    let outcome = OutcomeRepo::create(&state.pool, auth.user_id, target, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        outcome_id = outcome.id,
        target = %target.kind,
        target_id,
        "Financial outcome created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// GET /api/v1/financials/outcomes/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FinancialOutcome>>> {
    let outcome = outcome_for_change(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// PUT|PATCH /api/v1/financials/outcomes/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOutcome>,
) -> AppResult<Json<DataResponse<FinancialOutcome>>> {
    outcome_for_change(&state.pool, id, auth.user_id).await?;

    reject_method_change(input.payment_method)?;
    if let Some(ref title) = input.title {
        validate_title(title)?;
    }
    if let Some(price) = input.price {
        validate_price(price)?;
    }

    let outcome = OutcomeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;

    tracing::info!(user_id = auth.user_id, outcome_id = id, "Financial outcome updated");
    Ok(Json(DataResponse { data: outcome }))
}

/// DELETE /api/v1/financials/outcomes/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    outcome_for_change(&state.pool, id, auth.user_id).await?;
    if OutcomeRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, outcome_id = id, "Financial outcome deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/financials/outcomes/{id}/payment-method
pub async fn get_payment_method(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaymentDetail>>> {
    let outcome = outcome_for_change(&state.pool, id, auth.user_id).await?;
    let data = payment_detail(&state.pool, &outcome).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT|PATCH /api/v1/financials/outcomes/{id}/payment-method
///
/// The body shape depends on the outcome's payment method. Every field is
/// write-once.
pub async fn update_payment_method(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<DataResponse<PaymentDetail>>> {
    let outcome = outcome_for_change(&state.pool, id, auth.user_id).await?;
    let pool = &state.pool;

    match payment_detail(pool, &outcome).await? {
        PaymentDetail::Cash(cash) => {
            let input: UpdateCashPayment = parse_body(body)?;
            if let Some(date) = cash_update(cash.payment_date, input.payment_date, today())? {
                PaymentRepo::set_cash_date(pool, cash.id, Some(date))
                    .await?
                    .ok_or_else(|| payment_missing(id))?;
            }
        }
        PaymentDetail::Check(check) => {
            let input: UpdateCheckPayment = parse_body(body)?;
            let change = check_update(
                check.check_date,
                check.check_number.as_deref(),
                input.check_date,
                input.check_number,
                today(),
            )?;
            if change.check_date.is_some() || change.check_number.is_some() {
                PaymentRepo::set_check_details(
                    pool,
                    check.id,
                    change.check_date,
                    change.check_number.as_deref(),
                )
                .await?
                .ok_or_else(|| payment_missing(id))?;
            }
        }
        PaymentDetail::Installment { payment, .. } => {
            let input: UpdateInstallmentPayment = parse_body(body)?;
            let count = installment_update(payment.count_installments, input.count_installments)?;
            if count.is_some() {
                PaymentRepo::set_installment_count(pool, payment.id, count)
                    .await?
                    .ok_or_else(|| payment_missing(id))?;
            }
        }
    }

    tracing::info!(
        user_id = auth.user_id,
        outcome_id = id,
        method = %outcome.payment_method,
        "Payment method updated"
    );
    let data = payment_detail(pool, &outcome).await?;
    Ok(Json(DataResponse { data }))
}
