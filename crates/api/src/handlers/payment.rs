//! Settlement of cash and check payments, and installment schedules.

use axum::extract::{Path, State};
use axum::Json;
use sqlx::PgPool;
use taskfund_core::error::CoreError;
use taskfund_core::payment::{ensure_date_recorded, ensure_payment_open, ensure_schedule_open};
use taskfund_core::status::{PaymentStatus, ScheduleStatus};
use taskfund_core::types::{today, DbId};
use taskfund_db::models::payment::{
    CashPayment, CheckPayment, InstallmentPayment, InstallmentSchedule, UpdateSchedule,
};
use taskfund_db::repositories::{PaymentRepo, ScheduleRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::outcome::outcome_for_change;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

async fn cash_for_change(pool: &PgPool, id: DbId, user_id: DbId) -> AppResult<CashPayment> {
    let cash = PaymentRepo::find_cash(pool, id)
        .await?
        .ok_or(not_found("CashPayment", id))?;
    outcome_for_change(pool, cash.financial_outcome_id, user_id).await?;
    Ok(cash)
}

async fn check_for_change(pool: &PgPool, id: DbId, user_id: DbId) -> AppResult<CheckPayment> {
    let check = PaymentRepo::find_check(pool, id)
        .await?
        .ok_or(not_found("CheckPayment", id))?;
    outcome_for_change(pool, check.financial_outcome_id, user_id).await?;
    Ok(check)
}

async fn installment_for_change(
    pool: &PgPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<InstallmentPayment> {
    let installment = PaymentRepo::find_installment(pool, id)
        .await?
        .ok_or(not_found("InstallmentPayment", id))?;
    outcome_for_change(pool, installment.financial_outcome_id, user_id).await?;
    Ok(installment)
}

async fn schedule_for_change(
    pool: &PgPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<InstallmentSchedule> {
    let schedule = ScheduleRepo::find_by_id(pool, id)
        .await?
        .ok_or(not_found("InstallmentSchedule", id))?;
    installment_for_change(pool, schedule.installment_payment_id, user_id).await?;
    Ok(schedule)
}

/// A concurrent settlement got there first.
fn already_settled() -> AppError {
    AppError::Core(CoreError::Conflict("Payment is already settled".into()))
}

// ---------------------------------------------------------------------------
// Cash
// ---------------------------------------------------------------------------

/// POST /api/v1/financials/cash-payments/{id}/complete
pub async fn complete_cash(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CashPayment>>> {
    settle_cash(auth, &state.pool, id, PaymentStatus::Done).await
}

/// POST /api/v1/financials/cash-payments/{id}/cancel
pub async fn cancel_cash(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CashPayment>>> {
    settle_cash(auth, &state.pool, id, PaymentStatus::Canceled).await
}

async fn settle_cash(
    auth: AuthUser,
    pool: &PgPool,
    id: DbId,
    status: PaymentStatus,
) -> AppResult<Json<DataResponse<CashPayment>>> {
    let cash = cash_for_change(pool, id, auth.user_id).await?;
    ensure_payment_open(cash.status()?)?;
    if status == PaymentStatus::Done {
        ensure_date_recorded(cash.payment_date, "payment")?;
    }

    let cash = PaymentRepo::settle_cash(pool, id, status)
        .await?
        .ok_or_else(already_settled)?;

    tracing::info!(user_id = auth.user_id, cash_payment_id = id, status = %status, "Cash payment settled");
    Ok(Json(DataResponse { data: cash }))
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// POST /api/v1/financials/check-payments/{id}/complete
pub async fn complete_check(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CheckPayment>>> {
    settle_check(auth, &state.pool, id, PaymentStatus::Done).await
}

/// POST /api/v1/financials/check-payments/{id}/cancel
pub async fn cancel_check(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CheckPayment>>> {
    settle_check(auth, &state.pool, id, PaymentStatus::Canceled).await
}

async fn settle_check(
    auth: AuthUser,
    pool: &PgPool,
    id: DbId,
    status: PaymentStatus,
) -> AppResult<Json<DataResponse<CheckPayment>>> {
    let check = check_for_change(pool, id, auth.user_id).await?;
    ensure_payment_open(check.status()?)?;
    if status == PaymentStatus::Done {
        ensure_date_recorded(check.check_date, "check")?;
        if check.check_number.is_none() {
            return Err(AppError::Core(CoreError::Validation(
                "You must enter a check number before completing the payment!".into(),
            )));
        }
    }

    let check = PaymentRepo::settle_check(pool, id, status)
        .await?
        .ok_or_else(already_settled)?;

    tracing::info!(user_id = auth.user_id, check_payment_id = id, status = %status, "Check payment settled");
    Ok(Json(DataResponse { data: check }))
}

// ---------------------------------------------------------------------------
// Installment schedules
// ---------------------------------------------------------------------------

/// GET /api/v1/financials/installments/{installment_id}/schedules
pub async fn list_schedules(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(installment_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<InstallmentSchedule>>>> {
    installment_for_change(&state.pool, installment_id, auth.user_id).await?;
    let schedules = ScheduleRepo::list_by_installment(&state.pool, installment_id).await?;
    Ok(Json(DataResponse { data: schedules }))
}

/// GET /api/v1/financials/installment-schedules/{id}
pub async fn get_schedule(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InstallmentSchedule>>> {
    let schedule = schedule_for_change(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: schedule }))
}

/// PUT|PATCH /api/v1/financials/installment-schedules/{id}
pub async fn update_schedule(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSchedule>,
) -> AppResult<Json<DataResponse<InstallmentSchedule>>> {
    let current = schedule_for_change(&state.pool, id, auth.user_id).await?;

    let schedule = ScheduleRepo::set_date(&state.pool, id, input.date, today())
        .await?
        .ok_or(not_found("InstallmentSchedule", id))?;
    if schedule.date != current.date {
        tracing::info!(user_id = auth.user_id, schedule_id = id, date = ?schedule.date, "Installment date set");
    }
    Ok(Json(DataResponse { data: schedule }))
}

/// POST /api/v1/financials/installment-schedules/{id}/complete
pub async fn complete_schedule(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InstallmentSchedule>>> {
    settle_schedule(auth, &state.pool, id, ScheduleStatus::Paid).await
}

/// POST /api/v1/financials/installment-schedules/{id}/cancel
pub async fn cancel_schedule(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InstallmentSchedule>>> {
    settle_schedule(auth, &state.pool, id, ScheduleStatus::Canceled).await
}

async fn settle_schedule(
    auth: AuthUser,
    pool: &PgPool,
    id: DbId,
    status: ScheduleStatus,
) -> AppResult<Json<DataResponse<InstallmentSchedule>>> {
    let schedule = schedule_for_change(pool, id, auth.user_id).await?;
    ensure_schedule_open(schedule.status)?;
    if status == ScheduleStatus::Paid {
        ensure_date_recorded(schedule.date, "installment")?;
    }

    let schedule = ScheduleRepo::settle(pool, id, status)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict("Installment is already settled".into()))
        })?;

    tracing::info!(user_id = auth.user_id, schedule_id = id, status = %status, "Installment settled");
    Ok(Json(DataResponse { data: schedule }))
}
