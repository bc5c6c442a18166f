//! Upward status propagation.
//!
//! Each function runs inside the transaction of the write that triggered it,
//! so a parent never observes a half-applied child change:
//!
//! - subtask write  -> task may complete -> project may complete
//! - task write     -> project may complete
//! - schedule write -> installment payment may settle -> outcome status
//! - payment write  -> outcome status

use sqlx::{Postgres, Transaction};
use taskfund_core::status::{
    installment_status_from_schedules, outcome_status_from_payment, parent_should_complete,
    OutcomeStatus, PaymentStatus, ScheduleStatus, WorkStatus,
};
use taskfund_core::types::DbId;

use crate::decode_err;

type Tx<'a> = Transaction<'a, Postgres>;

fn parse_all<T>(
    raw: Vec<String>,
    parse: fn(&str) -> Result<T, taskfund_core::error::CoreError>,
) -> Result<Vec<T>, sqlx::Error> {
    raw.iter().map(|s| parse(s).map_err(decode_err)).collect()
}

/// Re-evaluate a task after one of its subtasks was written.
pub async fn subtask_saved(tx: &mut Tx<'_>, task_id: DbId) -> Result<(), sqlx::Error> {
    let children: Vec<String> =
        sqlx::query_scalar("SELECT status FROM subtasks WHERE task_id = $1")
            .bind(task_id)
            .fetch_all(&mut **tx)
            .await?;
    let children = parse_all(children, WorkStatus::parse)?;

    let Some((status, project_id)) = sqlx::query_as::<_, (String, DbId)>(
        "SELECT status, project_id FROM tasks WHERE id = $1 FOR UPDATE",
    )
    .bind(task_id)
    .fetch_optional(&mut **tx)
    .await?
    else {
        return Ok(());
    };
    let status = WorkStatus::parse(&status).map_err(decode_err)?;

    if parent_should_complete(status, &children) {
        mark_completed(tx, "tasks", task_id).await?;
        tracing::info!(task_id, "Task completed by its subtasks");
        task_saved(tx, project_id).await?;
    }
    Ok(())
}

/// Re-evaluate a project after one of its tasks was written.
pub async fn task_saved(tx: &mut Tx<'_>, project_id: DbId) -> Result<(), sqlx::Error> {
    let children: Vec<String> =
        sqlx::query_scalar("SELECT status FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_all(&mut **tx)
            .await?;
    let children = parse_all(children, WorkStatus::parse)?;

    let Some(status) = sqlx::query_scalar::<_, String>(
        "SELECT status FROM projects WHERE id = $1 FOR UPDATE",
    )
    .bind(project_id)
    .fetch_optional(&mut **tx)
    .await?
    else {
        return Ok(());
    };
    let status = WorkStatus::parse(&status).map_err(decode_err)?;

    if parent_should_complete(status, &children) {
        mark_completed(tx, "projects", project_id).await?;
        tracing::info!(project_id, "Project completed by its tasks");
    }
    Ok(())
}

async fn mark_completed(tx: &mut Tx<'_>, table: &str, id: DbId) -> Result<(), sqlx::Error> {
    let query = format!(
        "UPDATE {table} SET status = 'completed', \
             completion_date = COALESCE(completion_date, CURRENT_DATE) \
         WHERE id = $1"
    );
    sqlx::query(&query).bind(id).execute(&mut **tx).await?;
    Ok(())
}

/// Re-evaluate an installment payment after one of its schedules was written.
pub async fn schedule_saved(tx: &mut Tx<'_>, installment_id: DbId) -> Result<(), sqlx::Error> {
    let schedules: Vec<String> = sqlx::query_scalar(
        "SELECT status FROM installment_schedules WHERE installment_payment_id = $1",
    )
    .bind(installment_id)
    .fetch_all(&mut **tx)
    .await?;
    let schedules = parse_all(schedules, ScheduleStatus::parse)?;

    let Some(derived) = installment_status_from_schedules(&schedules) else {
        return Ok(());
    };

    let Some((current, outcome_id)) = sqlx::query_as::<_, (Option<String>, DbId)>(
        "SELECT status, financial_outcome_id FROM installment_payments WHERE id = $1 FOR UPDATE",
    )
    .bind(installment_id)
    .fetch_optional(&mut **tx)
    .await?
    else {
        return Ok(());
    };
    if current.as_deref() == Some(derived.as_str()) {
        return Ok(());
    }

    sqlx::query("UPDATE installment_payments SET status = $2 WHERE id = $1")
        .bind(installment_id)
        .bind(derived.as_str())
        .execute(&mut **tx)
        .await?;
    tracing::info!(installment_id, status = %derived, "Installment payment settled by its schedules");

    payment_saved(tx, outcome_id, Some(derived)).await
}

/// Align an outcome's status with its payment-method row.
///
/// When the outcome becomes paid and has no payment date yet, today is
/// recorded.
pub async fn payment_saved(
    tx: &mut Tx<'_>,
    outcome_id: DbId,
    payment: Option<PaymentStatus>,
) -> Result<(), sqlx::Error> {
    let status = outcome_status_from_payment(payment);
    sqlx::query(
        "UPDATE financial_outcomes SET
            status = $2,
            payment_date = CASE WHEN $3 THEN COALESCE(payment_date, CURRENT_DATE)
                                ELSE payment_date END
         WHERE id = $1 AND status <> $2",
    )
    .bind(outcome_id)
    .bind(status.as_str())
    .bind(status == OutcomeStatus::Paid)
    .execute(&mut **tx)
    .await?;
    tracing::debug!(outcome_id, status = %status, "Outcome status synced");
    Ok(())
}
