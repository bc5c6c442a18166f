//! Parent-row locks taken before reading aggregates over a parent's
//! children. Concurrent writers under the same parent queue on the lock, so
//! each one sees the children committed before it.

use sqlx::{Postgres, Transaction};
use taskfund_core::types::{DbId, Money};

/// Lock a project, task, or subtask row and return its budget.
///
/// `table` is one of the fixed hierarchy table names, never user input.
pub(crate) async fn budget_for_update(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    id: DbId,
) -> Result<Option<Money>, sqlx::Error> {
    let query = format!("SELECT budget FROM {table} WHERE id = $1 FOR UPDATE");
    sqlx::query_scalar::<_, Option<Money>>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Lock an installment payment row so its schedules are dated one at a time.
pub(crate) async fn installment_for_update(
    tx: &mut Transaction<'_, Postgres>,
    installment_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, DbId>("SELECT id FROM installment_payments WHERE id = $1 FOR UPDATE")
        .bind(installment_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(())
}
