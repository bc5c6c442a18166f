//! Repository for the payment-method tables (`cash_payments`,
//! `check_payments`, `installment_payments`).
//!
//! Every write re-syncs the owning outcome's status in the same transaction.

use sqlx::PgPool;
use taskfund_core::status::PaymentStatus;
use taskfund_core::types::{Date, DbId};

use crate::decode_err;
use crate::models::payment::{CashPayment, CheckPayment, InstallmentPayment};
use crate::propagation;

const CASH_COLUMNS: &str =
    "id, financial_outcome_id, payment_date, status, created_at, updated_at";
const CHECK_COLUMNS: &str =
    "id, financial_outcome_id, check_date, check_number, status, created_at, updated_at";
const INSTALLMENT_COLUMNS: &str =
    "id, financial_outcome_id, count_installments, status, created_at, updated_at";

/// Provides access to the payment-method rows behind outcomes.
pub struct PaymentRepo;

impl PaymentRepo {
    // -----------------------------------------------------------------------
    // Cash
    // -----------------------------------------------------------------------

    pub async fn find_cash(pool: &PgPool, id: DbId) -> Result<Option<CashPayment>, sqlx::Error> {
        let query = format!("SELECT {CASH_COLUMNS} FROM cash_payments WHERE id = $1");
        sqlx::query_as::<_, CashPayment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_cash_by_outcome(
        pool: &PgPool,
        outcome_id: DbId,
    ) -> Result<Option<CashPayment>, sqlx::Error> {
        let query =
            format!("SELECT {CASH_COLUMNS} FROM cash_payments WHERE financial_outcome_id = $1");
        sqlx::query_as::<_, CashPayment>(&query)
            .bind(outcome_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the payment date of a cash payment.
    pub async fn set_cash_date(
        pool: &PgPool,
        id: DbId,
        payment_date: Option<Date>,
    ) -> Result<Option<CashPayment>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE cash_payments SET payment_date = COALESCE(payment_date, $2)
             WHERE id = $1
             RETURNING {CASH_COLUMNS}"
        );
        let payment = sqlx::query_as::<_, CashPayment>(&query)
            .bind(id)
            .bind(payment_date)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(ref p) = payment {
            let status = p.status().map_err(decode_err)?;
            propagation::payment_saved(&mut tx, p.financial_outcome_id, status).await?;
        }
        tx.commit().await?;
        Ok(payment)
    }

    /// Settle a cash payment as done or canceled.
    pub async fn settle_cash(
        pool: &PgPool,
        id: DbId,
        status: PaymentStatus,
    ) -> Result<Option<CashPayment>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE cash_payments SET status = $2
             WHERE id = $1 AND status IS NULL
             RETURNING {CASH_COLUMNS}"
        );
        let payment = sqlx::query_as::<_, CashPayment>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(ref p) = payment {
            propagation::payment_saved(&mut tx, p.financial_outcome_id, Some(status)).await?;
        }
        tx.commit().await?;
        Ok(payment)
    }

    // -----------------------------------------------------------------------
    // Check
    // -----------------------------------------------------------------------

    pub async fn find_check(pool: &PgPool, id: DbId) -> Result<Option<CheckPayment>, sqlx::Error> {
        let query = format!("SELECT {CHECK_COLUMNS} FROM check_payments WHERE id = $1");
        sqlx::query_as::<_, CheckPayment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_check_by_outcome(
        pool: &PgPool,
        outcome_id: DbId,
    ) -> Result<Option<CheckPayment>, sqlx::Error> {
        let query =
            format!("SELECT {CHECK_COLUMNS} FROM check_payments WHERE financial_outcome_id = $1");
        sqlx::query_as::<_, CheckPayment>(&query)
            .bind(outcome_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the check date and/or number. Fields already set are kept.
    pub async fn set_check_details(
        pool: &PgPool,
        id: DbId,
        check_date: Option<Date>,
        check_number: Option<&str>,
    ) -> Result<Option<CheckPayment>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE check_payments SET
                check_date = COALESCE(check_date, $2),
                check_number = COALESCE(check_number, $3)
             WHERE id = $1
             RETURNING {CHECK_COLUMNS}"
        );
        let payment = sqlx::query_as::<_, CheckPayment>(&query)
            .bind(id)
            .bind(check_date)
            .bind(check_number)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(ref p) = payment {
            let status = p.status().map_err(decode_err)?;
            propagation::payment_saved(&mut tx, p.financial_outcome_id, status).await?;
        }
        tx.commit().await?;
        Ok(payment)
    }

    /// Settle a check payment as done or canceled.
    pub async fn settle_check(
        pool: &PgPool,
        id: DbId,
        status: PaymentStatus,
    ) -> Result<Option<CheckPayment>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE check_payments SET status = $2
             WHERE id = $1 AND status IS NULL
             RETURNING {CHECK_COLUMNS}"
        );
        let payment = sqlx::query_as::<_, CheckPayment>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(ref p) = payment {
            propagation::payment_saved(&mut tx, p.financial_outcome_id, Some(status)).await?;
        }
        tx.commit().await?;
        Ok(payment)
    }

    // -----------------------------------------------------------------------
    // Installment
    // -----------------------------------------------------------------------

    pub async fn find_installment(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InstallmentPayment>, sqlx::Error> {
        let query = format!("SELECT {INSTALLMENT_COLUMNS} FROM installment_payments WHERE id = $1");
        sqlx::query_as::<_, InstallmentPayment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_installment_by_outcome(
        pool: &PgPool,
        outcome_id: DbId,
    ) -> Result<Option<InstallmentPayment>, sqlx::Error> {
        let query = format!(
            "SELECT {INSTALLMENT_COLUMNS} FROM installment_payments WHERE financial_outcome_id = $1"
        );
        sqlx::query_as::<_, InstallmentPayment>(&query)
            .bind(outcome_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the number of installments and create one open schedule per
    /// installment. Does nothing to the schedules if the count was already
    /// set.
    pub async fn set_installment_count(
        pool: &PgPool,
        id: DbId,
        count: Option<i32>,
    ) -> Result<Option<InstallmentPayment>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE installment_payments SET count_installments = COALESCE(count_installments, $2)
             WHERE id = $1
             RETURNING {INSTALLMENT_COLUMNS}"
        );
        let before: Option<Option<i32>> =
            sqlx::query_scalar("SELECT count_installments FROM installment_payments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let payment = sqlx::query_as::<_, InstallmentPayment>(&query)
            .bind(id)
            .bind(count)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref p) = payment {
            if let (Some(None), Some(n)) = (before, p.count_installments) {
                sqlx::query(
                    "INSERT INTO installment_schedules (installment_payment_id)
                     SELECT $1 FROM generate_series(1, $2)",
                )
                .bind(p.id)
                .bind(n)
                .execute(&mut *tx)
                .await?;
                tracing::debug!(installment_id = p.id, count = n, "Installment schedules created");
            }
            let status = p.status().map_err(decode_err)?;
            propagation::payment_saved(&mut tx, p.financial_outcome_id, status).await?;
        }

        tx.commit().await?;
        Ok(payment)
    }
}
