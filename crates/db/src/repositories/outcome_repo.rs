//! Repository for the `financial_outcomes` table.

use sqlx::PgPool;
use taskfund_core::status::PaymentMethod;
use taskfund_core::target::Target;
use taskfund_core::types::DbId;

use crate::models::outcome::{CreateOutcome, FinancialOutcome, UpdateOutcome};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_by, title, description, price, payment_date, status, \
                        payment_method, target_type, target_id, created_at, updated_at";

/// Provides CRUD operations for financial outcomes.
pub struct OutcomeRepo;

impl OutcomeRepo {
    /// Insert an outcome charged to `target` together with the empty
    /// payment-method row its method calls for.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        target: Target,
        input: &CreateOutcome,
    ) -> Result<FinancialOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO financial_outcomes
                (created_by, title, description, price, payment_method, target_type, target_id)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let outcome = sqlx::query_as::<_, FinancialOutcome>(&query)
            .bind(created_by)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.payment_method.as_str())
            .bind(target.kind.as_str())
            .bind(target.id)
            .fetch_one(&mut *tx)
            .await?;

        let detail_table = match outcome.payment_method {
            PaymentMethod::Cash => "cash_payments",
            PaymentMethod::Check => "check_payments",
            PaymentMethod::Installment => "installment_payments",
        };
        sqlx::query(&format!(
            "INSERT INTO {detail_table} (financial_outcome_id) VALUES ($1)"
        ))
        .bind(outcome.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(outcome)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FinancialOutcome>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM financial_outcomes WHERE id = $1");
        sqlx::query_as::<_, FinancialOutcome>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Outcomes charged to one node, newest first.
    pub async fn list_by_target(
        pool: &PgPool,
        target: Target,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FinancialOutcome>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM financial_outcomes
             WHERE target_type = $1 AND target_id = $2
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, FinancialOutcome>(&query)
            .bind(target.kind.as_str())
            .bind(target.id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update the descriptive fields of an outcome. The payment method is
    /// never touched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOutcome,
    ) -> Result<Option<FinancialOutcome>, sqlx::Error> {
        let query = format!(
            "UPDATE financial_outcomes SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialOutcome>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price)
            .fetch_optional(pool)
            .await
    }

    /// Delete an outcome and its payment-method rows. Returns `true` if a
    /// row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM financial_outcomes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
