//! Repository for the `financial_incomes` table.

use sqlx::PgPool;
use taskfund_core::types::DbId;

use crate::models::income::{CreateIncome, FinancialIncome, UpdateIncome};

const COLUMNS: &str =
    "id, title, description, amount, source, owner_id, project_id, created_at, updated_at";

/// Provides CRUD operations for project incomes.
pub struct IncomeRepo;

impl IncomeRepo {
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        project_id: DbId,
        input: &CreateIncome,
    ) -> Result<FinancialIncome, sqlx::Error> {
        let query = format!(
            "INSERT INTO financial_incomes (title, description, amount, source, owner_id, project_id)
             VALUES ($1, COALESCE($2, ''), $3, COALESCE($4, ''), $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialIncome>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.amount)
            .bind(&input.source)
            .bind(owner_id)
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FinancialIncome>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM financial_incomes WHERE id = $1");
        sqlx::query_as::<_, FinancialIncome>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Incomes recorded on a project, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<FinancialIncome>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM financial_incomes
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, FinancialIncome>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Update an income. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIncome,
    ) -> Result<Option<FinancialIncome>, sqlx::Error> {
        let query = format!(
            "UPDATE financial_incomes SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                amount = COALESCE($4, amount),
                source = COALESCE($5, source)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialIncome>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.amount)
            .bind(&input.source)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM financial_incomes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
