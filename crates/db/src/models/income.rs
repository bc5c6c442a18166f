//! Financial income model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskfund_core::types::{DbId, Money, Timestamp};

/// A row from the `financial_incomes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinancialIncome {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub amount: Money,
    pub source: String,
    pub owner_id: DbId,
    pub project_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording income on a project. The owner is the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIncome {
    pub title: String,
    pub description: Option<String>,
    pub amount: Money,
    pub source: Option<String>,
}

/// DTO for updating an income record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIncome {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub source: Option<String>,
}
