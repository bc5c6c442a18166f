//! Financial outcome (expense) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskfund_core::status::{OutcomeStatus, PaymentMethod};
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::{Date, DbId, Money, Timestamp};

/// A row from the `financial_outcomes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinancialOutcome {
    pub id: DbId,
    pub created_by: DbId,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub payment_date: Option<Date>,
    #[sqlx(try_from = "String")]
    pub status: OutcomeStatus,
    #[sqlx(try_from = "String")]
    pub payment_method: PaymentMethod,
    #[sqlx(try_from = "String")]
    pub target_type: TargetKind,
    pub target_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FinancialOutcome {
    /// The project, task, or subtask this outcome is charged to.
    pub fn target(&self) -> Target {
        Target::new(self.target_type, self.target_id)
    }
}

/// DTO for creating an outcome. The target comes from the URL.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOutcome {
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub payment_method: PaymentMethod,
}

/// DTO for updating an outcome.
///
/// `payment_method` is accepted only so that an attempt to change it can be
/// rejected with a clear message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOutcome {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub payment_method: Option<PaymentMethod>,
}
