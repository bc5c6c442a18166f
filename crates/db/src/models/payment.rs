//! Payment-method records behind a financial outcome.
//!
//! Settlement statuses are nullable in the database (unset until the payment
//! is completed or canceled), so they are kept as raw strings on the row
//! structs and parsed through the `status()` accessors.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskfund_core::error::CoreError;
use taskfund_core::status::{PaymentStatus, ScheduleStatus};
use taskfund_core::types::{Date, DbId, Timestamp};

fn parse_status(raw: Option<&str>) -> Result<Option<PaymentStatus>, CoreError> {
    raw.map(PaymentStatus::parse).transpose()
}

/// A row from the `cash_payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CashPayment {
    pub id: DbId,
    pub financial_outcome_id: DbId,
    pub payment_date: Option<Date>,
    pub status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CashPayment {
    pub fn status(&self) -> Result<Option<PaymentStatus>, CoreError> {
        parse_status(self.status.as_deref())
    }
}

/// A row from the `check_payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CheckPayment {
    pub id: DbId,
    pub financial_outcome_id: DbId,
    pub check_date: Option<Date>,
    pub check_number: Option<String>,
    pub status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CheckPayment {
    pub fn status(&self) -> Result<Option<PaymentStatus>, CoreError> {
        parse_status(self.status.as_deref())
    }
}

/// A row from the `installment_payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InstallmentPayment {
    pub id: DbId,
    pub financial_outcome_id: DbId,
    pub count_installments: Option<i32>,
    pub status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InstallmentPayment {
    pub fn status(&self) -> Result<Option<PaymentStatus>, CoreError> {
        parse_status(self.status.as_deref())
    }
}

/// A row from the `installment_schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InstallmentSchedule {
    pub id: DbId,
    pub installment_payment_id: DbId,
    pub date: Option<Date>,
    #[sqlx(try_from = "String")]
    pub status: ScheduleStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The payment-method row of an outcome, tagged by its method.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "payment_method", rename_all = "lowercase")]
pub enum PaymentDetail {
    Cash(CashPayment),
    Check(CheckPayment),
    Installment {
        #[serde(flatten)]
        payment: InstallmentPayment,
        schedules: Vec<InstallmentSchedule>,
    },
}

/// Update for a cash payment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCashPayment {
    pub payment_date: Option<Date>,
}

/// Update for a check payment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCheckPayment {
    pub check_date: Option<Date>,
    pub check_number: Option<String>,
}

/// Update for an installment payment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInstallmentPayment {
    pub count_installments: Option<i32>,
}

/// Update for one installment schedule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSchedule {
    pub date: Option<Date>,
}
