//! Repository for the `installment_schedules` table.

use sqlx::{PgExecutor, PgPool};
use taskfund_core::payment::schedule_update;
use taskfund_core::status::ScheduleStatus;
use taskfund_core::types::{Date, DbId};

use crate::error::WriteError;
use crate::locks::installment_for_update;
use crate::models::payment::InstallmentSchedule;
use crate::propagation;

const COLUMNS: &str = "id, installment_payment_id, date, status, created_at, updated_at";

/// Provides access to installment schedules.
pub struct ScheduleRepo;

impl ScheduleRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InstallmentSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM installment_schedules WHERE id = $1");
        sqlx::query_as::<_, InstallmentSchedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Schedules of one installment payment, in creation order.
    pub async fn list_by_installment(
        pool: &PgPool,
        installment_id: DbId,
    ) -> Result<Vec<InstallmentSchedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM installment_schedules
             WHERE installment_payment_id = $1
             ORDER BY id"
        );
        sqlx::query_as::<_, InstallmentSchedule>(&query)
            .bind(installment_id)
            .fetch_all(pool)
            .await
    }

    /// Dates already picked by the other schedules of the same installment.
    pub async fn sibling_dates<'e>(
        executor: impl PgExecutor<'e>,
        installment_id: DbId,
        except_id: DbId,
    ) -> Result<Vec<Date>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT date FROM installment_schedules
             WHERE installment_payment_id = $1 AND id <> $2 AND date IS NOT NULL
             ORDER BY date",
        )
        .bind(installment_id)
        .bind(except_id)
        .fetch_all(executor)
        .await
    }

    /// Record the date of a schedule.
    ///
    /// The owning installment payment is locked before the sibling dates are
    /// read, so two schedules of one payment cannot both claim the same date
    /// or month. A date already set is write-once; with no date requested
    /// the schedule is returned unchanged.
    ///
    /// Returns `None` if no schedule with the given `id` exists.
    pub async fn set_date(
        pool: &PgPool,
        id: DbId,
        requested: Option<Date>,
        today: Date,
    ) -> Result<Option<InstallmentSchedule>, WriteError> {
        let mut tx = pool.begin().await?;

        let Some(installment_id) = sqlx::query_scalar::<_, DbId>(
            "SELECT installment_payment_id FROM installment_schedules WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };
        installment_for_update(&mut tx, installment_id).await?;

        let query = format!("SELECT {COLUMNS} FROM installment_schedules WHERE id = $1");
        let Some(current) = sqlx::query_as::<_, InstallmentSchedule>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let siblings = Self::sibling_dates(&mut *tx, installment_id, id).await?;
        let Some(date) = schedule_update(current.date, requested, &siblings, today)? else {
            return Ok(Some(current));
        };

        let query = format!(
            "UPDATE installment_schedules SET date = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let schedule = sqlx::query_as::<_, InstallmentSchedule>(&query)
            .bind(id)
            .bind(date)
            .fetch_one(&mut *tx)
            .await?;
        propagation::schedule_saved(&mut tx, installment_id).await?;

        tx.commit().await?;
        Ok(Some(schedule))
    }

    /// Move an open schedule to `paid` or `canceled` and re-evaluate its
    /// installment payment. Returns `None` if the schedule does not exist or
    /// is no longer open.
    pub async fn settle(
        pool: &PgPool,
        id: DbId,
        status: ScheduleStatus,
    ) -> Result<Option<InstallmentSchedule>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE installment_schedules SET status = $2
             WHERE id = $1 AND status = 'in_progress'
             RETURNING {COLUMNS}"
        );
        let schedule = sqlx::query_as::<_, InstallmentSchedule>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(ref s) = schedule {
            propagation::schedule_saved(&mut tx, s.installment_payment_id).await?;
        }
        tx.commit().await?;
        Ok(schedule)
    }
}
