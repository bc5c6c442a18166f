//! Repository for the `subtasks` table.

use sqlx::{PgExecutor, PgPool};
use taskfund_core::budget::validate_child_fits;
use taskfund_core::schedule::DateRange;
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::{Date, DbId, Money};

use crate::error::WriteError;
use crate::locks::budget_for_update;
use crate::models::subtask::{CreateSubTask, SubTask, UpdateSubTask};
use crate::propagation;
use crate::repositories::ExpertRepo;

const COLUMNS: &str = "id, task_id, manager_id, title, description, start_date, end_date, \
                        status, budget, completion_date, created_at, updated_at";

/// Provides CRUD operations for subtasks.
pub struct SubTaskRepo;

impl SubTaskRepo {
    /// Insert a subtask under a task, attach its experts, and re-evaluate
    /// the task (and through it the project).
    pub async fn create(
        pool: &PgPool,
        task_id: DbId,
        manager_id: DbId,
        input: &CreateSubTask,
        expert_ids: &[DbId],
    ) -> Result<SubTask, WriteError> {
        let mut tx = pool.begin().await?;

        let task_budget = budget_for_update(&mut tx, "tasks", task_id).await?;
        if input.budget.is_some() {
            let allotted = Self::budget_total(&mut *tx, task_id, None).await?;
            validate_child_fits(task_budget, allotted, input.budget, "task")?;
        }

        let query = format!(
            "INSERT INTO subtasks
                (task_id, manager_id, title, description, start_date, end_date, status, budget,
                 completion_date)
             VALUES ($1, $2, $3, COALESCE($4, ''), $5, $6, COALESCE($7, 'not_started'), $8,
                     CASE WHEN $7::TEXT = 'completed' THEN CURRENT_DATE END)
             RETURNING {COLUMNS}"
        );
        let subtask = sqlx::query_as::<_, SubTask>(&query)
            .bind(task_id)
            .bind(manager_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.budget)
            .fetch_one(&mut *tx)
            .await?;

        ExpertRepo::add_inner(&mut tx, Target::new(TargetKind::SubTask, subtask.id), expert_ids)
            .await?;
        propagation::subtask_saved(&mut tx, task_id).await?;

        tx.commit().await?;
        Ok(subtask)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SubTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subtasks WHERE id = $1");
        sqlx::query_as::<_, SubTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All subtasks of a task, oldest first.
    pub async fn list_by_task(pool: &PgPool, task_id: DbId) -> Result<Vec<SubTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subtasks WHERE task_id = $1 ORDER BY id");
        sqlx::query_as::<_, SubTask>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Subtasks of a task the user manages or serves on as an expert.
    pub async fn list_by_task_for_member(
        pool: &PgPool,
        task_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<SubTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subtasks s
             WHERE s.task_id = $1
               AND (s.manager_id = $2
                    OR EXISTS (SELECT 1 FROM subtask_experts e
                               WHERE e.subtask_id = s.id AND e.user_id = $2))
             ORDER BY s.id"
        );
        sqlx::query_as::<_, SubTask>(&query)
            .bind(task_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a subtask and re-evaluate its task. Only non-`None` fields are
    /// applied; dates already set are kept. A new budget must fit what the
    /// sibling subtasks leave of the locked task's budget.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        manager_id: Option<DbId>,
        input: &UpdateSubTask,
        new_expert_ids: &[DbId],
    ) -> Result<Option<SubTask>, WriteError> {
        let mut tx = pool.begin().await?;

        let Some(task_id) =
            sqlx::query_scalar::<_, DbId>("SELECT task_id FROM subtasks WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(None);
        };
        if input.budget.is_some() {
            let task_budget = budget_for_update(&mut tx, "tasks", task_id).await?;
            let siblings = Self::budget_total(&mut *tx, task_id, Some(id)).await?;
            validate_child_fits(task_budget, siblings, input.budget, "task")?;
        }

        let query = format!(
            "UPDATE subtasks SET
                manager_id = COALESCE($2, manager_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                start_date = COALESCE(start_date, $5),
                end_date = COALESCE(end_date, $6),
                status = COALESCE($7, status),
                completion_date = CASE
                    WHEN $7::TEXT IS NULL THEN completion_date
                    WHEN $7::TEXT = 'completed' THEN COALESCE(completion_date, CURRENT_DATE)
                    ELSE NULL END,
                budget = COALESCE($8, budget)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let subtask = sqlx::query_as::<_, SubTask>(&query)
            .bind(id)
            .bind(manager_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.budget)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref subtask) = subtask {
            ExpertRepo::add_inner(
                &mut tx,
                Target::new(TargetKind::SubTask, subtask.id),
                new_expert_ids,
            )
            .await?;
            propagation::subtask_saved(&mut tx, subtask.task_id).await?;
        }

        tx.commit().await?;
        Ok(subtask)
    }

    /// Mark a subtask completed as of today and re-evaluate its task.
    /// Returns `None` if the subtask does not exist or is already completed.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<Option<SubTask>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE subtasks SET status = 'completed', completion_date = CURRENT_DATE
             WHERE id = $1 AND status <> 'completed'
             RETURNING {COLUMNS}"
        );
        let subtask = sqlx::query_as::<_, SubTask>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(ref subtask) = subtask {
            propagation::subtask_saved(&mut tx, subtask.task_id).await?;
        }

        tx.commit().await?;
        Ok(subtask)
    }

    /// Delete a subtask and its outcomes. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total budget allotted to a task's subtasks, optionally leaving one
    /// subtask out.
    pub async fn budget_total<'e>(
        executor: impl PgExecutor<'e>,
        task_id: DbId,
        except_id: Option<DbId>,
    ) -> Result<Money, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(budget), 0)::BIGINT FROM subtasks
             WHERE task_id = $1 AND id IS DISTINCT FROM $2",
        )
        .bind(task_id)
        .bind(except_id)
        .fetch_one(executor)
        .await
    }

    /// Earliest and latest date used by any subtask of the task.
    pub async fn date_envelope(pool: &PgPool, task_id: DbId) -> Result<DateRange, sqlx::Error> {
        let (start, end) = sqlx::query_as::<_, (Option<Date>, Option<Date>)>(
            "SELECT LEAST(MIN(start_date), MIN(end_date)), GREATEST(MAX(start_date), MAX(end_date))
             FROM subtasks WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_one(pool)
        .await?;
        Ok(DateRange::new(start, end))
    }
}
