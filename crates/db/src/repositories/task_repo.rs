//! Repository for the `tasks` table.

use sqlx::{PgExecutor, PgPool};
use taskfund_core::budget::{validate_child_fits, validate_covers_children};
use taskfund_core::schedule::DateRange;
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::{Date, DbId, Money};

use crate::error::WriteError;
use crate::locks::budget_for_update;
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::propagation;
use crate::repositories::{ExpertRepo, SubTaskRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, manager_id, title, description, start_date, end_date, \
                        status, budget, completion_date, created_at, updated_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task under a project, attach its experts, and re-evaluate
    /// the project's status.
    ///
    /// The project row stays locked while its task budgets are summed, so
    /// concurrent creates cannot overrun the project budget together.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        manager_id: DbId,
        input: &CreateTask,
        expert_ids: &[DbId],
    ) -> Result<Task, WriteError> {
        let mut tx = pool.begin().await?;

        let project_budget = budget_for_update(&mut tx, "projects", project_id).await?;
        if input.budget.is_some() {
            let allotted = Self::budget_total(&mut *tx, project_id, None).await?;
            validate_child_fits(project_budget, allotted, input.budget, "project")?;
        }

        let query = format!(
            "INSERT INTO tasks
                (project_id, manager_id, title, description, start_date, end_date, status, budget,
                 completion_date)
             VALUES ($1, $2, $3, COALESCE($4, ''), $5, $6, COALESCE($7, 'not_started'), $8,
                     CASE WHEN $7::TEXT = 'completed' THEN CURRENT_DATE END)
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(manager_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.budget)
            .fetch_one(&mut *tx)
            .await?;

        ExpertRepo::add_inner(&mut tx, Target::new(TargetKind::Task, task.id), expert_ids).await?;
        propagation::task_saved(&mut tx, project_id).await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Find a task by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All tasks of a project, oldest first.
    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks of a project the user manages or serves on as an expert.
    pub async fn list_by_project_for_member(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks t
             WHERE t.project_id = $1
               AND (t.manager_id = $2
                    OR EXISTS (SELECT 1 FROM task_experts e
                               WHERE e.task_id = t.id AND e.user_id = $2))
             ORDER BY t.id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a task and re-evaluate its project. Only non-`None` fields are
    /// applied; dates already set are kept.
    ///
    /// A new budget is checked against the locked project and task rows: it
    /// must fit what the sibling tasks leave of the project budget and still
    /// cover the task's subtasks.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        manager_id: Option<DbId>,
        input: &UpdateTask,
        new_expert_ids: &[DbId],
    ) -> Result<Option<Task>, WriteError> {
        let mut tx = pool.begin().await?;

        let Some(project_id) =
            sqlx::query_scalar::<_, DbId>("SELECT project_id FROM tasks WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(None);
        };
        if input.budget.is_some() {
            // Child before parent, the order propagation locks them in.
            budget_for_update(&mut tx, "tasks", id).await?;
            let project_budget = budget_for_update(&mut tx, "projects", project_id).await?;

            let siblings = Self::budget_total(&mut *tx, project_id, Some(id)).await?;
            validate_child_fits(project_budget, siblings, input.budget, "project")?;
            let allotted = SubTaskRepo::budget_total(&mut *tx, id, None).await?;
            validate_covers_children(input.budget, allotted, "subtask")?;
        }

        let query = format!(
            "UPDATE tasks SET
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
        let task = sqlx::query_as::<_, Task>(&query)
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

        if let Some(ref task) = task {
            ExpertRepo::add_inner(&mut tx, Target::new(TargetKind::Task, task.id), new_expert_ids)
                .await?;
            propagation::task_saved(&mut tx, task.project_id).await?;
        }

        tx.commit().await?;
        Ok(task)
    }

    /// Mark a task completed as of today and re-evaluate its project.
    /// Returns `None` if the task does not exist or is already completed.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE tasks SET status = 'completed', completion_date = CURRENT_DATE
             WHERE id = $1 AND status <> 'completed'
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(ref task) = task {
            propagation::task_saved(&mut tx, task.project_id).await?;
        }

        tx.commit().await?;
        Ok(task)
    }

    /// Delete a task with its subtasks and their outcomes. Returns `true` if
    /// a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total budget allotted to a project's tasks, optionally leaving one
    /// task out (the one being updated).
    pub async fn budget_total<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        except_id: Option<DbId>,
    ) -> Result<Money, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(budget), 0)::BIGINT FROM tasks
             WHERE project_id = $1 AND id IS DISTINCT FROM $2",
        )
        .bind(project_id)
        .bind(except_id)
        .fetch_one(executor)
        .await
    }

    /// Earliest and latest date used by any task of the project.
    pub async fn date_envelope(pool: &PgPool, project_id: DbId) -> Result<DateRange, sqlx::Error> {
        let (start, end) = sqlx::query_as::<_, (Option<Date>, Option<Date>)>(
            "SELECT LEAST(MIN(start_date), MIN(end_date)), GREATEST(MAX(start_date), MAX(end_date))
             FROM tasks WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(DateRange::new(start, end))
    }
}
