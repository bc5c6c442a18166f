//! Repository for the `projects` table.

use sqlx::PgPool;
use taskfund_core::budget::validate_covers_children;
use taskfund_core::hierarchy::DEFAULT_PROJECT_IMAGE;
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::DbId;

use crate::error::WriteError;
use crate::locks::budget_for_update;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::repositories::{ExpertRepo, TaskRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, ceo_id, description, image, category, start_date, end_date, \
                        status, budget, completion_date, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project owned by `ceo_id` and attach its experts.
    pub async fn create(
        pool: &PgPool,
        ceo_id: DbId,
        input: &CreateProject,
        expert_ids: &[DbId],
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects
                (title, ceo_id, description, image, category, start_date, end_date, status, budget,
                 completion_date)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $7, COALESCE($8, 'not_started'), $9,
                     CASE WHEN $8::TEXT = 'completed' THEN CURRENT_DATE END)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(ceo_id)
            .bind(&input.description)
            .bind(input.image.as_deref().unwrap_or(DEFAULT_PROJECT_IMAGE))
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.budget)
            .fetch_one(&mut *tx)
            .await?;

        ExpertRepo::add_inner(&mut tx, Target::new(TargetKind::Project, project.id), expert_ids)
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Projects the user runs as CEO or serves on as an expert, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects p
             WHERE p.ceo_id = $1
                OR EXISTS (SELECT 1 FROM project_experts e
                           WHERE e.project_id = p.id AND e.user_id = $1)
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied;
    /// dates already set are kept. New experts are added alongside the
    /// existing ones. A new budget may not drop below what the project's
    /// tasks already hold, checked with the project row locked.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
        new_expert_ids: &[DbId],
    ) -> Result<Option<Project>, WriteError> {
        let mut tx = pool.begin().await?;

        if input.budget.is_some() {
            match budget_for_update(&mut tx, "projects", id).await {
                Ok(_) => {}
                Err(sqlx::Error::RowNotFound) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
            let allotted = TaskRepo::budget_total(&mut *tx, id, None).await?;
            validate_covers_children(input.budget, allotted, "task")?;
        }

        let query = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                image = COALESCE($4, image),
                category = COALESCE($5, category),
                start_date = COALESCE(start_date, $6),
                end_date = COALESCE(end_date, $7),
                status = COALESCE($8, status),
                completion_date = CASE
                    WHEN $8::TEXT IS NULL THEN completion_date
                    WHEN $8::TEXT = 'completed' THEN COALESCE(completion_date, CURRENT_DATE)
                    ELSE NULL END,
                budget = COALESCE($9, budget)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image)
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.budget)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref project) = project {
            ExpertRepo::add_inner(&mut tx, Target::new(TargetKind::Project, project.id), new_expert_ids)
                .await?;
        }

        tx.commit().await?;
        Ok(project)
    }

    /// Mark a project completed as of today. Returns `None` if the project
    /// does not exist or is already completed.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status = 'completed', completion_date = CURRENT_DATE
             WHERE id = $1 AND status <> 'completed'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project together with its tasks, subtasks, and every
    /// outcome charged to any of them. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
