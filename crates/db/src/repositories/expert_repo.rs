//! Repository for the expert junction tables (`project_experts`,
//! `task_experts`, `subtask_experts`).

use sqlx::{PgPool, Postgres, Transaction};
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::DbId;

use crate::models::user::User;

/// Junction table and its foreign-key column for a node kind.
fn junction(kind: TargetKind) -> (&'static str, &'static str) {
    match kind {
        TargetKind::Project => ("project_experts", "project_id"),
        TargetKind::Task => ("task_experts", "task_id"),
        TargetKind::SubTask => ("subtask_experts", "subtask_id"),
    }
}

/// Experts attached to projects, tasks, and subtasks.
pub struct ExpertRepo;

impl ExpertRepo {
    /// Experts of a node, in the order they were added.
    pub async fn list_users(pool: &PgPool, node: Target) -> Result<Vec<User>, sqlx::Error> {
        let (table, column) = junction(node.kind);
        let query = format!(
            "SELECT u.id, u.first_name, u.last_name, u.phone_number, u.email, u.gender, u.image,
                    u.password_hash, u.is_active, u.is_staff, u.created_at, u.updated_at
             FROM {table} e
             JOIN users u ON u.id = e.user_id
             WHERE e.{column} = $1
             ORDER BY e.created_at, u.id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(node.id)
            .fetch_all(pool)
            .await
    }

    /// IDs of a node's experts.
    pub async fn list_user_ids(pool: &PgPool, node: Target) -> Result<Vec<DbId>, sqlx::Error> {
        let (table, column) = junction(node.kind);
        let query = format!("SELECT user_id FROM {table} WHERE {column} = $1 ORDER BY user_id");
        sqlx::query_scalar(&query).bind(node.id).fetch_all(pool).await
    }

    /// Attach users to a node within an existing transaction. Users that are
    /// already experts are skipped.
    pub async fn add_inner(
        tx: &mut Transaction<'_, Postgres>,
        node: Target,
        user_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(());
        }
        let (table, column) = junction(node.kind);
        let query = format!(
            "INSERT INTO {table} ({column}, user_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT ({column}, user_id) DO NOTHING"
        );
        sqlx::query(&query)
            .bind(node.id)
            .bind(user_ids)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
