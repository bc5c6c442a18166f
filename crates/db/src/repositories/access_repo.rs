//! Loads the ownership chain needed for permission checks.

use sqlx::PgPool;
use taskfund_core::access::{NodeAccess, OwnerChain};
use taskfund_core::target::{Target, TargetKind};
use taskfund_core::types::DbId;

use crate::repositories::ExpertRepo;

/// Resolves who may view or change a node.
pub struct AccessRepo;

impl AccessRepo {
    /// Owner chain plus direct experts of a node, or `None` if the node does
    /// not exist.
    pub async fn node_access(pool: &PgPool, node: Target) -> Result<Option<NodeAccess>, sqlx::Error> {
        let Some(chain) = Self::owner_chain(pool, node).await? else {
            return Ok(None);
        };
        let experts = ExpertRepo::list_user_ids(pool, node).await?;
        Ok(Some(NodeAccess { chain, experts }))
    }

    /// Owners along the path from a node up to its project.
    pub async fn owner_chain(pool: &PgPool, node: Target) -> Result<Option<OwnerChain>, sqlx::Error> {
        match node.kind {
            TargetKind::Project => {
                let ceo: Option<DbId> =
                    sqlx::query_scalar("SELECT ceo_id FROM projects WHERE id = $1")
                        .bind(node.id)
                        .fetch_optional(pool)
                        .await?;
                Ok(ceo.map(|ceo_id| OwnerChain::Project { ceo_id }))
            }
            TargetKind::Task => {
                let row = sqlx::query_as::<_, (DbId, Option<DbId>)>(
                    "SELECT p.ceo_id, t.manager_id
                     FROM tasks t
                     JOIN projects p ON p.id = t.project_id
                     WHERE t.id = $1",
                )
                .bind(node.id)
                .fetch_optional(pool)
                .await?;
                Ok(row.map(|(ceo_id, manager_id)| OwnerChain::Task { ceo_id, manager_id }))
            }
            TargetKind::SubTask => {
                let row = sqlx::query_as::<_, (DbId, Option<DbId>, Option<DbId>)>(
                    "SELECT p.ceo_id, t.manager_id, s.manager_id
                     FROM subtasks s
                     JOIN tasks t ON t.id = s.task_id
                     JOIN projects p ON p.id = t.project_id
                     WHERE s.id = $1",
                )
                .bind(node.id)
                .fetch_optional(pool)
                .await?;
                Ok(row.map(|(ceo_id, task_manager_id, manager_id)| OwnerChain::SubTask {
                    ceo_id,
                    task_manager_id,
                    manager_id,
                }))
            }
        }
    }
}
