//! Permission and membership helpers shared by the hierarchy and
//! financials handlers.

use sqlx::PgPool;
use taskfund_core::access::NodeAccess;
use taskfund_core::hierarchy::{normalize_expert_emails, reject_existing_experts, unknown_user};
use taskfund_core::target::Target;
use taskfund_core::types::DbId;
use taskfund_db::models::user::User;
use taskfund_db::repositories::{AccessRepo, ExpertRepo, UserRepo};

use crate::error::{AppError, AppResult};

/// Load the access rules of a node, or 404 if it does not exist.
pub async fn node_access(pool: &PgPool, node: Target) -> AppResult<NodeAccess> {
    AccessRepo::node_access(pool, node)
        .await?
        .ok_or_else(|| AppError::Core(node.not_found()))
}

/// Require the user to be allowed to view the node.
pub async fn require_view(pool: &PgPool, node: Target, user_id: DbId) -> AppResult<NodeAccess> {
    let access = node_access(pool, node).await?;
    access.require_view(user_id)?;
    Ok(access)
}

/// Require the user to be allowed to change the node.
pub async fn require_change(pool: &PgPool, node: Target, user_id: DbId) -> AppResult<NodeAccess> {
    let access = node_access(pool, node).await?;
    access.require_change(user_id)?;
    Ok(access)
}

/// Look up the users behind a list of expert emails. Every email must
/// belong to a registered user.
pub async fn resolve_experts(pool: &PgPool, emails: &[String]) -> AppResult<Vec<User>> {
    let emails = normalize_expert_emails(emails)?;
    if emails.is_empty() {
        return Ok(Vec::new());
    }
    let users = UserRepo::find_by_emails(pool, &emails).await?;
    if let Some(missing) = emails.iter().find(|e| !users.iter().any(|u| &u.email == *e)) {
        return Err(AppError::Core(unknown_user(missing)));
    }
    Ok(users)
}

/// Resolve emails to add as experts of an existing node. Emails that are
/// already experts are rejected.
pub async fn resolve_new_experts(
    pool: &PgPool,
    node: Target,
    emails: &[String],
) -> AppResult<Vec<DbId>> {
    if emails.is_empty() {
        return Ok(Vec::new());
    }
    let requested = normalize_expert_emails(emails)?;
    let existing: Vec<String> = ExpertRepo::list_users(pool, node)
        .await?
        .into_iter()
        .map(|u| u.email)
        .collect();
    reject_existing_experts(&requested, &existing)?;

    let users = resolve_experts(pool, &requested).await?;
    Ok(users.into_iter().map(|u| u.id).collect())
}

/// Resolve a manager email to a user id.
pub async fn resolve_manager(pool: &PgPool, email: &str) -> AppResult<DbId> {
    let email = taskfund_core::accounts::normalize_email(email);
    UserRepo::find_by_email(pool, &email)
        .await?
        .map(|u| u.id)
        .ok_or_else(|| AppError::Core(unknown_user(&email)))
}
