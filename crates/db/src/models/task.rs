//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskfund_core::schedule::DateRange;
use taskfund_core::status::WorkStatus;
use taskfund_core::types::{Date, DbId, Money, Timestamp};

use crate::models::user::UserProfile;

/// A task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub manager_id: Option<DbId>,
    pub title: String,
    pub description: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[sqlx(try_from = "String")]
    pub status: WorkStatus,
    pub budget: Option<Money>,
    pub completion_date: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    pub fn dates(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// A task with its manager and experts resolved.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub manager: Option<UserProfile>,
    pub experts: Vec<UserProfile>,
}

/// DTO for creating a task under a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    /// Email of the managing user. Defaults to the caller.
    pub manager: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: Option<WorkStatus>,
    pub budget: Option<Money>,
    #[serde(default)]
    pub experts: Vec<String>,
}

/// DTO for updating a task. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Email of a new managing user.
    pub manager: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: Option<WorkStatus>,
    pub budget: Option<Money>,
    #[serde(default)]
    pub experts: Vec<String>,
}
