//! SubTask entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskfund_core::schedule::DateRange;
use taskfund_core::status::WorkStatus;
use taskfund_core::types::{Date, DbId, Money, Timestamp};

use crate::models::user::UserProfile;

/// A subtask row from the `subtasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubTask {
    pub id: DbId,
    pub task_id: DbId,
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

impl SubTask {
    pub fn dates(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// A subtask with its manager and experts resolved.
#[derive(Debug, Clone, Serialize)]
pub struct SubTaskDetail {
    #[serde(flatten)]
    pub subtask: SubTask,
    pub manager: Option<UserProfile>,
    pub experts: Vec<UserProfile>,
}

/// DTO for creating a subtask under a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubTask {
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

/// DTO for updating a subtask. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubTask {
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
