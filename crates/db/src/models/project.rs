//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskfund_core::error::CoreError;
use taskfund_core::schedule::DateRange;
use taskfund_core::status::{Category, WorkStatus};
use taskfund_core::types::{Date, DbId, Money, Timestamp};

use crate::models::user::UserProfile;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub ceo_id: DbId,
    pub description: String,
    pub image: String,
    pub category: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[sqlx(try_from = "String")]
    pub status: WorkStatus,
    pub budget: Option<Money>,
    pub completion_date: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn dates(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Parsed colour category. The column is nullable.
    pub fn category(&self) -> Result<Option<Category>, CoreError> {
        self.category.as_deref().map(Category::parse).transpose()
    }
}

/// A project together with its CEO and experts, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub ceo: Option<UserProfile>,
    pub experts: Vec<UserProfile>,
}

/// DTO for creating a new project. The CEO is the calling user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<Category>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: Option<WorkStatus>,
    pub budget: Option<Money>,
    /// Emails of existing users to attach as experts.
    #[serde(default)]
    pub experts: Vec<String>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<Category>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status: Option<WorkStatus>,
    pub budget: Option<Money>,
    /// Emails of users to add to the existing experts.
    #[serde(default)]
    pub experts: Vec<String>,
}
