//! Polymorphic reference from a financial outcome to a node of the
//! project hierarchy.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Which table a [`Target`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Project,
    Task,
    #[serde(rename = "subtask")]
    SubTask,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Project => "project",
            TargetKind::Task => "task",
            TargetKind::SubTask => "subtask",
        }
    }

    /// Entity name used in not-found errors.
    pub fn entity(self) -> &'static str {
        match self {
            TargetKind::Project => "Project",
            TargetKind::Task => "Task",
            TargetKind::SubTask => "SubTask",
        }
    }

    /// Parse a model name from a URL segment. Case-insensitive.
    pub fn parse(model: &str) -> Result<Self, CoreError> {
        match model.to_ascii_lowercase().as_str() {
            "project" => Ok(TargetKind::Project),
            "task" => Ok(TargetKind::Task),
            "subtask" => Ok(TargetKind::SubTask),
            _ => Err(CoreError::Validation(format!("model {model} is not valid"))),
        }
    }
}

impl TryFrom<String> for TargetKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete node: kind plus row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub id: DbId,
}

impl Target {
    pub fn new(kind: TargetKind, id: DbId) -> Self {
        Self { kind, id }
    }

    pub fn not_found(self) -> CoreError {
        CoreError::NotFound {
            entity: self.kind.entity(),
            id: self.id,
        }
    }
}
