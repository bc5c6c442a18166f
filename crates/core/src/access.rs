//! Object-level permission rules for the project hierarchy.
//!
//! The CEO of a project holds every right over the project and everything
//! below it. A manager holds change rights over their own task or subtask;
//! a task manager additionally over the task's subtasks. Experts may only
//! view the node they were added to.

use crate::error::CoreError;
use crate::types::DbId;

/// The owners along the path from a node up to its project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerChain {
    Project {
        ceo_id: DbId,
    },
    Task {
        ceo_id: DbId,
        manager_id: Option<DbId>,
    },
    SubTask {
        ceo_id: DbId,
        task_manager_id: Option<DbId>,
        manager_id: Option<DbId>,
    },
}

impl OwnerChain {
    pub fn ceo_id(&self) -> DbId {
        match self {
            OwnerChain::Project { ceo_id }
            | OwnerChain::Task { ceo_id, .. }
            | OwnerChain::SubTask { ceo_id, .. } => *ceo_id,
        }
    }

    /// Whether `user_id` may modify the node: update, delete, complete it,
    /// create children under it, and manage its financial records.
    pub fn can_change(&self, user_id: DbId) -> bool {
        match self {
            OwnerChain::Project { ceo_id } => *ceo_id == user_id,
            OwnerChain::Task { ceo_id, manager_id } => {
                *ceo_id == user_id || *manager_id == Some(user_id)
            }
            OwnerChain::SubTask {
                ceo_id,
                task_manager_id,
                manager_id,
            } => {
                *ceo_id == user_id
                    || *task_manager_id == Some(user_id)
                    || *manager_id == Some(user_id)
            }
        }
    }
}

/// Everything needed to decide access to one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAccess {
    pub chain: OwnerChain,
    /// Experts attached directly to this node.
    pub experts: Vec<DbId>,
}

impl NodeAccess {
    pub fn can_view(&self, user_id: DbId) -> bool {
        self.chain.can_change(user_id) || self.experts.contains(&user_id)
    }

    pub fn can_change(&self, user_id: DbId) -> bool {
        self.chain.can_change(user_id)
    }

    pub fn require_view(&self, user_id: DbId) -> Result<(), CoreError> {
        if self.can_view(user_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "You do not have permission to view this record".into(),
            ))
        }
    }

    pub fn require_change(&self, user_id: DbId) -> Result<(), CoreError> {
        if self.can_change(user_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "You do not have permission to perform this action".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CEO: DbId = 1;
    const TASK_MANAGER: DbId = 2;
    const SUB_MANAGER: DbId = 3;
    const EXPERT: DbId = 4;
    const STRANGER: DbId = 5;

    fn subtask() -> NodeAccess {
        NodeAccess {
            chain: OwnerChain::SubTask {
                ceo_id: CEO,
                task_manager_id: Some(TASK_MANAGER),
                manager_id: Some(SUB_MANAGER),
            },
            experts: vec![EXPERT],
        }
    }

    #[test]
    fn project_is_changed_only_by_ceo() {
        let access = NodeAccess {
            chain: OwnerChain::Project { ceo_id: CEO },
            experts: vec![EXPERT],
        };
        assert!(access.can_change(CEO));
        assert!(!access.can_change(EXPERT));
        assert!(access.can_view(EXPERT));
        assert!(!access.can_view(STRANGER));
    }

    #[test]
    fn task_manager_and_ceo_change_task() {
        let access = NodeAccess {
            chain: OwnerChain::Task {
                ceo_id: CEO,
                manager_id: Some(TASK_MANAGER),
            },
            experts: vec![],
        };
        assert!(access.can_change(CEO));
        assert!(access.can_change(TASK_MANAGER));
        assert!(!access.can_change(SUB_MANAGER));
    }

    #[test]
    fn subtask_rights_flow_down_the_chain() {
        let access = subtask();
        for user in [CEO, TASK_MANAGER, SUB_MANAGER] {
            assert!(access.can_change(user), "user {user} should change");
        }
        assert!(!access.can_change(EXPERT));
        assert!(access.can_view(EXPERT));
        assert!(access.require_view(STRANGER).is_err());
    }

    #[test]
    fn unassigned_manager_grants_nothing() {
        let chain = OwnerChain::Task {
            ceo_id: CEO,
            manager_id: None,
        };
        assert!(!chain.can_change(STRANGER));
        assert_eq!(chain.ceo_id(), CEO);
    }
}
