//! Task authorization policy.
//!
//! Pure decision logic over `(actor, task)` pairs. The policy only ever
//! decides "forbidden or not"; whether the task exists at all is the
//! caller's concern and is checked before any of these functions run.
//!
//! Rules:
//! * read: any authenticated actor may read any task.
//! * update (fields other than status): creator only.
//! * update status: creator or current assignee; any status may follow any
//!   other.
//! * assign: creator only (target existence is checked by the service).
//! * delete: creator only.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::Task;

/// Any authenticated actor may read any task.
pub fn can_read(_actor: Uuid, _task: &Task) -> bool {
    true
}

/// Fields other than status may only be changed by the task's creator.
pub fn can_update(actor: Uuid, task: &Task) -> bool {
    task.created_by == actor
}

/// Status may be changed by the creator or the current assignee.
pub fn can_update_status(actor: Uuid, task: &Task) -> bool {
    task.created_by == actor || task.assigned_to == Some(actor)
}

/// Only the creator may assign the task. Assigning to themself is permitted.
pub fn can_assign(actor: Uuid, task: &Task) -> bool {
    task.created_by == actor
}

/// Only the creator may delete the task.
pub fn can_delete(actor: Uuid, task: &Task) -> bool {
    task.created_by == actor
}

pub fn authorize_update(actor: Uuid, task: &Task) -> Result<(), AppError> {
    if can_update(actor, task) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not allowed to update this task".into(),
        ))
    }
}

pub fn authorize_status_update(actor: Uuid, task: &Task) -> Result<(), AppError> {
    if can_update_status(actor, task) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the task author or assignee is allowed to update the status".into(),
        ))
    }
}

pub fn authorize_assign(actor: Uuid, task: &Task) -> Result<(), AppError> {
    if can_assign(actor, task) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not allowed to assign this task".into(),
        ))
    }
}

pub fn authorize_delete(actor: Uuid, task: &Task) -> Result<(), AppError> {
    if can_delete(actor, task) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not allowed to delete this task".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn task(created_by: Uuid, assigned_to: Option<Uuid>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Test Task".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            created_by,
            assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_any_actor_can_read() {
        let creator = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let task = task(creator, None);
        assert!(can_read(creator, &task));
        assert!(can_read(stranger, &task));
    }

    #[test]
    fn test_only_creator_can_update_fields() {
        let creator = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let task = task(creator, Some(assignee));

        assert!(can_update(creator, &task));
        // Assignment grants status rights only, not general update rights.
        assert!(!can_update(assignee, &task));
        assert!(!can_update(stranger, &task));

        assert!(matches!(
            authorize_update(stranger, &task),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_creator_or_assignee_can_update_status() {
        let creator = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let task = task(creator, Some(assignee));

        assert!(can_update_status(creator, &task));
        assert!(can_update_status(assignee, &task));
        assert!(!can_update_status(stranger, &task));
    }

    #[test]
    fn test_unassigned_task_status_is_creator_only() {
        let creator = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let task = task(creator, None);

        assert!(can_update_status(creator, &task));
        assert!(!can_update_status(stranger, &task));
        assert!(matches!(
            authorize_status_update(stranger, &task),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_only_creator_can_assign_and_delete() {
        let creator = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let task = task(creator, Some(assignee));

        assert!(can_assign(creator, &task));
        assert!(!can_assign(assignee, &task));
        assert!(can_delete(creator, &task));
        assert!(!can_delete(assignee, &task));

        assert!(authorize_assign(creator, &task).is_ok());
        assert!(matches!(
            authorize_delete(assignee, &task),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_status_rights_follow_reassignment() {
        let creator = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut task = task(creator, Some(first));

        assert!(can_update_status(first, &task));
        task.assigned_to = Some(second);
        assert!(!can_update_status(first, &task));
        assert!(can_update_status(second, &task));
    }
}
