use serde::{Deserialize, Serialize};

use crate::domain::{Priority, Task, TaskId, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Shape of both the login and register responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

/// Payload for creating a task. `title` must already be trimmed and
/// non-empty when this reaches the wire; the controller enforces that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Partial update; only the set fields go on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.position.is_none()
    }
}

/// Body of `PUT /todos/reorder`: the full list in its new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub todos: Vec<Task>,
}

/// Structured result of a completed drag gesture. `destination: None`
/// means the item was dropped outside any slot and nothing moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragOutcome {
    pub source: usize,
    pub destination: Option<usize>,
    pub task_id: TaskId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[test]
    fn task_follows_remote_wire_names() {
        let raw = r#"{
            "_id": "abc123",
            "user_id": 7,
            "title": "Buy milk",
            "priority": "high",
            "position": 2,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(task.id, TaskId("abc123".into()));
        assert_eq!(task.owner_id, UserId(7));
        assert_eq!(task.priority, Priority::High);
        assert!(!task.completed);
        assert!(task.description.is_none());
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        };
        let json = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(json, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn draft_defaults_leave_priority_to_remote() {
        let draft = TaskDraft::new("Buy milk");
        let json = serde_json::to_value(&draft).expect("serialize");
        assert_eq!(json, serde_json::json!({ "title": "Buy milk" }));
    }
}
