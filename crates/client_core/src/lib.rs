use session::Session;
use shared::{
    domain::{Priority, Task, TaskId},
    protocol::{DragOutcome, TaskDraft, TaskPatch},
};
use tracing::{info, warn};

pub mod api;
pub mod error;

pub use api::{HttpTaskApi, TaskApi};
pub use error::ClientError;

/// Status dimension of a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

/// Priority dimension of a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

/// Criteria for the pure list projection. All three dimensions combine
/// with logical AND; the text match is a case-insensitive substring test
/// against title or description.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub text: Option<String>,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        let matches_text = match &self.text {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        };
        let matches_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        };
        let matches_priority = match self.priority {
            PriorityFilter::All => true,
            PriorityFilter::Only(priority) => task.priority == priority,
        };
        matches_text && matches_status && matches_priority
    }
}

/// Counters for the list header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Owns the in-memory ordered task collection for one session and keeps it
/// synchronized with the remote service. Every mutation is proposed locally
/// and confirmed remotely; the local copy is provisional until then. The
/// exception is `reorder`, which is optimistic and reconciles by re-fetch
/// on failure.
pub struct TaskListController<A: TaskApi> {
    api: A,
    session: Session,
    tasks: Vec<Task>,
}

impl<A: TaskApi> TaskListController<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetches the full list and replaces the in-memory collection. A
    /// failed fetch leaves the previous state untouched; there is no
    /// partial merge.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let fetched = self.api.list_tasks(&self.session).await.map_err(|err| {
            warn!("tasks: load failed: {err}");
            err
        })?;
        info!("tasks: loaded {} entries", fetched.len());
        self.tasks = fetched;
        Ok(())
    }

    /// Creates a task from a draft. The title must be non-empty after
    /// trimming; that is enforced here, before any network call. The
    /// created task is prepended; newest first is a display convention,
    /// not a position invariant.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<&Task, ClientError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ClientError::validation("title must not be empty"));
        }
        let draft = TaskDraft {
            title: title.to_string(),
            description: draft
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            priority: Some(draft.priority.unwrap_or_default()),
        };

        let task = self.api.create_task(&self.session, &draft).await?;
        self.tasks.insert(0, task);
        Ok(&self.tasks[0])
    }

    /// Sends a partial update; on success the matching entity is replaced
    /// with the remote's copy. A patch whose title is present but blank is
    /// rejected before any network call.
    pub async fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<(), ClientError> {
        if patch
            .title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
        {
            return Err(ClientError::validation("title must not be empty"));
        }
        if patch.is_empty() {
            return Err(ClientError::validation("patch has no fields to update"));
        }
        if !self.tasks.iter().any(|task| &task.id == id) {
            return Err(ClientError::validation(format!("unknown task id {id}")));
        }

        let updated = self.api.update_task(&self.session, id, &patch).await?;
        if let Some(slot) = self.tasks.iter_mut().find(|task| &task.id == id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Flips the completed flag of one task.
    pub async fn toggle_completed(&mut self, id: &TaskId) -> Result<(), ClientError> {
        let completed = self
            .tasks
            .iter()
            .find(|task| &task.id == id)
            .map(|task| task.completed)
            .ok_or_else(|| ClientError::validation(format!("unknown task id {id}")))?;
        self.update(
            id,
            TaskPatch {
                completed: Some(!completed),
                ..TaskPatch::default()
            },
        )
        .await
    }

    /// Deletes one task. Unknown ids are rejected locally; no unrelated
    /// entity is ever removed.
    pub async fn delete(&mut self, id: &TaskId) -> Result<(), ClientError> {
        if !self.tasks.iter().any(|task| &task.id == id) {
            return Err(ClientError::validation(format!("unknown task id {id}")));
        }
        self.api.delete_task(&self.session, id).await?;
        self.tasks.retain(|task| &task.id != id);
        Ok(())
    }

    /// Optimistic reorder. The new order is applied to the in-memory
    /// collection immediately so display reflects the drop, then the
    /// remote service is asked to persist it. If persistence fails the
    /// authoritative list is re-fetched; a local undo cannot guarantee
    /// consistency with whatever the server kept.
    pub async fn reorder(&mut self, new_order: &[TaskId]) -> Result<(), ClientError> {
        let reordered = self.permuted(new_order)?;
        self.tasks = reordered;

        if let Err(err) = self.api.reorder_tasks(&self.session, &self.tasks).await {
            warn!("tasks: reorder rejected, re-fetching authoritative order: {err}");
            if let Err(load_err) = self.load().await {
                warn!("tasks: reconciling load failed: {load_err}");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Translates a structured drag result into a reorder. A drop outside
    /// any slot (`destination: None`) is a no-op.
    pub async fn drag(&mut self, outcome: DragOutcome) -> Result<(), ClientError> {
        let Some(destination) = outcome.destination else {
            return Ok(());
        };
        let moved = self
            .tasks
            .get(outcome.source)
            .ok_or_else(|| {
                ClientError::validation(format!("drag source {} out of range", outcome.source))
            })?;
        if moved.id != outcome.task_id {
            return Err(ClientError::validation(format!(
                "drag id {} does not match item at index {}",
                outcome.task_id, outcome.source
            )));
        }
        if destination >= self.tasks.len() {
            return Err(ClientError::validation(format!(
                "drag destination {destination} out of range"
            )));
        }
        if destination == outcome.source {
            return Ok(());
        }

        let mut order: Vec<TaskId> = self.tasks.iter().map(|task| task.id.clone()).collect();
        let id = order.remove(outcome.source);
        order.insert(destination, id);
        self.reorder(&order).await
    }

    /// Pure projection over the in-memory collection; never mutates state.
    pub fn filter(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| filter.matches(task))
            .collect()
    }

    pub fn stats(&self) -> TaskStats {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        TaskStats {
            total: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    /// Rebuilds the collection in the proposed order, requiring the
    /// proposal to be a permutation of the current ids.
    fn permuted(&self, new_order: &[TaskId]) -> Result<Vec<Task>, ClientError> {
        if new_order.len() != self.tasks.len() {
            return Err(ClientError::validation(format!(
                "reorder lists {} ids but the collection holds {}",
                new_order.len(),
                self.tasks.len()
            )));
        }
        let mut remaining: Vec<Option<Task>> = self.tasks.iter().cloned().map(Some).collect();
        let mut reordered = Vec::with_capacity(self.tasks.len());
        for id in new_order {
            let index = self
                .tasks
                .iter()
                .position(|task| &task.id == id)
                .ok_or_else(|| ClientError::validation(format!("unknown task id {id}")))?;
            let task = remaining[index]
                .take()
                .ok_or_else(|| ClientError::validation(format!("duplicate task id {id}")))?;
            reordered.push(task);
        }
        Ok(reordered)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod api_tests;
