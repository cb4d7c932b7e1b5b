//! In-memory store for tests and examples.

use super::TaskStore;
use crate::error::{BoardError, Result};
use crate::types::{
    Attachment, NewTask, Project, ProjectId, Stage, Task, TaskId, TaskPatch, UserId,
};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

/// In-process [`TaskStore`].
///
/// Rows live in a mutex-guarded table. Per-task write failures can be
/// injected with [`fail_updates_for`](MemoryStore::fail_updates_for) to
/// exercise partial-batch behavior, and
/// [`update_calls`](MemoryStore::update_calls) counts every update attempt
/// (including the injected failures) so tests can assert that a batch was
/// fully issued.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    stages: Vec<Stage>,
    tasks: Vec<Task>,
    attachments: Vec<Attachment>,
    failing_tasks: HashSet<TaskId>,
    update_calls: u64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project row.
    pub async fn insert_project(&self, project: Project) {
        self.inner.lock().await.projects.push(project);
    }

    /// Seed a stage row.
    pub async fn insert_stage(&self, stage: Stage) {
        self.inner.lock().await.stages.push(stage);
    }

    /// Seed an attachment row.
    pub async fn insert_attachment(&self, attachment: Attachment) {
        self.inner.lock().await.attachments.push(attachment);
    }

    /// Make every update for `task` fail until cleared.
    pub async fn fail_updates_for(&self, task: TaskId) {
        self.inner.lock().await.failing_tasks.insert(task);
    }

    /// Stop failing updates for `task`.
    pub async fn clear_failure(&self, task: &TaskId) {
        self.inner.lock().await.failing_tasks.remove(task);
    }

    /// Number of update attempts received, including injected failures.
    pub async fn update_calls(&self) -> u64 {
        self.inner.lock().await.update_calls
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn fetch_project(&self, project: &ProjectId, owner: &UserId) -> Result<Project> {
        let inner = self.inner.lock().await;
        inner
            .projects
            .iter()
            .find(|p| &p.id == project && &p.owner == owner)
            .cloned()
            .ok_or_else(|| BoardError::ProjectNotFound {
                id: project.to_string(),
            })
    }

    async fn fetch_stages(&self, project: &ProjectId) -> Result<Vec<Stage>> {
        let inner = self.inner.lock().await;
        let mut stages: Vec<Stage> = inner
            .stages
            .iter()
            .filter(|s| &s.project == project)
            .cloned()
            .collect();
        stages.sort_by_key(|s| s.position);
        Ok(stages)
    }

    async fn fetch_tasks(&self, project: &ProjectId) -> Result<Vec<Task>> {
        let inner = self.inner.lock().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .iter()
            .filter(|t| &t.project == project)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.position);
        Ok(tasks)
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task> {
        let mut inner = self.inner.lock().await;
        let stored = Task {
            id: TaskId::new(),
            project: task.project,
            stage: task.stage,
            title: task.title,
            description_html: task.description_html,
            position: task.position,
            done: task.done,
        };
        inner.tasks.push(stored.clone());
        Ok(stored)
    }

    async fn update_task(&self, id: &TaskId, project: &ProjectId, patch: TaskPatch) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.update_calls += 1;

        if inner.failing_tasks.contains(id) {
            return Err(BoardError::backend(
                503,
                format!("injected write failure: {id}"),
            ));
        }

        let task = inner
            .tasks
            .iter_mut()
            .find(|t| &t.id == id && &t.project == project)
            .ok_or_else(|| BoardError::TaskNotFound { id: id.to_string() })?;

        patch.apply(task);
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId, project: &ProjectId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| !(&t.id == id && &t.project == project));
        if inner.tasks.len() == before {
            return Err(BoardError::TaskNotFound { id: id.to_string() });
        }
        // cascade, as the backend's schema does
        inner.attachments.retain(|a| &a.task != id);
        Ok(())
    }

    async fn fetch_attachments(&self, task: &TaskId) -> Result<Vec<Attachment>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .attachments
            .iter()
            .filter(|a| &a.task == task)
            .cloned()
            .collect())
    }
}
