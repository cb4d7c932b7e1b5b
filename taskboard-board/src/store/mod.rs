//! Persistence seam between the board engine and its backend.
//!
//! The engine never talks to a concrete backend directly; it goes through
//! [`TaskStore`], which exposes the handful of row operations the board
//! needs. Every mutating call is scoped by the owning project id, so a
//! stale or foreign task id cannot write across project boundaries.

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::{RestConfig, RestStore};

use crate::error::Result;
use crate::types::{Attachment, NewTask, Project, ProjectId, Stage, Task, TaskId, TaskPatch, UserId};
use async_trait::async_trait;

/// Row operations the board engine needs from a backend.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetch a project by id, scoped to its owner.
    async fn fetch_project(&self, project: &ProjectId, owner: &UserId) -> Result<Project>;

    /// Fetch a project's stages, ordered by ascending position.
    async fn fetch_stages(&self, project: &ProjectId) -> Result<Vec<Stage>>;

    /// Fetch a project's tasks, ordered by ascending position.
    async fn fetch_tasks(&self, project: &ProjectId) -> Result<Vec<Task>>;

    /// Insert a new task and return the stored record.
    async fn insert_task(&self, task: NewTask) -> Result<Task>;

    /// Apply a field patch to a task, guarded by the owning project id.
    async fn update_task(&self, id: &TaskId, project: &ProjectId, patch: TaskPatch) -> Result<()>;

    /// Delete a task, guarded by the owning project id. The task's
    /// attachments are deleted with it.
    async fn delete_task(&self, id: &TaskId, project: &ProjectId) -> Result<()>;

    /// Fetch the attachment records for a task.
    async fn fetch_attachments(&self, task: &TaskId) -> Result<Vec<Attachment>>;
}
