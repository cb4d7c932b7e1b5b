//! Board session: the per-project state a board view drives.
//!
//! A session is created when the user navigates to a project and dropped
//! when they navigate away; it owns the project's stages, the task list,
//! and the drag-gesture tracker. All reads of board state go through the
//! session, and every mutation ends with a refresh from the store, so the
//! displayed board always converges to actual backend state, including
//! after concurrent edits from another tab or user, which are resolved by
//! the refresh overwriting local state.

use crate::error::{BoardError, Result};
use crate::gesture::DragGesture;
use crate::reorder::{
    build_position_updates, compute_drop_index, persist_position_updates, CardRect,
};
use crate::richtext;
use crate::store::TaskStore;
use crate::types::{NewTask, Project, ProjectId, Stage, StageId, Task, TaskId, TaskPatch, UserId};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Open/done/stage counts for the project header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSummary {
    pub open_tasks: usize,
    pub done_tasks: usize,
    pub stages: usize,
}

/// Outcome of committing a drop, reported after the unconditional refresh.
#[derive(Debug)]
pub struct DropOutcome {
    /// Rows the commit attempted to write; zero when the drop changed
    /// nothing (same slot, or the card vanished under the pointer).
    pub attempted: usize,
    /// The persistence failure, if any row write failed. The refresh has
    /// already run either way; surface this as a notification and move on.
    pub failure: Option<BoardError>,
}

/// Per-project board state.
pub struct BoardSession {
    store: Arc<dyn TaskStore>,
    project: Project,
    stages: Vec<Stage>,
    tasks: Vec<Task>,
    gesture: DragGesture,
}

impl std::fmt::Debug for BoardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardSession")
            .field("project", &self.project)
            .field("stages", &self.stages)
            .field("tasks", &self.tasks)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

impl BoardSession {
    /// Open a session: fetch the project (owner-scoped), its stages and its
    /// tasks. Stages and project metadata are fetched once per session;
    /// tasks are re-fetched on every refresh.
    pub async fn open(
        store: Arc<dyn TaskStore>,
        project: &ProjectId,
        owner: &UserId,
    ) -> Result<Self> {
        let project = store.fetch_project(project, owner).await?;
        let stages = store.fetch_stages(&project.id).await?;
        let tasks = store.fetch_tasks(&project.id).await?;
        debug!(
            project = %project.id,
            stages = stages.len(),
            tasks = tasks.len(),
            "board session opened"
        );
        Ok(Self {
            store,
            project,
            stages,
            tasks,
            gesture: DragGesture::new(),
        })
    }

    /// Tear the session down (navigating away from the project).
    pub fn close(self) {
        debug!(project = %self.project.id, "board session closed");
    }

    /// The project this session displays.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Stages, ordered by position.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// All tasks for the project, as last fetched.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// The tasks of one stage, ordered by position.
    pub fn tasks_in_stage(&self, stage: &StageId) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| &t.stage == stage).collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    /// Header counts for the project info table.
    pub fn summary(&self) -> BoardSummary {
        let done_tasks = self.tasks.iter().filter(|t| t.done).count();
        BoardSummary {
            open_tasks: self.tasks.len() - done_tasks,
            done_tasks,
            stages: self.stages.len(),
        }
    }

    /// The gesture tracker (click suppression checks and phase queries).
    pub fn gesture(&self) -> &DragGesture {
        &self.gesture
    }

    /// Re-fetch the task list from the store.
    pub async fn refresh(&mut self) -> Result<()> {
        self.tasks = self.store.fetch_tasks(&self.project.id).await?;
        Ok(())
    }

    // =========================================================================
    // Drag gesture
    // =========================================================================

    /// A card was picked up.
    pub fn drag_start(&mut self, task: TaskId) {
        self.gesture.drag_start(task);
    }

    /// Preview index for the pointer hovering a stage's rendered cards.
    /// Returns `None` when no drag is in flight. The preview only moves
    /// rendered cards around; nothing persists until the drop.
    pub fn preview_drop_index(&self, cards: &[CardRect], pointer_y: f64) -> Option<usize> {
        if !self.gesture.is_dragging() {
            return None;
        }
        Some(compute_drop_index(cards, pointer_y))
    }

    /// The drag ended without a valid drop. No persistence; the preview is
    /// discarded by the caller's re-render.
    pub fn cancel_drag(&mut self) {
        self.gesture.cancel();
    }

    /// Whether a click arriving now is the browser's post-drop synthetic
    /// click and should not open the task editor.
    pub fn click_suppressed(&self) -> bool {
        self.gesture.click_suppressed(Instant::now())
    }

    /// The dragged card was dropped at `target_index` within `target_stage`.
    ///
    /// Computes the minimal update set, persists it as a concurrent batch,
    /// then refreshes the task list from the store regardless of the batch
    /// outcome. A persistence failure comes back in [`DropOutcome::failure`]
    /// for the caller to surface; a refresh failure is returned as
    /// `Err(BoardError::Refresh)` since the board can no longer be trusted.
    pub async fn commit_drop(
        &mut self,
        target_stage: &StageId,
        target_index: usize,
    ) -> Result<DropOutcome> {
        let Some(task) = self.gesture.begin_commit() else {
            return Ok(DropOutcome {
                attempted: 0,
                failure: None,
            });
        };

        let updates =
            build_position_updates(&self.tasks, &self.stages, &task, target_stage, target_index);
        let attempted = updates.len();
        debug!(task = %task, stage = %target_stage, attempted, "committing drop");

        let failure = persist_position_updates(self.store.as_ref(), &self.project.id, &updates)
            .await
            .err();
        if let Some(err) = &failure {
            warn!(task = %task, "drop commit failed: {err}");
        }

        self.gesture.finish_commit(Instant::now());

        self.refresh().await.map_err(BoardError::refresh)?;

        Ok(DropOutcome { attempted, failure })
    }

    // =========================================================================
    // Task CRUD
    // =========================================================================

    /// Create a task at the end of `stage`. The description is taken as
    /// editor plain text and stored in rich-text form.
    pub async fn create_task(
        &mut self,
        stage: &StageId,
        title: &str,
        description: &str,
    ) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::missing_field("title"));
        }
        let stage = self
            .stages
            .iter()
            .find(|s| &s.id == stage)
            .ok_or_else(|| BoardError::StageNotFound {
                id: stage.to_string(),
            })?;

        let task = self
            .store
            .insert_task(NewTask {
                project: self.project.id.clone(),
                stage: stage.id.clone(),
                title: title.to_string(),
                description_html: richtext::text_to_html(description),
                position: self.next_position(&stage.id),
                done: stage.kind.is_done(),
            })
            .await?;

        self.refresh().await?;
        Ok(task)
    }

    /// Edit a task's title and description.
    pub async fn edit_task(&mut self, id: &TaskId, title: &str, description: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::missing_field("title"));
        }

        let patch = TaskPatch::new()
            .with_title(title)
            .with_description_html(richtext::text_to_html(description))
            .with_updated_at(Utc::now());
        self.store
            .update_task(id, &self.project.id, patch)
            .await?;

        self.refresh().await
    }

    /// Explicitly toggle a task's done flag without moving it.
    pub async fn set_task_done(&mut self, id: &TaskId, done: bool) -> Result<()> {
        let patch = TaskPatch::new().with_done(done).with_updated_at(Utc::now());
        self.store
            .update_task(id, &self.project.id, patch)
            .await?;
        self.refresh().await
    }

    /// Delete a task. The store cascades the task's attachments.
    pub async fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        self.store.delete_task(id, &self.project.id).await?;
        self.refresh().await
    }

    /// Next free 1-based position in a stage. Uses max+1 rather than
    /// count+1 so a transient gap never produces a duplicate.
    fn next_position(&self, stage: &StageId) -> u32 {
        self.tasks
            .iter()
            .filter(|t| &t.stage == stage)
            .map(|t| t.position)
            .max()
            .map_or(1, |p| p + 1)
    }
}
