//! Task types: Task, NewTask, TaskPatch, Attachment

use super::ids::{AttachmentId, ProjectId, StageId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task card on the board.
///
/// A task belongs to exactly one project and exactly one stage; `position`
/// is its 1-based rank within that stage, unique per stage and dense after
/// every successful reorder. `done` tracks whether the task sits in a
/// completion stage, except where the user toggled it explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project: ProjectId,
    pub stage: StageId,
    pub title: String,
    /// Stored rich-text body (escaped HTML, see [`crate::richtext`]).
    #[serde(default)]
    pub description_html: String,
    /// 1-based rank within the stage.
    pub position: u32,
    pub done: bool,
}

impl Task {
    /// Create a new task at the given position.
    pub fn new(
        project: ProjectId,
        stage: StageId,
        title: impl Into<String>,
        position: u32,
        done: bool,
    ) -> Self {
        Self {
            id: TaskId::new(),
            project,
            stage,
            title: title.into(),
            description_html: String::new(),
            position,
            done,
        }
    }

    /// Set the stored description.
    pub fn with_description_html(mut self, html: impl Into<String>) -> Self {
        self.description_html = html.into();
        self
    }
}

/// A task about to be inserted; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub project: ProjectId,
    pub stage: StageId,
    pub title: String,
    #[serde(default)]
    pub description_html: String,
    pub position: u32,
    pub done: bool,
}

/// Field-level patch applied through a store's update operation.
///
/// `None` fields are left untouched. Built with the `with_*` methods so a
/// patch only ever names the fields it actually changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the stored description.
    pub fn with_description_html(mut self, html: impl Into<String>) -> Self {
        self.description_html = Some(html.into());
        self
    }

    /// Move the task to a stage.
    pub fn with_stage(mut self, stage: StageId) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Set the 1-based position.
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the done flag.
    pub fn with_done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    /// Stamp the modification time.
    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description_html.is_none()
            && self.stage.is_none()
            && self.position.is_none()
            && self.done.is_none()
    }

    /// Apply the patch to a task in place.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(html) = &self.description_html {
            task.description_html = html.clone();
        }
        if let Some(stage) = &self.stage {
            task.stage = stage.clone();
        }
        if let Some(position) = self.position {
            task.position = position;
        }
        if let Some(done) = self.done {
            task.done = done;
        }
    }
}

/// A file attached to a task.
///
/// The blob itself lives in the backend's object storage; this record
/// carries the storage reference and file metadata. Attachments are deleted
/// with their task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: AttachmentId,
    pub task: TaskId,
    pub name: String,
    pub storage_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<UserId>,
}

impl Attachment {
    /// Create a new attachment record.
    pub fn new(task: TaskId, name: impl Into<String>, storage_path: impl Into<String>) -> Self {
        Self {
            id: AttachmentId::new(),
            task,
            name: name.into(),
            storage_path: storage_path.into(),
            mime_type: None,
            size: None,
            uploaded_by: None,
        }
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the file size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the uploading user.
    pub fn with_uploaded_by(mut self, user: UserId) -> Self {
        self.uploaded_by = Some(user);
        self
    }
}
