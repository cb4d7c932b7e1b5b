//! Stage types: a stage is a named column on a project's board.

use super::ids::{ProjectId, StageId};
use serde::{Deserialize, Serialize};

/// What a stage means for the tasks sitting in it.
///
/// A task's `done` flag is derived from the kind of its current stage, so
/// the classification is an explicit attribute rather than a guess from the
/// stage title. Rows written by older clients carry no kind; those fall
/// back to title inference on load (see [`StageKind::infer_from_title`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Work that has not started.
    Backlog,
    /// Work in flight.
    Active,
    /// Completed work; tasks here carry `done = true`.
    Done,
}

impl StageKind {
    /// Infer a kind from a stage title, for rows that predate the explicit
    /// attribute. Any title containing "done" (case-insensitive) counts as
    /// a completion stage; everything else is treated as active.
    pub fn infer_from_title(title: &str) -> Self {
        if title.to_lowercase().contains("done") {
            Self::Done
        } else {
            Self::Active
        }
    }

    /// Whether tasks in a stage of this kind are considered completed.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// A stage on a project board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub project: ProjectId,
    pub title: String,
    /// Ordinal among the project's stages. Not required to be contiguous.
    pub position: u32,
    pub kind: StageKind,
}

impl Stage {
    /// Create a new stage.
    pub fn new(
        project: ProjectId,
        title: impl Into<String>,
        position: u32,
        kind: StageKind,
    ) -> Self {
        Self {
            id: StageId::new(),
            project,
            title: title.into(),
            position,
            kind,
        }
    }

    /// Reconstruct a stage from a backend row. Rows that predate the
    /// explicit kind attribute get their kind inferred from the title.
    pub fn from_row(
        id: StageId,
        project: ProjectId,
        title: String,
        position: u32,
        kind: Option<StageKind>,
    ) -> Self {
        let kind = kind.unwrap_or_else(|| StageKind::infer_from_title(&title));
        Self {
            id,
            project,
            title,
            position,
            kind,
        }
    }

    /// Whether tasks in this stage are considered completed.
    pub fn is_done_stage(&self) -> bool {
        self.kind.is_done()
    }
}
