//! Drag-gesture state machine.
//!
//! One gesture runs from pick-up to drop or cancellation:
//!
//! ```text
//! Idle --drag_start--> Dragging --begin_commit--> Committing --finish_commit--> Idle
//!   ^                      |
//!   +------cancel----------+        (dragend without a drop, or a drop
//!                                    outside any valid stage target)
//! ```
//!
//! While `Dragging`, only the visual preview changes; nothing persists.
//! `finish_commit` opens a short suppression window for the synthetic click
//! browsers fire right after a drop, so the drop is not misread as "open
//! the task editor". Time is passed in explicitly to keep the machine
//! testable.

use crate::types::TaskId;
use std::time::{Duration, Instant};

/// Default length of the post-commit click suppression window.
pub const DEFAULT_CLICK_SUPPRESSION: Duration = Duration::from_millis(300);

/// Phase of the current gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GesturePhase {
    /// No drag in flight.
    Idle,
    /// A card is being dragged; only the preview moves.
    Dragging { task: TaskId },
    /// The drop landed and its update batch is being persisted.
    Committing { task: TaskId },
}

/// Tracks one drag-and-drop gesture at a time.
#[derive(Debug)]
pub struct DragGesture {
    phase: GesturePhase,
    suppression: Duration,
    suppress_clicks_until: Option<Instant>,
}

impl DragGesture {
    /// Create an idle gesture tracker with the default suppression window.
    pub fn new() -> Self {
        Self::with_suppression(DEFAULT_CLICK_SUPPRESSION)
    }

    /// Create an idle gesture tracker with a custom suppression window.
    pub fn with_suppression(suppression: Duration) -> Self {
        Self {
            phase: GesturePhase::Idle,
            suppression,
            suppress_clicks_until: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &GesturePhase {
        &self.phase
    }

    /// The task being dragged or committed, if any.
    pub fn active_task(&self) -> Option<&TaskId> {
        match &self.phase {
            GesturePhase::Idle => None,
            GesturePhase::Dragging { task } | GesturePhase::Committing { task } => Some(task),
        }
    }

    /// Whether a drag is in flight (preview updates apply).
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging { .. })
    }

    /// A card was picked up. Starting a new drag while a previous commit is
    /// still persisting is allowed; the in-flight commit runs to completion
    /// on the state it already captured.
    pub fn drag_start(&mut self, task: TaskId) {
        self.phase = GesturePhase::Dragging { task };
    }

    /// The card was dropped on a valid stage target. Returns the task to
    /// commit, or `None` when no drag was in flight (a stray drop event).
    pub fn begin_commit(&mut self) -> Option<TaskId> {
        match &self.phase {
            GesturePhase::Dragging { task } => {
                let task = task.clone();
                self.phase = GesturePhase::Committing { task: task.clone() };
                Some(task)
            }
            _ => None,
        }
    }

    /// The commit resolved (success or failure). Returns to idle and opens
    /// the click suppression window. A new drag that started while the
    /// commit was persisting is left in place.
    pub fn finish_commit(&mut self, now: Instant) {
        if matches!(self.phase, GesturePhase::Committing { .. }) {
            self.phase = GesturePhase::Idle;
        }
        self.suppress_clicks_until = Some(now + self.suppression);
    }

    /// The drag ended without a drop, or the drop missed every valid
    /// target. Nothing persists; the preview is discarded by the caller's
    /// re-render.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            self.phase = GesturePhase::Idle;
        }
    }

    /// Whether a click arriving at `now` should be swallowed as the
    /// browser's post-drop synthetic click.
    pub fn click_suppressed(&self, now: Instant) -> bool {
        self.suppress_clicks_until
            .is_some_and(|until| now < until)
    }
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new()
    }
}
