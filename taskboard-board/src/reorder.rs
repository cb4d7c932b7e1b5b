//! Board reordering: drop-index geometry, the position diff, and the
//! persistence batch.
//!
//! A drag gesture ends in three steps: find where the card landed
//! ([`compute_drop_index`]), work out the minimal set of rows whose
//! stage/position/done must change ([`build_position_updates`]), and write
//! those rows concurrently ([`persist_position_updates`]). The live preview
//! during the drag uses the same index definition but never persists; the
//! diff is recomputed from the in-memory task list at drop time so the
//! preview and the persisted result cannot diverge.
//!
//! The diff walks at most two lists once each: the destination stage with
//! the moved task inserted, and (for a cross-stage move) the source stage
//! with it removed, assigning dense 1-based positions as it goes. Only
//! tasks whose `(stage, position, done)` triple actually changed are
//! emitted, so dropping a card back into its own slot writes nothing.

use crate::error::{BoardError, Result};
use crate::store::TaskStore;
use crate::types::{ProjectId, Stage, StageId, Task, TaskId, TaskPatch};
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn};

/// Rendered bounds of one task card in the hovered stage, in the same
/// vertical coordinate space as the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub top: f64,
    pub height: f64,
}

impl CardRect {
    /// Create a card rect.
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Vertical midpoint of the card.
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Insertion index for a pointer hovering over a stage's card list.
///
/// `cards` is the ordered sequence of currently-displayed cards in the
/// hovered stage, with the dragged card already excluded. Returns the index
/// of the first card whose midpoint lies at or below the pointer (the
/// dragged card lands immediately before it), or `cards.len()` when the
/// pointer is below every midpoint (append at end).
pub fn compute_drop_index(cards: &[CardRect], pointer_y: f64) -> usize {
    cards
        .iter()
        .position(|card| pointer_y <= card.midpoint())
        .unwrap_or(cards.len())
}

/// One row write produced by [`build_position_updates`]: a task's new
/// stage, 1-based position, and done flag.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub id: TaskId,
    pub stage: StageId,
    pub position: u32,
    pub done: bool,
}

impl PositionUpdate {
    /// The store patch for this update, stamped with the current time.
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch::new()
            .with_stage(self.stage.clone())
            .with_position(self.position)
            .with_done(self.done)
            .with_updated_at(Utc::now())
    }
}

/// Compute the minimal update set for moving `task_id` to `target_index`
/// within `target_stage`.
///
/// `target_index` is a 0-based insertion point into the destination stage's
/// task list ordered by current position (the moving task excluded if it is
/// already there); out-of-range values clamp to the end. The moved task's
/// `done` flag is recomputed from the destination stage's kind. After the
/// walk, the destination stage's positions are exactly `1..=N`, and so are
/// the source stage's when the move crossed stages.
///
/// A task or stage that no longer exists in the given lists yields an empty
/// update set: the card may have been removed by a concurrent refresh, and
/// a stale gesture is a no-op rather than an error.
pub fn build_position_updates(
    tasks: &[Task],
    stages: &[Stage],
    task_id: &TaskId,
    target_stage: &StageId,
    target_index: usize,
) -> Vec<PositionUpdate> {
    let Some(moving) = tasks.iter().find(|t| &t.id == task_id) else {
        return Vec::new();
    };
    let Some(dest_stage) = stages.iter().find(|s| &s.id == target_stage) else {
        return Vec::new();
    };

    let source_stage = moving.stage.clone();
    let moved_done = dest_stage.kind.is_done();

    let mut destination: Vec<&Task> = tasks
        .iter()
        .filter(|t| &t.stage == target_stage && &t.id != task_id)
        .collect();
    destination.sort_by_key(|t| t.position);

    let index = target_index.min(destination.len());
    destination.insert(index, moving);

    let mut updates = Vec::new();
    for (i, task) in destination.iter().enumerate() {
        let position = (i + 1) as u32;
        let done = if task.id == moving.id {
            moved_done
        } else {
            task.done
        };
        if task.stage != *target_stage || task.position != position || task.done != done {
            updates.push(PositionUpdate {
                id: task.id.clone(),
                stage: target_stage.clone(),
                position,
                done,
            });
        }
    }

    if source_stage != *target_stage {
        let mut remaining: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.stage == source_stage && &t.id != task_id)
            .collect();
        remaining.sort_by_key(|t| t.position);

        for (i, task) in remaining.iter().enumerate() {
            let position = (i + 1) as u32;
            if task.position != position {
                updates.push(PositionUpdate {
                    id: task.id.clone(),
                    stage: task.stage.clone(),
                    position,
                    done: task.done,
                });
            }
        }
    }

    updates
}

/// Persist a batch of position updates, one scoped call per record, all
/// issued concurrently.
///
/// On failure the first error in record order wins; writes that already
/// landed are not rolled back. The caller's contract is to refresh from the
/// store afterward regardless of outcome, so the board converges to actual
/// backend state either way.
pub async fn persist_position_updates(
    store: &dyn TaskStore,
    project: &ProjectId,
    updates: &[PositionUpdate],
) -> Result<()> {
    if updates.is_empty() {
        return Ok(());
    }

    debug!(count = updates.len(), "persisting position batch");
    let results = join_all(
        updates
            .iter()
            .map(|update| store.update_task(&update.id, project, update.to_patch())),
    )
    .await;

    let attempted = results.len();
    let mut failed = 0usize;
    let mut first_error = None;
    for result in results {
        if let Err(err) = result {
            failed += 1;
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    }

    match first_error {
        None => Ok(()),
        Some(source) => {
            warn!(attempted, failed, "position batch partially failed");
            Err(BoardError::Persistence {
                attempted,
                failed,
                source: Box::new(source),
            })
        }
    }
}
