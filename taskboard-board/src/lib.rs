//! Task board engine with drag-and-drop reordering
//!
//! This crate implements the board core of a project task board: typed
//! records for projects, stages and tasks, a session object that mirrors
//! one project's board state, and the reordering engine that turns a
//! drag-and-drop gesture into a minimal batch of row updates. Persistence
//! and identity are delegated to a backend-as-a-service, reached through
//! the [`TaskStore`] seam.
//!
//! ## Overview
//!
//! - **Tasks are ranked, not linked** - each task carries a 1-based
//!   `position` within its stage, dense after every successful reorder
//! - **Minimal writes** - a drop emits updates only for tasks whose
//!   `(stage, position, done)` triple actually changed
//! - **Server wins** - every commit ends with a refresh from the store, so
//!   the displayed board always converges to persisted state, including
//!   after a partial batch failure
//! - **Explicit gesture machine** - `Idle → Dragging → Committing → Idle`,
//!   with a short post-drop window that swallows the browser's synthetic
//!   click
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskboard_board::{BoardSession, MemoryStore, ProjectId, StageId, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let mut session = BoardSession::open(
//!     store,
//!     &ProjectId::from_string("p1"),
//!     &UserId::from_string("u1"),
//! )
//! .await?;
//!
//! // pick a card up, drop it at the top of another stage
//! let task = session.tasks()[0].id.clone();
//! session.drag_start(task);
//! let outcome = session
//!     .commit_drop(&StageId::from_string("done"), 0)
//!     .await?;
//!
//! println!("wrote {} rows", outcome.attempted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Data flow
//!
//! ```text
//! pointer drag ──> compute_drop_index ──> preview (render only)
//!       │
//!     drop ──> build_position_updates ──> persist_position_updates
//!                                               │
//!                        refresh <──────────────┘  (always, even on failure)
//! ```

pub mod error;
pub mod gesture;
pub mod reorder;
pub mod richtext;
pub mod session;
pub mod store;
pub mod types;

pub use error::{BoardError, Result};
pub use gesture::{DragGesture, GesturePhase, DEFAULT_CLICK_SUPPRESSION};
pub use reorder::{
    build_position_updates, compute_drop_index, persist_position_updates, CardRect, PositionUpdate,
};
pub use session::{BoardSession, BoardSummary, DropOutcome};
pub use store::{MemoryStore, RestConfig, RestStore, TaskStore};

// Re-export commonly used types
pub use types::{
    Attachment, AttachmentId, NewTask, Project, ProjectId, Stage, StageId, StageKind, Task, TaskId,
    TaskPatch, UserId,
};
