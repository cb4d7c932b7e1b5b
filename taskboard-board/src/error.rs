//! Error types for the board engine

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Project not found, or not owned by the requesting user
    #[error("project not found: {id}")]
    ProjectNotFound { id: String },

    /// Stage not found in the current project
    #[error("stage not found: {id}")]
    StageNotFound { id: String },

    /// Task not found (stores raise this; the drag path treats a vanished
    /// task as a no-op instead)
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// One or more writes in a commit batch failed. Writes that already
    /// landed are not rolled back; the board is refreshed afterward.
    #[error("failed to persist {failed} of {attempted} task updates: {source}")]
    Persistence {
        attempted: usize,
        failed: usize,
        #[source]
        source: Box<BoardError>,
    },

    /// The post-commit refresh failed; the displayed board can no longer be
    /// trusted to match the backend.
    #[error("board refresh failed: {source}")]
    Refresh {
        #[source]
        source: Box<BoardError>,
    },

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// The backend rejected a request
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a backend rejection error
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Wrap an error as a post-commit refresh failure
    pub fn refresh(source: BoardError) -> Self {
        Self::Refresh {
            source: Box::new(source),
        }
    }

    /// Whether this is a partial-batch persistence failure
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}
