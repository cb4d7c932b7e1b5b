//! Project type: a project owns stages and, transitively, tasks.

use super::ids::{ProjectId, UserId};
use serde::{Deserialize, Serialize};

/// A project, scoped to its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner: UserId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Project {
    /// Create a new project.
    pub fn new(owner: UserId, title: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            owner,
            title: title.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
