//! REST client for a PostgREST-style rows API.
//!
//! The backend exposes each table as a resource under `/rest/v1/<table>`
//! with `eq.`-prefixed column filters, `order=` sorting, JSON bodies, and
//! an API key plus bearer token on every request. This is the wire shape of
//! the hosted backend the original boards run against; the column names
//! (`owner_id`, `project_id`, `stage_id`, `description_html`) are owned by
//! that backend and kept out of the domain types.

use super::TaskStore;
use crate::error::{BoardError, Result};
use crate::types::{
    Attachment, AttachmentId, NewTask, Project, ProjectId, Stage, StageId, StageKind, Task, TaskId,
    TaskPatch, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Environment variable naming the backend base URL.
pub const ENV_API_URL: &str = "TASKBOARD_API_URL";
/// Environment variable naming the backend API key.
pub const ENV_API_KEY: &str = "TASKBOARD_API_KEY";

/// Connection settings for [`RestStore`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: Url,
    pub api_key: String,
}

impl RestConfig {
    /// Create a config from explicit settings.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Read settings from `TASKBOARD_API_URL` and `TASKBOARD_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ENV_API_URL).map_err(|_| BoardError::missing_field(ENV_API_URL))?;
        let api_key =
            std::env::var(ENV_API_KEY).map_err(|_| BoardError::missing_field(ENV_API_KEY))?;
        let base_url = Url::parse(&url)
            .map_err(|e| BoardError::invalid_value(ENV_API_URL, e.to_string()))?;
        Ok(Self::new(base_url, api_key))
    }
}

/// [`TaskStore`] backed by the remote rows API.
pub struct RestStore {
    client: reqwest::Client,
    rest_root: String,
}

impl RestStore {
    /// Build a client with the auth headers baked in.
    pub fn new(config: RestConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| BoardError::invalid_value("api_key", "not a valid header value"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| BoardError::invalid_value("api_key", "not a valid header value"))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let rest_root = format!(
            "{}/rest/v1",
            config.base_url.as_str().trim_end_matches('/')
        );
        Ok(Self { client, rest_root })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_root, table)
    }

    /// Turn a non-2xx response into a [`BoardError::Backend`].
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_else(|_| String::new());
        warn!(status = status.as_u16(), "backend rejected request");
        Err(BoardError::backend(
            status.as_u16(),
            if message.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                message
            },
        ))
    }
}

// Wire rows. Column names belong to the backend schema, not to the domain
// types, so the mapping lives here.

#[derive(Debug, Deserialize)]
struct ProjectRow {
    id: String,
    owner_id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: ProjectId::from_string(row.id),
            owner: UserId::from_string(row.owner_id),
            title: row.title,
            description: row.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StageRow {
    id: String,
    project_id: String,
    title: String,
    position: u32,
    #[serde(default)]
    kind: Option<StageKind>,
}

impl From<StageRow> for Stage {
    fn from(row: StageRow) -> Self {
        Stage::from_row(
            StageId::from_string(row.id),
            ProjectId::from_string(row.project_id),
            row.title,
            row.position,
            row.kind,
        )
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    id: String,
    project_id: String,
    stage_id: String,
    title: String,
    #[serde(default)]
    description_html: Option<String>,
    position: u32,
    done: bool,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId::from_string(row.id),
            project: ProjectId::from_string(row.project_id),
            stage: StageId::from_string(row.stage_id),
            title: row.title,
            description_html: row.description_html.unwrap_or_default(),
            position: row.position,
            done: row.done,
        }
    }
}

#[derive(Debug, Serialize)]
struct InsertTaskRow<'a> {
    project_id: &'a str,
    stage_id: &'a str,
    title: &'a str,
    description_html: &'a str,
    position: u32,
    done: bool,
}

#[derive(Debug, Serialize)]
struct PatchRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description_html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a TaskPatch> for PatchRow<'a> {
    fn from(patch: &'a TaskPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            description_html: patch.description_html.as_deref(),
            stage_id: patch.stage.as_ref().map(|s| s.as_str()),
            position: patch.position,
            done: patch.done,
            updated_at: patch.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AttachmentRow {
    id: String,
    task_id: String,
    name: String,
    storage_path: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    uploaded_by: Option<String>,
}

impl From<AttachmentRow> for Attachment {
    fn from(row: AttachmentRow) -> Self {
        Self {
            id: AttachmentId::from_string(row.id),
            task: TaskId::from_string(row.task_id),
            name: row.name,
            storage_path: row.storage_path,
            mime_type: row.mime_type,
            size: row.size,
            uploaded_by: row.uploaded_by.map(UserId::from_string),
        }
    }
}

#[async_trait]
impl TaskStore for RestStore {
    async fn fetch_project(&self, project: &ProjectId, owner: &UserId) -> Result<Project> {
        let response = self
            .client
            .get(self.table_url("projects"))
            .query(&[
                ("id", format!("eq.{project}")),
                ("owner_id", format!("eq.{owner}")),
                ("select", "*".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<ProjectRow> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .map(Project::from)
            .ok_or_else(|| BoardError::ProjectNotFound {
                id: project.to_string(),
            })
    }

    async fn fetch_stages(&self, project: &ProjectId) -> Result<Vec<Stage>> {
        let response = self
            .client
            .get(self.table_url("project_stages"))
            .query(&[
                ("project_id", format!("eq.{project}")),
                ("select", "*".to_string()),
                ("order", "position.asc".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<StageRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().map(Stage::from).collect())
    }

    async fn fetch_tasks(&self, project: &ProjectId) -> Result<Vec<Task>> {
        let response = self
            .client
            .get(self.table_url("tasks"))
            .query(&[
                ("project_id", format!("eq.{project}")),
                ("select", "*".to_string()),
                ("order", "position.asc".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<TaskRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task> {
        let body = InsertTaskRow {
            project_id: task.project.as_str(),
            stage_id: task.stage.as_str(),
            title: &task.title,
            description_html: &task.description_html,
            position: task.position,
            done: task.done,
        };
        let response = self
            .client
            .post(self.table_url("tasks"))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        let rows: Vec<TaskRow> = Self::check(response).await?.json().await?;
        rows.into_iter().next().map(Task::from).ok_or_else(|| {
            BoardError::backend(200, "insert returned no row")
        })
    }

    async fn update_task(&self, id: &TaskId, project: &ProjectId, patch: TaskPatch) -> Result<()> {
        debug!(task = %id, "patching task row");
        let response = self
            .client
            .patch(self.table_url("tasks"))
            .query(&[
                ("id", format!("eq.{id}")),
                ("project_id", format!("eq.{project}")),
            ])
            .header("Prefer", "return=representation")
            .json(&PatchRow::from(&patch))
            .send()
            .await?;
        let rows: Vec<TaskRow> = Self::check(response).await?.json().await?;
        if rows.is_empty() {
            // scoped filter matched nothing: wrong project or vanished row
            return Err(BoardError::TaskNotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId, project: &ProjectId) -> Result<()> {
        let response = self
            .client
            .delete(self.table_url("tasks"))
            .query(&[
                ("id", format!("eq.{id}")),
                ("project_id", format!("eq.{project}")),
            ])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_attachments(&self, task: &TaskId) -> Result<Vec<Attachment>> {
        let response = self
            .client
            .get(self.table_url("task_attachments"))
            .query(&[
                ("task_id", format!("eq.{task}")),
                ("select", "*".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<AttachmentRow> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().map(Attachment::from).collect())
    }
}

impl RestStore {
    /// Insert a project row. Not part of [`TaskStore`] (the board engine
    /// only reads projects), but the seed tool needs it.
    pub async fn insert_project(
        &self,
        owner: &UserId,
        title: &str,
        description: Option<&str>,
    ) -> Result<Project> {
        #[derive(Serialize)]
        struct InsertProjectRow<'a> {
            owner_id: &'a str,
            title: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<&'a str>,
        }

        let response = self
            .client
            .post(self.table_url("projects"))
            .header("Prefer", "return=representation")
            .json(&InsertProjectRow {
                owner_id: owner.as_str(),
                title,
                description,
            })
            .send()
            .await?;
        let rows: Vec<ProjectRow> = Self::check(response).await?.json().await?;
        rows.into_iter().next().map(Project::from).ok_or_else(|| {
            BoardError::backend(200, "insert returned no row")
        })
    }

    /// Insert a stage row. Seed-tool companion to
    /// [`insert_project`](Self::insert_project).
    pub async fn insert_stage(
        &self,
        project: &ProjectId,
        title: &str,
        position: u32,
        kind: StageKind,
    ) -> Result<Stage> {
        #[derive(Serialize)]
        struct InsertStageRow<'a> {
            project_id: &'a str,
            title: &'a str,
            position: u32,
            kind: StageKind,
        }

        let response = self
            .client
            .post(self.table_url("project_stages"))
            .header("Prefer", "return=representation")
            .json(&InsertStageRow {
                project_id: project.as_str(),
                title,
                position,
                kind,
            })
            .send()
            .await?;
        let rows: Vec<StageRow> = Self::check(response).await?.json().await?;
        rows.into_iter().next().map(Stage::from).ok_or_else(|| {
            BoardError::backend(200, "insert returned no row")
        })
    }
}
