//! taskboard-seed - populate a backend with sample board data.
//!
//! Creates one project for the given owner, the three standard stages
//! ("Not Started", "In Progress", "Done") and ten sample tasks spread
//! across them, all through the same rows API the board client uses.
//!
//! Connection settings come from `--url` / `--api-key` or from the
//! `TASKBOARD_API_URL` / `TASKBOARD_API_KEY` environment variables. The
//! owner must already exist with the identity provider; user registration
//! is not this tool's business.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use taskboard_board::{NewTask, RestConfig, RestStore, StageId, StageKind, TaskStore, UserId};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Standard stages every seeded project gets.
const STANDARD_STAGES: [(&str, StageKind); 3] = [
    ("Not Started", StageKind::Backlog),
    ("In Progress", StageKind::Active),
    ("Done", StageKind::Done),
];

/// Sample tasks, distributed 3 / 4 / 3 across the standard stages.
const SAMPLE_TASKS: [(&str, &str); 10] = [
    ("Set up project structure", "Initialize folder and file layout"),
    ("Create database schema", "Design and implement the tables"),
    ("Implement authentication", "Wire up signup and login"),
    ("Build dashboard UI", "Responsive dashboard layout"),
    ("Add task management", "Create, edit and delete tasks"),
    ("Implement drag and drop", "Reorder tasks within and across stages"),
    ("Create REST endpoints", "CRUD API for every resource"),
    ("Add form validation", "Client and server side checks"),
    ("Set up error handling", "Global handling and user feedback"),
    ("Deploy to production", "Ship it"),
];

#[derive(Debug, Parser)]
#[command(
    name = "taskboard-seed",
    about = "Seed a taskboard backend with standard stages and sample tasks"
)]
struct Cli {
    /// Backend base URL (defaults to TASKBOARD_API_URL)
    #[arg(long)]
    url: Option<Url>,

    /// Backend API key (defaults to TASKBOARD_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Owner user id the seeded project belongs to
    #[arg(long)]
    owner: String,

    /// Title for the seeded project
    #[arg(long, default_value = "Sample Project")]
    title: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("taskboard_seed=debug,taskboard_board=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("seed failed: {err}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> taskboard_board::Result<()> {
    let config = match (cli.url, cli.api_key) {
        (Some(url), Some(key)) => RestConfig::new(url, key),
        (url, key) => {
            let mut config = RestConfig::from_env()?;
            if let Some(url) = url {
                config.base_url = url;
            }
            if let Some(key) = key {
                config.api_key = key;
            }
            config
        }
    };
    let store = RestStore::new(config)?;
    let owner = UserId::from_string(cli.owner);

    let project = store
        .insert_project(&owner, &cli.title, Some("Seeded sample project"))
        .await?;
    tracing::info!(project = %project.id, "project created: {}", project.title);

    let mut stages: Vec<StageId> = Vec::with_capacity(STANDARD_STAGES.len());
    for (position, (title, kind)) in STANDARD_STAGES.iter().enumerate() {
        let stage = store
            .insert_stage(&project.id, title, position as u32 + 1, *kind)
            .await?;
        tracing::info!(stage = %stage.id, "stage created: {title}");
        stages.push(stage.id);
    }

    let mut created = 0usize;
    let mut next_position = [0u32; STANDARD_STAGES.len()];
    for (i, (title, description)) in SAMPLE_TASKS.iter().enumerate() {
        // 3 to Not Started, 4 to In Progress, 3 to Done
        let stage_index = match i {
            0..=2 => 0,
            3..=6 => 1,
            _ => 2,
        };
        next_position[stage_index] += 1;

        store
            .insert_task(NewTask {
                project: project.id.clone(),
                stage: stages[stage_index].clone(),
                title: (*title).to_string(),
                description_html: format!("<p>{description}</p>"),
                position: next_position[stage_index],
                done: STANDARD_STAGES[stage_index].1.is_done(),
            })
            .await?;
        created += 1;
    }

    tracing::info!(
        project = %project.id,
        stages = stages.len(),
        tasks = created,
        "seed completed"
    );
    Ok(())
}
