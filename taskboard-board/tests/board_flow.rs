//! Integration tests for the board session: open, drag commits, CRUD,
//! and convergence after partial persistence failures.

use std::sync::Arc;
use taskboard_board::{
    Attachment, BoardError, BoardSession, MemoryStore, NewTask, Project, ProjectId, Stage,
    StageId, StageKind, TaskId, TaskStore, UserId,
};

struct Fixture {
    store: Arc<MemoryStore>,
    project: ProjectId,
    owner: UserId,
    backlog: StageId,
    progress: StageId,
    done: StageId,
}

/// Seed the standard three-stage board: backlog [a, b, c], in progress [x],
/// done [t1, t2]. Task ids equal their titles.
async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let owner = UserId::from_string("u1");
    let project = Project::new(owner.clone(), "Sample");
    let project_id = project.id.clone();
    store.insert_project(project).await;

    let backlog = Stage::new(project_id.clone(), "Not Started", 1, StageKind::Backlog);
    let progress = Stage::new(project_id.clone(), "In Progress", 2, StageKind::Active);
    let done = Stage::new(project_id.clone(), "Done", 3, StageKind::Done);
    let (backlog_id, progress_id, done_id) =
        (backlog.id.clone(), progress.id.clone(), done.id.clone());
    store.insert_stage(backlog).await;
    store.insert_stage(progress).await;
    store.insert_stage(done).await;

    for (title, stage, position, done_flag) in [
        ("a", &backlog_id, 1u32, false),
        ("b", &backlog_id, 2, false),
        ("c", &backlog_id, 3, false),
        ("x", &progress_id, 1, false),
        ("t1", &done_id, 1, true),
        ("t2", &done_id, 2, true),
    ] {
        store
            .insert_task(NewTask {
                project: project_id.clone(),
                stage: stage.clone(),
                title: title.to_string(),
                description_html: String::new(),
                position,
                done: done_flag,
            })
            .await
            .unwrap();
    }

    Fixture {
        store,
        project: project_id,
        owner,
        backlog: backlog_id,
        progress: progress_id,
        done: done_id,
    }
}

async fn open_session(fx: &Fixture) -> BoardSession {
    BoardSession::open(fx.store.clone(), &fx.project, &fx.owner)
        .await
        .unwrap()
}

fn task_id(session: &BoardSession, title: &str) -> TaskId {
    session
        .tasks()
        .iter()
        .find(|t| t.title == title)
        .map(|t| t.id.clone())
        .expect("task exists")
}

fn stage_titles(session: &BoardSession, stage: &StageId) -> Vec<String> {
    session
        .tasks_in_stage(stage)
        .iter()
        .map(|t| t.title.clone())
        .collect()
}

#[tokio::test]
async fn test_open_loads_board_state() {
    let fx = fixture().await;
    let session = open_session(&fx).await;

    assert_eq!(session.project().title, "Sample");
    assert_eq!(session.stages().len(), 3);
    assert_eq!(session.tasks().len(), 6);
    assert_eq!(stage_titles(&session, &fx.backlog), ["a", "b", "c"]);

    let summary = session.summary();
    assert_eq!(summary.open_tasks, 4);
    assert_eq!(summary.done_tasks, 2);
    assert_eq!(summary.stages, 3);
}

#[tokio::test]
async fn test_open_rejects_foreign_owner() {
    let fx = fixture().await;
    let err = BoardSession::open(fx.store.clone(), &fx.project, &UserId::from_string("mallory"))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::ProjectNotFound { .. }));
}

#[tokio::test]
async fn test_cross_stage_drop_updates_done_and_positions() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    // drag "x" from In Progress to index 1 of Done, between t1 and t2
    let x = task_id(&session, "x");
    session.drag_start(x.clone());
    let outcome = session.commit_drop(&fx.done, 1).await.unwrap();

    // t1 was untouched; only x and t2 were written
    assert_eq!(outcome.attempted, 2);
    assert!(outcome.failure.is_none());

    assert_eq!(stage_titles(&session, &fx.done), ["t1", "x", "t2"]);
    let x_task = session.task(&x).unwrap();
    assert!(x_task.done);
    assert_eq!(x_task.position, 2);

    let positions: Vec<u32> = session
        .tasks_in_stage(&fx.done)
        .iter()
        .map(|t| t.position)
        .collect();
    assert_eq!(positions, [1, 2, 3]);
}

#[tokio::test]
async fn test_same_slot_drop_writes_nothing() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    let b = task_id(&session, "b");
    session.drag_start(b);
    let outcome = session.commit_drop(&fx.backlog, 1).await.unwrap();

    assert_eq!(outcome.attempted, 0);
    assert!(outcome.failure.is_none());
    assert_eq!(fx.store.update_calls().await, 0);
    assert_eq!(stage_titles(&session, &fx.backlog), ["a", "b", "c"]);
}

#[tokio::test]
async fn test_drop_outside_any_target_cancels() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    session.drag_start(task_id(&session, "a"));
    session.cancel_drag();

    assert_eq!(fx.store.update_calls().await, 0);
    assert_eq!(stage_titles(&session, &fx.backlog), ["a", "b", "c"]);
    assert!(!session.click_suppressed());
}

#[tokio::test]
async fn test_drop_without_drag_is_noop() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    let outcome = session.commit_drop(&fx.backlog, 0).await.unwrap();
    assert_eq!(outcome.attempted, 0);
    assert_eq!(fx.store.update_calls().await, 0);
}

#[tokio::test]
async fn test_click_suppressed_right_after_drop() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    session.drag_start(task_id(&session, "c"));
    session.commit_drop(&fx.progress, 0).await.unwrap();

    assert!(session.click_suppressed());
}

#[tokio::test]
async fn test_partial_failure_still_issues_all_calls_and_refreshes() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    // moving "c" to the front of backlog displaces a, b and c (3 writes);
    // make the write for "a" fail
    let a = task_id(&session, "a");
    fx.store.fail_updates_for(a.clone()).await;

    session.drag_start(task_id(&session, "c"));
    let outcome = session.commit_drop(&fx.backlog, 0).await.unwrap();

    assert_eq!(outcome.attempted, 3);
    // all three calls were issued despite the failure
    assert_eq!(fx.store.update_calls().await, 3);

    let failure = outcome.failure.expect("partial failure surfaced");
    match failure {
        BoardError::Persistence {
            attempted, failed, ..
        } => {
            assert_eq!(attempted, 3);
            assert_eq!(failed, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    // the refresh ran: the session shows exactly what the store holds,
    // a partial state with c and b renumbered but a untouched
    let store_tasks = fx.store.fetch_tasks(&fx.project).await.unwrap();
    assert_eq!(session.tasks().len(), store_tasks.len());
    for stored in &store_tasks {
        let shown = session.task(&stored.id).unwrap();
        assert_eq!(shown.position, stored.position);
        assert_eq!(shown.stage, stored.stage);
    }

    // a retry after the fault clears converges to dense positions
    fx.store.clear_failure(&a).await;
    session.drag_start(task_id(&session, "c"));
    let outcome = session.commit_drop(&fx.backlog, 0).await.unwrap();
    assert!(outcome.failure.is_none());
    assert_eq!(stage_titles(&session, &fx.backlog), ["c", "a", "b"]);
    let positions: Vec<u32> = session
        .tasks_in_stage(&fx.backlog)
        .iter()
        .map(|t| t.position)
        .collect();
    assert_eq!(positions, [1, 2, 3]);
}

#[tokio::test]
async fn test_create_task_appends_with_done_from_stage() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    let created = session
        .create_task(&fx.done, "wrap up", "final\ncheck")
        .await
        .unwrap();

    assert_eq!(created.position, 3);
    assert!(created.done);
    assert_eq!(created.description_html, "<p>final<br>check</p>");
    assert_eq!(stage_titles(&session, &fx.done), ["t1", "t2", "wrap up"]);
}

#[tokio::test]
async fn test_create_task_requires_title() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    let err = session.create_task(&fx.backlog, "   ", "").await.unwrap_err();
    assert!(matches!(err, BoardError::MissingField { .. }));

    let err = session
        .create_task(&StageId::from_string("nope"), "t", "")
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::StageNotFound { .. }));
}

#[tokio::test]
async fn test_edit_task_stores_rich_text() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    let a = task_id(&session, "a");
    session
        .edit_task(&a, "a, renamed", "first & second")
        .await
        .unwrap();

    let task = session.task(&a).unwrap();
    assert_eq!(task.title, "a, renamed");
    assert_eq!(task.description_html, "<p>first &amp; second</p>");
}

#[tokio::test]
async fn test_set_done_without_moving_stage() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    let a = task_id(&session, "a");
    session.set_task_done(&a, true).await.unwrap();

    let task = session.task(&a).unwrap();
    assert!(task.done);
    assert_eq!(task.stage, fx.backlog);
    assert_eq!(session.summary().done_tasks, 3);
}

#[tokio::test]
async fn test_delete_task_cascades_attachments() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    let a = task_id(&session, "a");
    fx.store
        .insert_attachment(
            Attachment::new(a.clone(), "mockup.png", "blobs/mockup")
                .with_mime_type("image/png")
                .with_size(1024),
        )
        .await;

    session.delete_task(&a).await.unwrap();

    assert!(session.task(&a).is_none());
    assert!(fx.store.fetch_attachments(&a).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_gesture_after_concurrent_delete_is_noop() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    let a = task_id(&session, "a");
    session.drag_start(a.clone());

    // another tab deletes the task and this session refreshes mid-gesture
    fx.store.delete_task(&a, &fx.project).await.unwrap();
    session.refresh().await.unwrap();

    let outcome = session.commit_drop(&fx.done, 0).await.unwrap();
    assert_eq!(outcome.attempted, 0);
    assert!(outcome.failure.is_none());
}

#[tokio::test]
async fn test_preview_requires_active_drag() {
    let fx = fixture().await;
    let mut session = open_session(&fx).await;

    use taskboard_board::CardRect;
    let cards = [CardRect::new(0.0, 40.0), CardRect::new(50.0, 40.0)];

    assert_eq!(session.preview_drop_index(&cards, 30.0), None);

    session.drag_start(task_id(&session, "a"));
    assert_eq!(session.preview_drop_index(&cards, 30.0), Some(1));
}
