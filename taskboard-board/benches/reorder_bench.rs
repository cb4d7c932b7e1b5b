//! Benchmark for the reorder diff over growing board sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use taskboard_board::{
    build_position_updates, ProjectId, Stage, StageId, StageKind, Task, TaskId,
};

fn board(tasks_per_stage: usize) -> (Vec<Stage>, Vec<Task>) {
    let project = ProjectId::from_string("bench");
    let stages = vec![
        Stage::from_row(
            StageId::from_string("todo"),
            project.clone(),
            "To Do".into(),
            1,
            Some(StageKind::Backlog),
        ),
        Stage::from_row(
            StageId::from_string("done"),
            project.clone(),
            "Done".into(),
            2,
            Some(StageKind::Done),
        ),
    ];

    let mut tasks = Vec::with_capacity(tasks_per_stage * 2);
    for stage in ["todo", "done"] {
        for i in 0..tasks_per_stage {
            tasks.push(Task {
                id: TaskId::from_string(format!("{stage}-{i}")),
                project: project.clone(),
                stage: StageId::from_string(stage),
                title: format!("task {i}"),
                description_html: String::new(),
                position: i as u32 + 1,
                done: stage == "done",
            });
        }
    }
    (stages, tasks)
}

fn bench_build_position_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_position_updates");
    for size in [10usize, 100, 1000] {
        let (stages, tasks) = board(size);
        let moving = TaskId::from_string("todo-0");
        let target = StageId::from_string("done");

        group.bench_with_input(
            BenchmarkId::new("cross_stage_to_middle", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    build_position_updates(
                        black_box(&tasks),
                        black_box(&stages),
                        &moving,
                        &target,
                        size / 2,
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_build_position_updates);
criterion_main!(benches);
