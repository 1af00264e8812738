// tests/staleness_behaviour.rs
mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};
use crate::common::{executed_log, init_tracing, snapshot, FakeExecutor};

use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

use stalerun::build_target;
use stalerun::config::ConfigFile;
use stalerun::dag::StaleReason;
use stalerun::fs::mock::MockFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

/// src.txt -> a.out (A) -> b.out (B) -> c.out (C), plus phony `all` -> C.
fn chain() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_task(
            "A",
            TaskConfigBuilder::new("make a").output("a.out").input("src.txt").build(),
        )
        .with_task(
            "B",
            TaskConfigBuilder::new("make b").output("b.out").input("a.out").build(),
        )
        .with_task(
            "C",
            TaskConfigBuilder::new("make c").output("c.out").input("b.out").build(),
        )
        .with_task("all", TaskConfigBuilder::aggregate().input("C").build())
        .build()
}

fn outputs() -> HashMap<String, Vec<String>> {
    HashMap::from([
        ("A".to_string(), vec!["a.out".to_string()]),
        ("B".to_string(), vec!["b.out".to_string()]),
        ("C".to_string(), vec!["c.out".to_string()]),
    ])
}

#[tokio::test]
async fn fresh_tree_builds_whole_chain_in_order() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let fs = MockFileSystem::new();
        fs.add_file("src.txt", 10);
        let log = executed_log();

        let (plan, summary) = build_target(
            &chain(),
            Path::new("."),
            "all",
            &fs,
            FakeExecutor::new(log.clone()),
        )
        .await?;

        assert_eq!(plan.task_names(), vec!["A", "B", "C", "all"]);
        assert_eq!(snapshot(&log), vec!["A", "B", "C"]);
        assert_eq!(summary.executed, vec!["A", "B", "C"]);
        assert!(matches!(plan.steps[0].reason, StaleReason::MissingOutput(_)));
        assert_eq!(plan.steps[3].reason, StaleReason::Phony);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn up_to_date_outputs_are_not_rebuilt() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let fs = MockFileSystem::new();
        fs.add_file("src.txt", 10);
        fs.add_file("a.out", 20);
        fs.add_file("b.out", 30);
        fs.add_file("c.out", 40);
        let log = executed_log();

        let (plan, _) = build_target(
            &chain(),
            Path::new("."),
            "all",
            &fs,
            FakeExecutor::new(log.clone()),
        )
        .await?;

        // Only the phony aggregate is scheduled, and it has no command.
        assert_eq!(plan.task_names(), vec!["all"]);
        assert_eq!(plan.up_to_date, vec!["A", "B", "C"]);
        assert!(snapshot(&log).is_empty());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn newer_source_reruns_downstream_tasks_once_in_order() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let fs = MockFileSystem::new();
        fs.add_file("src.txt", 10);
        fs.add_file("a.out", 20);
        fs.add_file("b.out", 30);
        fs.add_file("c.out", 40);
        // Only A is stale.
        fs.touch("src.txt", 50);
        let log = executed_log();

        let executor = FakeExecutor::new(log.clone()).touching(fs.clone(), outputs(), 60);
        let (plan, _) = build_target(&chain(), Path::new("."), "c.out", &fs, executor).await?;

        assert_eq!(snapshot(&log), vec!["A", "B", "C"]);
        assert!(matches!(
            plan.steps[0].reason,
            StaleReason::OutdatedOutput { .. }
        ));
        assert_eq!(plan.steps[1].reason, StaleReason::DependencyRebuilt("A".into()));
        assert_eq!(plan.steps[2].reason, StaleReason::DependencyRebuilt("B".into()));

        // Second invocation sees the fresh outputs and does nothing.
        let log2 = executed_log();
        let (plan, _) = build_target(
            &chain(),
            Path::new("."),
            "c.out",
            &fs,
            FakeExecutor::new(log2.clone()),
        )
        .await?;
        assert!(plan.is_empty());
        assert!(snapshot(&log2).is_empty());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn stale_middle_task_runs_b_then_c_never_a() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let fs = MockFileSystem::new();
        fs.add_file("src.txt", 10);
        fs.add_file("a.out", 50);
        fs.add_file("b.out", 30);
        fs.add_file("c.out", 40);
        let log = executed_log();

        build_target(
            &chain(),
            Path::new("."),
            "all",
            &fs,
            FakeExecutor::new(log.clone()),
        )
        .await?;

        assert_eq!(snapshot(&log), vec!["B", "C"]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn diamond_shared_dependency_runs_once() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let cfg = ConfigFileBuilder::new()
            .with_task("base", TaskConfigBuilder::new("make base").output("base.out").build())
            .with_task(
                "left",
                TaskConfigBuilder::new("make left").output("left.out").input("base.out").build(),
            )
            .with_task(
                "right",
                TaskConfigBuilder::new("make right").output("right.out").input("base").build(),
            )
            .with_task(
                "top",
                TaskConfigBuilder::new("make top")
                    .output("top.out")
                    .input("left.out")
                    .input("right.out")
                    .build(),
            )
            .build();

        let fs = MockFileSystem::new();
        let log = executed_log();
        build_target(&cfg, Path::new("."), "top", &fs, FakeExecutor::new(log.clone())).await?;

        assert_eq!(snapshot(&log), vec!["base", "left", "right", "top"]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn archive_tracks_staged_tree_not_package() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        // base produces a package and a staged tree; the archive only reads
        // the staged tree, so a newer package alone leaves it current.
        let cfg = ConfigFileBuilder::new()
            .with_task(
                "base",
                TaskConfigBuilder::new("snapcraft")
                    .output("base/base.snap")
                    .output("base/stage")
                    .input("base/snapcraft.yaml")
                    .build(),
            )
            .with_task(
                "archive",
                TaskConfigBuilder::new("tar czf base.tgz base/stage")
                    .output("base.tgz")
                    .input("base/stage")
                    .build(),
            )
            .build();

        let fs = MockFileSystem::new();
        fs.add_file("base/snapcraft.yaml", 10);
        fs.add_dir("base/stage", 20);
        fs.add_file("base/base.snap", 20);
        fs.add_file("base.tgz", 30);

        let log = executed_log();
        build_target(&cfg, Path::new("."), "archive", &fs, FakeExecutor::new(log.clone())).await?;
        assert!(snapshot(&log).is_empty());

        fs.touch("base/base.snap", 50);
        let log = executed_log();
        build_target(&cfg, Path::new("."), "archive", &fs, FakeExecutor::new(log.clone())).await?;
        assert!(snapshot(&log).is_empty());

        fs.touch("base/stage", 60);
        let log = executed_log();
        build_target(&cfg, Path::new("."), "archive", &fs, FakeExecutor::new(log.clone())).await?;
        assert_eq!(snapshot(&log), vec!["archive"]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn existing_file_target_without_rule_is_a_no_op() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let fs = MockFileSystem::new();
        fs.add_file("src.txt", 1);
        let log = executed_log();

        let (plan, summary) = build_target(
            &chain(),
            Path::new("."),
            "src.txt",
            &fs,
            FakeExecutor::new(log.clone()),
        )
        .await?;

        assert!(plan.is_empty());
        assert!(summary.executed.is_empty());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn glob_input_waits_for_producer_on_fresh_tree() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let cfg = ConfigFileBuilder::new()
            .with_task("gen", TaskConfigBuilder::new("codegen").output("gen/out.rs").build())
            .with_task(
                "lib",
                TaskConfigBuilder::new("ar rcs lib.a gen/*.rs")
                    .output("lib.a")
                    .input("gen/*.rs")
                    .build(),
            )
            .build();

        // Nothing exists yet: the pattern only matches gen's declared output.
        let fs = MockFileSystem::new();
        let log = executed_log();
        let (plan, _) =
            build_target(&cfg, Path::new("."), "lib", &fs, FakeExecutor::new(log.clone())).await?;

        assert_eq!(plan.task_names(), vec!["gen", "lib"]);
        assert_eq!(snapshot(&log), vec!["gen", "lib"]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn default_dir_and_task_env_reach_planned_steps() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let cfg = ConfigFileBuilder::new()
            .with_default_dir("work")
            .with_task(
                "pack",
                TaskConfigBuilder::new("snapcraft pack")
                    .output("pack.snap")
                    .env("SNAPCRAFT_BUILD_ENVIRONMENT", "host")
                    .build(),
            )
            .with_task(
                "app",
                TaskConfigBuilder::new("snapcraft")
                    .dir("app")
                    .output("app.snap")
                    .input("pack")
                    .build(),
            )
            .build();

        let fs = MockFileSystem::new();
        let (plan, _) = build_target(
            &cfg,
            Path::new("."),
            "app",
            &fs,
            FakeExecutor::new(executed_log()),
        )
        .await?;

        let pack = &plan.steps[0];
        assert_eq!(pack.dir, Path::new("work"));
        assert_eq!(
            pack.env.get("SNAPCRAFT_BUILD_ENVIRONMENT").map(String::as_str),
            Some("host")
        );
        let app = &plan.steps[1];
        assert_eq!(app.dir, Path::new("app"));
        assert!(app.env.is_empty());

        Ok(())
    })
    .await
}
