// src/exec/process.rs

//! Production executor: one shell process per step, awaited to completion.

use std::future::Future;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use anyhow::Context;
use tokio::process::Command;
use tracing::{info, warn};

use crate::dag::PlannedStep;
use crate::errors::{Result, StalerunError};
use crate::exec::backend::ExecutorBackend;
use crate::exec::interrupt::Interrupt;
use crate::types::StepOutcome;

/// Runs step commands through the platform shell.
///
/// Stdio is inherited so the packaging tool's own output reaches the
/// terminal unchanged. An interrupt while a command runs kills the child and
/// surfaces as [`StalerunError::Interrupted`], as does a child that died from
/// SIGINT itself (a terminal Ctrl-C reaches the whole process group).
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    interrupt: Interrupt,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor that stops its running child once `interrupt` fires.
    pub fn with_interrupt(interrupt: Interrupt) -> Self {
        Self { interrupt }
    }
}

/// Build a shell command appropriate for the platform.
pub fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

impl ExecutorBackend for ProcessExecutor {
    fn run_step<'a>(
        &'a mut self,
        step: &'a PlannedStep,
    ) -> Pin<Box<dyn Future<Output = Result<StepOutcome>> + Send + 'a>> {
        Box::pin(run_step_process(step, &self.interrupt))
    }
}

#[cfg(unix)]
fn killed_by_sigint(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    const SIGINT: i32 = 2;
    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
fn killed_by_sigint(_status: &ExitStatus) -> bool {
    false
}

async fn run_step_process(step: &PlannedStep, interrupt: &Interrupt) -> Result<StepOutcome> {
    let Some(cmd_line) = step.cmd.as_deref() else {
        return Ok(StepOutcome::Success);
    };

    if interrupt.is_triggered() {
        return Err(StalerunError::Interrupted);
    }

    info!(
        task = %step.task,
        dir = %step.dir.display(),
        cmd = %cmd_line,
        "running"
    );

    let mut cmd = shell_command(cmd_line);
    cmd.current_dir(&step.dir)
        .envs(step.env.iter())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = cmd.spawn().with_context(|| {
        format!(
            "spawning process for task '{}' in {:?}",
            step.task, step.dir
        )
    })?;

    tokio::select! {
        status_res = child.wait() => {
            let status = status_res.with_context(|| {
                format!("waiting for process of task '{}'", step.task)
            })?;

            let code = status.code();
            info!(
                task = %step.task,
                exit_code = ?code,
                success = status.success(),
                "task process exited"
            );

            if status.success() {
                Ok(StepOutcome::Success)
            } else if killed_by_sigint(&status) || interrupt.is_triggered() {
                info!(task = %step.task, "command stopped by interrupt");
                Err(StalerunError::Interrupted)
            } else {
                Ok(StepOutcome::Failed(code))
            }
        }

        _ = interrupt.triggered() => {
            info!(task = %step.task, "interrupt received; killing running command");
            if let Err(e) = child.kill().await {
                warn!(task = %step.task, error = %e, "failed to kill child process on interrupt");
            }
            Err(StalerunError::Interrupted)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::dag::StaleReason;
    use std::collections::BTreeMap;

    fn step(cmd: &str, dir: &std::path::Path) -> PlannedStep {
        PlannedStep {
            task: "t".to_string(),
            cmd: Some(cmd.to_string()),
            dir: dir.to_path_buf(),
            env: BTreeMap::from([("STALERUN_TEST_VAR".to_string(), "hello".to_string())]),
            best_effort: false,
            remove: Vec::new(),
            reason: StaleReason::Phony,
        }
    }

    #[tokio::test]
    async fn runs_in_working_dir_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let s = step("printf %s \"$STALERUN_TEST_VAR\" > marker", dir.path());

        let outcome = ProcessExecutor::new().run_step(&s).await.unwrap();

        assert_eq!(outcome, StepOutcome::Success);
        let written = std::fs::read_to_string(dir.path().join("marker")).unwrap();
        assert_eq!(written, "hello");
    }

    #[tokio::test]
    async fn reports_non_zero_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let s = step("exit 3", dir.path());

        let outcome = ProcessExecutor::new().run_step(&s).await.unwrap();
        assert_eq!(outcome, StepOutcome::Failed(Some(3)));
    }

    #[tokio::test]
    async fn missing_working_dir_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let s = step("true", &dir.path().join("does-not-exist"));

        let err = ProcessExecutor::new().run_step(&s).await.unwrap_err();
        assert!(matches!(err, StalerunError::Other(_)));
    }

    #[tokio::test]
    async fn child_killed_by_sigint_is_an_interrupt() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = step("kill -INT $$; sleep 5", dir.path());
        s.best_effort = true;

        for _ in 0..10 {
            let err = ProcessExecutor::new().run_step(&s).await.unwrap_err();
            assert!(matches!(err, StalerunError::Interrupted), "got {err:?}");
        }
    }

    #[tokio::test]
    async fn interrupt_kills_running_command() {
        let dir = tempfile::tempdir().unwrap();
        let s = step("sleep 30", dir.path());
        let interrupt = Interrupt::new();
        let mut executor = ProcessExecutor::with_interrupt(interrupt.clone());

        let trigger = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            interrupt.trigger();
        });

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), executor.run_step(&s))
            .await
            .expect("interrupt should end the command well before it finishes");
        assert!(matches!(result, Err(StalerunError::Interrupted)));
        trigger.await.unwrap();
    }

    #[tokio::test]
    async fn no_command_starts_after_interrupt() {
        let dir = tempfile::tempdir().unwrap();
        let s = step("touch marker", dir.path());
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let err = ProcessExecutor::with_interrupt(interrupt)
            .run_step(&s)
            .await
            .unwrap_err();
        assert!(matches!(err, StalerunError::Interrupted));
        assert!(!dir.path().join("marker").exists());
    }
}
