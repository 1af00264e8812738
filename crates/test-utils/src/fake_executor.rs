use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use stalerun::dag::PlannedStep;
use stalerun::errors::Result;
use stalerun::exec::ExecutorBackend;
use stalerun::fs::mock::MockFileSystem;
use stalerun::types::{StepOutcome, TaskName};

/// A fake executor that:
/// - records which tasks were "run", in order
/// - reports `Failed(code)` for tasks registered with [`FakeExecutor::fail`]
///   and `Success` for everything else
/// - optionally touches each successful step's outputs in a
///   [`MockFileSystem`], simulating a real build
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<TaskName>>>,
    failures: HashMap<TaskName, i32>,
    touch: Option<(MockFileSystem, HashMap<TaskName, Vec<String>>, u64)>,
}

impl FakeExecutor {
    pub fn new(executed: Arc<Mutex<Vec<TaskName>>>) -> Self {
        Self {
            executed,
            failures: HashMap::new(),
            touch: None,
        }
    }

    /// Make `task` exit with `code`.
    pub fn fail(mut self, task: &str, code: i32) -> Self {
        self.failures.insert(task.to_string(), code);
        self
    }

    /// After a successful step, set the mtime of the listed paths to `now`.
    pub fn touching(
        mut self,
        fs: MockFileSystem,
        outputs: HashMap<TaskName, Vec<String>>,
        now: u64,
    ) -> Self {
        self.touch = Some((fs, outputs, now));
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn run_step<'a>(
        &'a mut self,
        step: &'a PlannedStep,
    ) -> Pin<Box<dyn Future<Output = Result<StepOutcome>> + Send + 'a>> {
        Box::pin(async move {
            self.executed.lock().unwrap().push(step.task.clone());

            if let Some(code) = self.failures.get(&step.task) {
                return Ok(StepOutcome::Failed(Some(*code)));
            }

            if let Some((fs, outputs, now)) = &self.touch {
                for path in outputs.get(&step.task).into_iter().flatten() {
                    fs.touch(path, *now);
                }
            }

            Ok(StepOutcome::Success)
        })
    }
}
