#![allow(dead_code)]

pub use stalerun_test_utils::builders;
pub use stalerun_test_utils::fake_executor::FakeExecutor;
pub use stalerun_test_utils::{init_tracing, with_timeout};

use std::sync::{Arc, Mutex};

/// Shared log the fake executor appends task names to.
pub fn executed_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn snapshot(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().unwrap().clone()
}
