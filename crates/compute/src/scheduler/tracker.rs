use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::warn;

/// Completion barrier: counts finished tasks and releases the waiter once a
/// precomputed total is reached.
#[derive(Debug)]
pub struct CompletionTracker {
    expected: usize,
    count: Mutex<usize>,
    complete: Condvar,
}

impl CompletionTracker {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            count: Mutex::new(0),
            complete: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one finished task.
    pub fn mark_done(&self) {
        let mut count = self.lock();
        *count += 1;
        if *count == self.expected {
            self.complete.notify_all();
        } else if *count > self.expected {
            warn!(count = *count, expected = self.expected, "more tasks completed than scheduled");
        }
    }

    /// Block until every expected task has been marked done.
    pub fn wait_until_complete(&self) {
        let mut count = self.lock();
        while *count < self.expected {
            count = self
                .complete
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn count(&self) -> usize {
        *self.lock()
    }

    pub fn expected(&self) -> usize {
        self.expected
    }
}
