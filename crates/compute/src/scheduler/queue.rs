//! Bounded blocking FIFO shared by every worker.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::task::Task;

#[derive(Debug)]
struct QueueState {
    tasks: VecDeque<Task>,
    high_water: usize,
}

/// Fixed-capacity task queue.
///
/// `enqueue` blocks while the queue is full and `dequeue` blocks while it is
/// empty. Each side wakes exactly one waiter on the other side.
#[derive(Debug)]
pub struct BoundedTaskQueue {
    capacity: usize,
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl BoundedTaskQueue {
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            capacity,
            state: Mutex::new(QueueState {
                tasks: VecDeque::with_capacity(capacity),
                high_water: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    // The state is a VecDeque plus a counter; no operation leaves it
    // half-updated, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enqueue(&self, task: Task) {
        let mut state = self.lock();
        while state.tasks.len() == self.capacity {
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.tasks.push_back(task);
        state.high_water = state.high_water.max(state.tasks.len());
        drop(state);
        self.not_empty.notify_one();
    }

    pub fn dequeue(&self) -> Task {
        let mut state = self.lock();
        let task = loop {
            match state.tasks.pop_front() {
                Some(task) => break task,
                None => {
                    state = self
                        .not_empty
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        };
        drop(state);
        self.not_full.notify_one();
        task
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest length the queue has reached so far.
    pub fn high_water(&self) -> usize {
        self.lock().high_water
    }
}
