//! Counter-based synchronization for task group completion.
//!
//! A [`Counter`] is the join primitive of the scheduler: it starts at the
//! size of a task group and is decremented exactly once as each task in the
//! group completes. Fibers wait for a counter to reach a target value via
//! [`TaskContext::wait_for_counter`](crate::context::TaskContext::wait_for_counter)
//! without blocking their worker thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// A shared, read-only handle to an atomic task-group counter.
///
/// Counters are created by `add_task`/`add_tasks` with an initial value
/// equal to the number of tasks in the group. The handle is cloneable and
/// outlives its creating call for as long as any waiter or unfinished task
/// holds a clone.
///
/// The public surface is deliberately read-only: only the scheduler
/// decrements a counter, once per completed task. Callers cannot increment,
/// reset, or attach additional tasks to an existing counter.
#[derive(Clone, Debug)]
pub struct Counter {
    inner: Arc<AtomicU32>,
}

impl Counter {
    /// Creates a new counter with the specified initial value.
    pub(crate) fn new(initial: u32) -> Self {
        Counter {
            inner: Arc::new(AtomicU32::new(initial)),
        }
    }

    /// Returns the current value of the counter.
    ///
    /// Acquire load: a caller observing the value published by a completed
    /// task also observes all of that task's writes.
    pub fn value(&self) -> u32 {
        self.inner.load(Ordering::Acquire)
    }

    /// Checks if the counter has reached zero.
    pub fn is_complete(&self) -> bool {
        self.value() == 0
    }

    /// Decrements the counter by one, returning the previous value.
    ///
    /// Acquire-release: publishes every write done by the completing task
    /// before any waiter observes the new count.
    pub(crate) fn decrement(&self) -> u32 {
        self.inner.fetch_sub(1, Ordering::AcqRel)
    }
}
