//! Task definitions and execution.
//!
//! A task is the unit of work submitted to the scheduler. Internally each
//! queued task is paired with its group counter as a [`TaskBundle`], which
//! is consumed when a worker begins executing it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::context::TaskContext;
use crate::counter::Counter;

/// A unit of work to be executed on a fiber.
///
/// The closure receives a [`TaskContext`] through which it can submit
/// sub-tasks and wait on counters. Any state the task needs travels as
/// closure captures; the scheduler never inspects or copies it.
pub struct Task {
    work: Box<dyn FnOnce(&TaskContext) + Send + 'static>,
}

impl Task {
    /// Creates a new task from the given work function.
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce(&TaskContext) + Send + 'static,
    {
        Task {
            work: Box::new(work),
        }
    }
}

/// A task paired with the counter tracking its group.
///
/// Created when `add_task(s)` enqueues, destroyed when a worker pops it and
/// begins execution.
pub(crate) struct TaskBundle {
    pub(crate) task: Task,
    pub(crate) counter: Counter,
}

impl TaskBundle {
    /// Runs the task and decrements the group counter.
    ///
    /// The task body is isolated with `catch_unwind` so that a panicking
    /// task cannot skip the decrement and hang its waiters, and cannot take
    /// down the hosting worker thread. The panic is logged and swallowed.
    pub(crate) fn execute(self, ctx: &TaskContext) {
        let TaskBundle { task, counter } = self;

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (task.work)(ctx))) {
            error!("task panicked: {}", panic_message(&payload));
        }

        #[cfg(feature = "metrics")]
        ctx.shared()
            .metrics
            .tasks_executed
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        counter.decrement();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
