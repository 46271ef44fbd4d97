//! In-task access to the scheduler.

use corosensei::Yielder;

use crate::counter::Counter;
use crate::fiber::{FiberInput, FiberYield};
use crate::scheduler::Shared;
use crate::task::Task;

/// Handle through which a running task talks to its scheduler.
///
/// Every task body receives a `&TaskContext`. It exposes the same
/// submission operations as [`TaskScheduler`](crate::scheduler::TaskScheduler),
/// plus the fiber-aware [`wait_for_counter`](TaskContext::wait_for_counter)
/// that suspends the calling fiber instead of blocking the worker thread.
pub struct TaskContext<'a> {
    shared: &'a Shared,
    yielder: &'a Yielder<FiberInput, FiberYield>,
}

impl<'a> TaskContext<'a> {
    pub(crate) fn new(shared: &'a Shared, yielder: &'a Yielder<FiberInput, FiberYield>) -> Self {
        TaskContext { shared, yielder }
    }

    /// Queues a task, returning a counter that starts at 1 and reaches 0
    /// when the task completes.
    pub fn add_task(&self, task: Task) -> Counter {
        self.shared.add_task(task)
    }

    /// Queues a group of tasks, returning a counter that starts at the
    /// group size and is decremented as each task completes.
    pub fn add_tasks(&self, tasks: Vec<Task>) -> Counter {
        self.shared.add_tasks(tasks)
    }

    /// Suspends the current task until `counter` equals `target`.
    ///
    /// If the counter already has the target value the call returns
    /// immediately without a fiber switch. Otherwise the fiber is parked on
    /// the waiting list and its worker moves on to other work; the call
    /// returns once a worker observes the counter at its target and resumes
    /// the fiber.
    pub fn wait_for_counter(&self, counter: &Counter, target: u32) {
        if counter.value() == target {
            return;
        }

        #[cfg(feature = "metrics")]
        self.shared
            .metrics
            .waits_parked
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let resumed = self.yielder.suspend(FiberYield::Waiting {
            counter: counter.clone(),
            target,
        });
        debug_assert!(
            matches!(resumed, FiberInput::Resume),
            "waiting fiber resumed with a task payload"
        );
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn shared(&self) -> &Shared {
        self.shared
    }
}
