//! High-level scheduler interface.
//!
//! [`TaskScheduler`] is the entry point: it owns the worker threads, the
//! fiber pool, and the shared queues, and exposes task submission and
//! counter waits to the driver thread. Code running inside a task uses
//! [`TaskContext`](crate::context::TaskContext) instead, which can suspend
//! its fiber rather than block a worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam::deque::{Injector, Steal};
use tracing::{debug, error, warn};

use crate::config::SchedulerConfig;
use crate::counter::Counter;
use crate::error::SchedulerError;
use crate::fiber::Fiber;
use crate::fiber_pool::FiberPool;
use crate::task::{Task, TaskBundle};
use crate::waiting::WaitList;
use crate::worker::Worker;

#[cfg(feature = "metrics")]
use crate::metrics::{Metrics, MetricsSnapshot};

/// State shared between the driver, the workers, and every fiber.
pub(crate) struct Shared {
    /// MPMC FIFO of ready tasks. Used as a plain injector queue; there are
    /// no per-worker deques and no stealing between workers.
    pub(crate) queue: Injector<TaskBundle>,
    pub(crate) fiber_pool: FiberPool,
    pub(crate) waiting: WaitList,
    pub(crate) quit: AtomicBool,
    #[cfg(feature = "metrics")]
    pub(crate) metrics: Metrics,
}

impl Shared {
    pub(crate) fn add_task(&self, task: Task) -> Counter {
        self.add_tasks(vec![task])
    }

    pub(crate) fn add_tasks(&self, tasks: Vec<Task>) -> Counter {
        let count = u32::try_from(tasks.len()).expect("task group exceeds u32::MAX tasks");
        let counter = Counter::new(count);
        for task in tasks {
            self.queue.push(TaskBundle {
                task,
                counter: counter.clone(),
            });
        }
        counter
    }

    /// Pops the next ready task, or `None` if the queue is empty.
    pub(crate) fn pop_task(&self) -> Option<TaskBundle> {
        loop {
            match self.queue.steal() {
                Steal::Success(bundle) => return Some(bundle),
                Steal::Empty => return None,
                Steal::Retry => continue,
            }
        }
    }
}

/// A fiber-based task scheduler.
///
/// Worker threads (one per logical core by default, each optionally pinned)
/// execute tasks on fibers drawn from a fixed pool. Tasks synchronize on
/// [`Counter`]s: a task group's counter reaches zero exactly when every
/// task in the group has completed.
///
/// ```no_run
/// use taskweave::{SchedulerConfig, Task, TaskScheduler};
///
/// let scheduler = TaskScheduler::new(SchedulerConfig::default())?;
///
/// let counter = scheduler.add_task(Task::new(|ctx| {
///     let inner = ctx.add_tasks((0..10).map(|_| Task::new(|_| {})).collect());
///     ctx.wait_for_counter(&inner, 0);
/// }));
///
/// scheduler.wait_for_counter(&counter, 0);
/// scheduler.shutdown()?;
/// # Ok::<(), taskweave::SchedulerError>(())
/// ```
pub struct TaskScheduler {
    shared: Arc<Shared>,
    workers: Vec<Worker>,
}

impl TaskScheduler {
    /// Creates a scheduler: validates the configuration, pre-creates the
    /// fiber pool, and spawns the worker threads.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;

        let shared = Arc::new(Shared {
            queue: Injector::new(),
            fiber_pool: FiberPool::with_capacity(config.fiber_pool_size),
            waiting: WaitList::new(),
            quit: AtomicBool::new(false),
            #[cfg(feature = "metrics")]
            metrics: Metrics::new(),
        });

        for _ in 0..config.fiber_pool_size {
            let fiber = Fiber::new(config.fiber_stack_size, Arc::clone(&shared))?;
            shared.fiber_pool.release(Box::new(fiber));
        }

        let core_ids = if config.pin_threads {
            core_affinity::get_core_ids().unwrap_or_default()
        } else {
            Vec::new()
        };

        let workers = (0..config.worker_threads)
            .map(|id| {
                let core_id = if core_ids.is_empty() {
                    None
                } else {
                    Some(core_ids[id % core_ids.len()])
                };
                Worker::spawn(id, Arc::clone(&shared), core_id)
            })
            .collect();

        debug!(
            workers = config.worker_threads,
            fibers = config.fiber_pool_size,
            stack = config.fiber_stack_size,
            pinned = config.pin_threads && !core_ids.is_empty(),
            "scheduler started"
        );

        Ok(TaskScheduler { shared, workers })
    }

    /// Creates a scheduler with the default configuration.
    pub fn with_default_config() -> Result<Self, SchedulerError> {
        TaskScheduler::new(SchedulerConfig::default())
    }

    /// Queues a task, returning a counter that starts at 1 and reaches 0
    /// when the task completes.
    pub fn add_task(&self, task: Task) -> Counter {
        self.shared.add_task(task)
    }

    /// Queues a group of tasks, returning a counter that starts at the
    /// group size and is decremented as each task completes.
    ///
    /// An empty group returns a counter that is already at zero.
    pub fn add_tasks(&self, tasks: Vec<Task>) -> Counter {
        self.shared.add_tasks(tasks)
    }

    /// Blocks the calling thread until `counter` equals `target`.
    ///
    /// This is the driver-side wait: the calling thread has no fiber to
    /// suspend, so it spins with exponential backoff. Inside a task, use
    /// [`TaskContext::wait_for_counter`](crate::context::TaskContext::wait_for_counter),
    /// which parks the fiber and lets the worker run other tasks.
    pub fn wait_for_counter(&self, counter: &Counter, target: u32) {
        let mut backoff_us = 1;
        const MAX_BACKOFF_US: u64 = 1000;

        while counter.value() != target {
            thread::sleep(Duration::from_micros(backoff_us));
            backoff_us = (backoff_us * 2).min(MAX_BACKOFF_US);
        }
    }

    /// Returns the number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns a snapshot of the scheduler's internal metrics.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Shuts the scheduler down: drains queued work, stops the workers, and
    /// destroys the fiber pool.
    ///
    /// Callers are expected to have waited on every counter they hold;
    /// shutdown with unfinished waits does not terminate. Returns an error
    /// if any worker thread panicked during the scheduler's lifetime.
    pub fn shutdown(self) -> Result<(), SchedulerError> {
        // Let queued tasks drain before asking workers to exit; workers
        // keep servicing the waiting list until it is empty regardless.
        while !self.shared.queue.is_empty() {
            thread::sleep(Duration::from_millis(1));
        }
        self.shared.quit.store(true, Ordering::Release);

        let mut panicked = 0;
        for worker in self.workers {
            let id = worker.id();
            if worker.join().is_err() {
                panicked += 1;
                error!(worker = id, "worker thread panicked");
            }
        }

        let reclaimed = self.shared.fiber_pool.drain();
        let expected = self.shared.fiber_pool.capacity();
        if reclaimed != expected {
            warn!(reclaimed, expected, "fiber pool short on shutdown");
            debug_assert_eq!(reclaimed, expected, "fibers leaked during shutdown");
        }
        debug!(reclaimed, "scheduler stopped");

        if panicked > 0 {
            Err(SchedulerError::WorkersPanicked(panicked))
        } else {
            Ok(())
        }
    }
}
