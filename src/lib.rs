//! # taskweave - Fiber-Based Task Scheduler
//!
//! A user-space cooperative multitasking substrate for game-engine-style
//! workloads: fine-grained tasks run on fibers multiplexed over a small
//! pool of worker threads pinned one-per-core, and synchronize through
//! shared atomic counters instead of kernel waits.
//!
//! ## Architecture
//!
//! - **Tasks** are closures submitted to a single MPMC queue.
//! - **Fibers** are pre-created stackful execution contexts, drawn from a
//!   fixed pool to run tasks and returned when they finish.
//! - **Counters** track task-group completion; a task that waits on a
//!   counter suspends its fiber, freeing the worker to run other work,
//!   and resumes once the counter reaches the target value.
//! - **Workers** are kernel threads (one per logical core by default) that
//!   poll the waiting list and the task queue.
//!
//! Tasks are cooperative: they run until they return or wait on a counter.
//! There is no preemption, no priorities, and no work-stealing.
//!
//! ## Example
//!
//! ```no_run
//! use taskweave::{SchedulerConfig, Task, TaskScheduler};
//!
//! let scheduler = TaskScheduler::with_default_config()?;
//!
//! let counter = scheduler.add_tasks(
//!     (0..8).map(|i| Task::new(move |_ctx| println!("task {i}"))).collect(),
//! );
//! scheduler.wait_for_counter(&counter, 0);
//!
//! scheduler.shutdown()?;
//! # Ok::<(), taskweave::SchedulerError>(())
//! ```

pub mod config;
pub mod context;
pub mod counter;
pub mod error;
pub mod scheduler;
pub mod task;

mod fiber;
mod fiber_pool;
mod waiting;
mod worker;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use config::SchedulerConfig;
pub use context::TaskContext;
pub use counter::Counter;
pub use error::SchedulerError;
pub use scheduler::TaskScheduler;
pub use task::Task;
