//! Error types for scheduler construction and shutdown.

use thiserror::Error;

/// Errors surfaced by [`TaskScheduler`](crate::scheduler::TaskScheduler).
///
/// Task submission and counter waits never fail; the only fallible
/// operations are constructing a scheduler (configuration validation and
/// fiber stack allocation) and shutting one down (worker panics).
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("worker_threads must be at least 1")]
    NoWorkers,

    /// Every worker can hold one running fiber plus one freshly parked
    /// waiter, and one spare is needed to make progress when all of them
    /// do.
    #[error("fiber_pool_size {got} is too small for {workers} workers; need at least {min}")]
    PoolTooSmall {
        got: usize,
        workers: usize,
        min: usize,
    },

    #[error("fiber_stack_size {got} is below the {min}-byte minimum")]
    StackTooSmall { got: usize, min: usize },

    /// The OS refused to map a fiber stack at construction time.
    #[error("failed to allocate a fiber stack: {0}")]
    StackAllocation(#[from] std::io::Error),

    #[error("{0} worker thread(s) panicked during execution")]
    WorkersPanicked(usize),
}
