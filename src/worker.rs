//! Worker thread implementation.
//!
//! Each worker is a kernel thread, optionally pinned to one logical core,
//! that hosts one active fiber at a time. The loop alternates between
//! resuming fibers whose wait condition was met and starting fresh tasks
//! from the queue on pooled fibers.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use core_affinity::CoreId;
use tracing::{trace, warn};

use crate::fiber::{Fiber, FiberInput, FiberYield};
use crate::scheduler::Shared;
use crate::waiting::WaitEntry;

/// A worker thread executing fibers from the shared queue.
pub(crate) struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns a worker thread, pinning it to `core_id` when given.
    pub(crate) fn spawn(id: usize, shared: Arc<Shared>, core_id: Option<CoreId>) -> Self {
        let handle = thread::Builder::new()
            .name(format!("taskweave-worker-{id}"))
            .spawn(move || {
                if let Some(core_id) = core_id {
                    if !core_affinity::set_for_current(core_id) {
                        warn!(worker = id, core = core_id.id, "failed to pin worker to core");
                    }
                }
                trace!(worker = id, "worker started");
                Worker::run_loop(&shared);
                trace!(worker = id, "worker exiting");
            })
            .expect("failed to spawn worker thread");

        Worker {
            id,
            handle: Some(handle),
        }
    }

    /// Main execution loop.
    ///
    /// Order per iteration follows the scheduler design: drain ready
    /// waiters first so blocked task groups make progress, then pull a new
    /// task, then check for shutdown.
    fn run_loop(shared: &Arc<Shared>) {
        loop {
            let mut made_progress = false;

            for entry in shared.waiting.drain_ready() {
                made_progress = true;
                #[cfg(feature = "metrics")]
                shared
                    .metrics
                    .waiters_resumed
                    .fetch_add(1, Ordering::Relaxed);
                Worker::dispatch(shared, entry.fiber, FiberInput::Resume);
            }

            if let Some(bundle) = shared.pop_task() {
                made_progress = true;
                let fiber = shared.fiber_pool.try_acquire().unwrap_or_else(|| {
                    // Every pooled fiber is tied up in a counter wait. The
                    // pool is sized for the configured concurrency, so this
                    // is a setup error, not a transient condition.
                    panic!(
                        "fiber pool exhausted ({} fibers): too many concurrent waits, \
                         increase fiber_pool_size",
                        shared.fiber_pool.capacity()
                    )
                });
                #[cfg(feature = "metrics")]
                shared.metrics.note_fiber_acquired();
                Worker::dispatch(shared, fiber, FiberInput::Run(bundle));
            } else if !made_progress {
                if shared.quit.load(Ordering::Acquire) && shared.waiting.is_empty() {
                    break;
                }
                thread::yield_now();
            }
        }
    }

    /// Resumes a fiber and publishes it according to its yield directive.
    ///
    /// `resume` returns only once the fiber has switched off its own stack
    /// and back onto this worker's native stack, so publishing it here
    /// cannot race with another worker picking it up (invariant: a fiber
    /// never runs on two workers at once).
    fn dispatch(shared: &Arc<Shared>, mut fiber: Box<Fiber>, input: FiberInput) {
        match fiber.resume(input) {
            FiberYield::Finished => {
                #[cfg(feature = "metrics")]
                shared.metrics.note_fiber_released();
                shared.fiber_pool.release(fiber);
            }
            FiberYield::Waiting { counter, target } => {
                shared.waiting.park(WaitEntry {
                    fiber,
                    counter,
                    target,
                });
            }
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Waits for the worker thread to finish.
    pub(crate) fn join(mut self) -> thread::Result<()> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}
