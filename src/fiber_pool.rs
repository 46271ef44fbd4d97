//! Shared pool of reusable fibers.

use crossbeam::channel::{self, Receiver, Sender};

use crate::fiber::Fiber;

/// A fixed-size blocking MPMC pool of fibers, shared by all workers.
///
/// The pool is a bounded channel seeded with every fiber at scheduler
/// construction. Workers take fibers out to run tasks and put them back
/// when the task finishes; fibers parked on the waiting list are absent
/// from the pool until their wait completes and they finish.
pub(crate) struct FiberPool {
    slots: Receiver<Box<Fiber>>,
    returns: Sender<Box<Fiber>>,
    capacity: usize,
}

impl FiberPool {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (returns, slots) = channel::bounded(capacity);
        FiberPool {
            slots,
            returns,
            capacity,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Takes a fiber from the pool without blocking. `None` means the pool
    /// is starved, which with a correctly sized pool is a configuration
    /// error; callers treat it as fatal.
    pub(crate) fn try_acquire(&self) -> Option<Box<Fiber>> {
        self.slots.try_recv().ok()
    }

    /// Puts a fiber back into the pool.
    pub(crate) fn release(&self, fiber: Box<Fiber>) {
        // The channel holds `capacity` slots and only ever contains fibers
        // created for this pool, so the send cannot block.
        self.returns
            .try_send(fiber)
            .expect("fiber pool over capacity");
    }

    /// Empties the pool, dropping every fiber, and returns how many were
    /// reclaimed. Used at shutdown for the fiber-leak check.
    pub(crate) fn drain(&self) -> usize {
        self.slots.try_iter().count()
    }
}
