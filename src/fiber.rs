//! Fiber management and the suspend protocol.
//!
//! A fiber is a stackful execution context (backed by `corosensei`) that
//! runs tasks one at a time, suspending back to its worker between tasks
//! and whenever a task blocks on a counter.
//!
//! Suspension is the heart of the scheduler's safety story. Publishing a
//! fiber (to the pool or the waiting list) while any worker is still
//! executing on its stack would let a second worker resume it mid-flight
//! and corrupt the stack. With asymmetric coroutines the hazard cannot
//! arise: `resume` only returns after the fiber has fully switched off its
//! stack, so the worker performs the publish described by the yielded
//! [`FiberYield`] directive from its own native stack, which no other
//! thread ever runs on. See [`crate::worker`] for the publish side.

use std::sync::Arc;

use corosensei::stack::DefaultStack;
use corosensei::{Coroutine, CoroutineResult, Yielder};

use crate::context::TaskContext;
use crate::counter::Counter;
use crate::error::SchedulerError;
use crate::scheduler::Shared;
use crate::task::TaskBundle;

/// What a worker hands a fiber when resuming it.
pub(crate) enum FiberInput {
    /// Run a freshly dequeued task. Only valid for a fiber parked in the
    /// pool, i.e. suspended between tasks.
    Run(TaskBundle),
    /// Continue a fiber whose wait condition was met. Only valid for a
    /// fiber parked on the waiting list.
    Resume,
}

/// What a fiber hands its worker when suspending.
///
/// This is the publish directive of the switch protocol: by the time the
/// worker observes it, the fiber's stack is quiescent and the worker may
/// safely hand the fiber to the pool or the waiting list.
pub(crate) enum FiberYield {
    /// The current task ran to completion; return the fiber to the pool.
    Finished,
    /// The current task is blocked until `counter` equals `target`; park
    /// the fiber on the waiting list.
    Waiting { counter: Counter, target: u32 },
}

/// A pooled fiber: a coroutine with an owned, fixed-size stack.
///
/// The coroutine body is a loop that runs one task per `Run` input and
/// suspends `Finished` in between, so a single fiber (and its stack
/// allocation) is reused for arbitrarily many tasks. Fibers are created at
/// scheduler construction and dropped at shutdown; dropping a suspended
/// coroutine unwinds its stack.
pub(crate) struct Fiber {
    coroutine: Coroutine<FiberInput, FiberYield, ()>,
}

impl Fiber {
    /// Creates a fiber with its own stack of `stack_size` bytes.
    pub(crate) fn new(stack_size: usize, shared: Arc<Shared>) -> Result<Self, SchedulerError> {
        let stack = DefaultStack::new(stack_size)?;
        let coroutine = Coroutine::with_stack(
            stack,
            move |yielder: &Yielder<FiberInput, FiberYield>, mut input: FiberInput| {
                let ctx = TaskContext::new(&shared, yielder);
                loop {
                    match input {
                        FiberInput::Run(bundle) => {
                            bundle.execute(&ctx);
                            input = yielder.suspend(FiberYield::Finished);
                        }
                        // A pool fiber has no wait to continue from.
                        FiberInput::Resume => panic!("pool fiber resumed without a task"),
                    }
                }
            },
        );
        Ok(Fiber { coroutine })
    }

    /// Runs the fiber until its next suspension and returns the directive
    /// it yielded.
    pub(crate) fn resume(&mut self, input: FiberInput) -> FiberYield {
        match self.coroutine.resume(input) {
            CoroutineResult::Yield(directive) => directive,
            // The body loops forever; fibers only retire by being dropped.
            CoroutineResult::Return(()) => panic!("fiber main loop returned unexpectedly"),
        }
    }
}

// SAFETY: A fiber is owned by exactly one place at a time (the pool queue,
// the waiting list, or the hands of a single worker), and ownership only
// transfers after the coroutine has suspended, so it is never resumed or
// dropped concurrently from two threads.
unsafe impl Send for Fiber {}
