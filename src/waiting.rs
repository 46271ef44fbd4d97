//! Waiting list for fibers blocked on counters.

use std::sync::Mutex;

use crate::counter::Counter;
use crate::fiber::Fiber;

/// A fiber parked until its counter reaches the target value.
pub(crate) struct WaitEntry {
    pub(crate) fiber: Box<Fiber>,
    pub(crate) counter: Counter,
    pub(crate) target: u32,
}

/// The set of fibers whose tasks are blocked in `wait_for_counter`.
///
/// Not performance-critical: a mutex around a plain vector suffices. The
/// lock is held only while entries are inserted or drained, never across a
/// fiber switch or task execution.
pub(crate) struct WaitList {
    entries: Mutex<Vec<WaitEntry>>,
}

impl WaitList {
    pub(crate) fn new() -> Self {
        WaitList {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Parks a suspended fiber until its counter meets the target.
    pub(crate) fn park(&self, entry: WaitEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    /// Removes and returns every entry whose counter currently equals its
    /// target. Entry order is not preserved; waiters are not ordered with
    /// respect to each other.
    pub(crate) fn drain_ready(&self) -> Vec<WaitEntry> {
        let mut entries = self.entries.lock().unwrap();
        let mut ready = Vec::new();
        let mut i = 0;
        while i < entries.len() {
            if entries[i].counter.value() == entries[i].target {
                ready.push(entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        ready
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}
