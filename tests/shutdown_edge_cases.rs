//! Shutdown behavior: draining, joining, and fiber reclamation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taskweave::{SchedulerConfig, Task, TaskScheduler};

fn scheduler(workers: usize) -> TaskScheduler {
    TaskScheduler::new(SchedulerConfig {
        worker_threads: workers,
        fiber_pool_size: 25.max(2 * workers + 1),
        pin_threads: false,
        ..SchedulerConfig::default()
    })
    .expect("scheduler construction failed")
}

#[test]
fn test_quit_after_drain() {
    let s = scheduler(4);
    let executed = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<Task> = (0..100)
        .map(|_| {
            let executed = executed.clone();
            Task::new(move |_ctx| {
                executed.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    let counter = s.add_tasks(tasks);
    s.wait_for_counter(&counter, 0);
    assert_eq!(executed.load(Ordering::SeqCst), 100);

    // All workers join and the fiber pool drains back to full size; a
    // leaked fiber trips the debug assertion inside shutdown.
    s.shutdown().expect("shutdown failed");
}

#[test]
fn test_shutdown_waits_for_queued_tasks() {
    let s = scheduler(2);
    let executed = Arc::new(AtomicUsize::new(0));

    for _ in 0..10 {
        let executed = executed.clone();
        s.add_task(Task::new(move |_ctx| {
            std::thread::sleep(Duration::from_millis(10));
            executed.fetch_add(1, Ordering::SeqCst);
        }));
    }

    // Shutdown without waiting on the counters: queued work still drains
    // before the workers exit.
    s.shutdown().expect("shutdown failed");
    assert_eq!(executed.load(Ordering::SeqCst), 10);
}

#[test]
fn test_shutdown_with_default_config() {
    // Default config pins workers to cores; make sure the full lifecycle
    // works with pinning enabled on this machine.
    let s = TaskScheduler::with_default_config().expect("scheduler construction failed");
    assert!(s.worker_count() >= 1);

    let counter = s.add_task(Task::new(|_ctx| {}));
    s.wait_for_counter(&counter, 0);
    s.shutdown().expect("shutdown failed");
}
