//! Waiter resume order follows counter completion, not submission order.

use std::hint;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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

fn spin_for(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        hint::spin_loop();
    }
}

#[test]
fn test_waiters_resume_in_counter_completion_order() {
    let s = scheduler(4);
    let order = Arc::new(Mutex::new(Vec::new()));

    // A is slow, B is fast; both are submitted before their waiters.
    let a = s.add_task(Task::new(|_ctx| spin_for(Duration::from_millis(200))));
    let b = s.add_task(Task::new(|_ctx| {}));

    let order_a = order.clone();
    let a_clone = a.clone();
    let waiter_a = s.add_task(Task::new(move |ctx| {
        ctx.wait_for_counter(&a_clone, 0);
        order_a.lock().unwrap().push("a");
    }));

    let order_b = order.clone();
    let b_clone = b.clone();
    let waiter_b = s.add_task(Task::new(move |ctx| {
        ctx.wait_for_counter(&b_clone, 0);
        order_b.lock().unwrap().push("b");
    }));

    s.wait_for_counter(&waiter_a, 0);
    s.wait_for_counter(&waiter_b, 0);

    // The B-waiter resumed first even though A and its waiter were
    // submitted earlier.
    assert_eq!(*order.lock().unwrap(), vec!["b", "a"]);
    s.shutdown().expect("shutdown failed");
}
