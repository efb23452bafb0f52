/*!
 * Condition Queue Tests
 */

use monitor_object::core::errors::MonitorError;
use monitor_object::core::sync::{
    Assertion, Condition, Monitor, MonitorConfig, WaitStatus, WakeResult,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Gate {
    permits: usize,
    order: Vec<usize>,
}

/// Poll until `done` holds inside the monitor
fn await_state<T>(monitor: &Monitor<T>, done: impl Fn(&T) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if monitor.do_within(|guard| Ok(done(&**guard))).unwrap() {
            return;
        }
        assert!(Instant::now() < deadline, "state never reached");
        thread::yield_now();
    }
}

fn await_waiters<T>(monitor: &Monitor<T>, condition: &Condition<T>, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let guard = monitor.enter().unwrap();
        let waiting = condition.len(&guard).unwrap();
        guard.leave().unwrap();
        if waiting == count {
            return;
        }
        assert!(Instant::now() < deadline, "waiters never parked");
        thread::yield_now();
    }
}

fn spawn_gate_waiter(
    monitor: &Arc<Monitor<Gate>>,
    open: &Arc<Condition<Gate>>,
    id: usize,
) -> thread::JoinHandle<()> {
    let (monitor, open) = (monitor.clone(), open.clone());
    thread::spawn(move || {
        let mut guard = monitor.enter().unwrap();
        while guard.permits == 0 {
            open.wait(&mut guard).unwrap();
        }
        guard.permits -= 1;
        guard.order.push(id);
        guard.leave().unwrap();
    })
}

#[test]
fn test_signal_wakes_in_fifo_order() {
    let monitor = Arc::new(Monitor::new(Gate::default()));
    let open = Arc::new(monitor.make_condition("open"));

    let mut handles = Vec::new();
    for id in 0..4 {
        handles.push(spawn_gate_waiter(&monitor, &open, id));
        await_waiters(&monitor, &open, id + 1);
    }

    for released in 1..=4 {
        let mut guard = monitor.enter().unwrap();
        guard.permits += 1;
        assert_eq!(open.signal(&mut guard).unwrap(), WakeResult::Woken(1));
        guard.leave().unwrap();
        await_state(&monitor, |gate| gate.order.len() == released);
    }

    for handle in handles {
        handle.join().unwrap();
    }
    let gate = Arc::try_unwrap(monitor).unwrap().into_inner();
    assert_eq!(gate.order, vec![0, 1, 2, 3]);
}

#[test]
fn test_signal_and_leave_wakes_everyone() {
    let monitor = Arc::new(Monitor::new(Gate::default()));
    let open = Arc::new(monitor.make_condition("open"));

    let handles: Vec<_> = (0..3)
        .map(|id| spawn_gate_waiter(&monitor, &open, id))
        .collect();
    await_waiters(&monitor, &open, 3);

    let mut guard = monitor.enter().unwrap();
    guard.permits = 3;
    assert_eq!(open.signal_and_leave(guard).unwrap(), WakeResult::Woken(3));

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(monitor.do_within(|guard| Ok(guard.order.len())).unwrap(), 3);
}

#[test]
fn test_wait_timeout_then_signal_has_no_waiters() {
    let monitor = Monitor::new(());
    let never = monitor.make_condition("never");

    let mut guard = monitor.enter().unwrap();
    let start = Instant::now();
    let status = never
        .wait_timeout(&mut guard, Duration::from_millis(30))
        .unwrap();
    assert!(status.timed_out());
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert_eq!(never.signal(&mut guard).unwrap(), WakeResult::NoWaiters);
    guard.leave().unwrap();
}

#[test]
fn test_wait_timeout_signaled_before_deadline() {
    let monitor = Arc::new(Monitor::new(false));
    let flag = Arc::new(monitor.make_condition("flag"));

    let (m, c) = (monitor.clone(), flag.clone());
    let waiter = thread::spawn(move || {
        let mut guard = m.enter().unwrap();
        let status = c.wait_timeout(&mut guard, Duration::from_secs(5)).unwrap();
        let seen = *guard;
        guard.leave().unwrap();
        (status, seen)
    });

    await_waiters(&monitor, &flag, 1);
    let mut guard = monitor.enter().unwrap();
    *guard = true;
    flag.signal(&mut guard).unwrap();
    guard.leave().unwrap();

    assert_eq!(waiter.join().unwrap(), (WaitStatus::Signaled, true));
}

#[test]
fn test_condition_of_other_monitor_rejected() {
    let first = Monitor::new(0);
    let second = Monitor::new(0);
    let cond = first.make_condition("first_only");

    let mut guard = second.enter().unwrap();
    match cond.signal_all(&mut guard) {
        Err(MonitorError::IllegalMonitorState { monitor, reason }) => {
            assert_eq!(monitor, second.name());
            assert!(reason.contains("first_only"));
        }
        other => panic!("expected illegal state, got {:?}", other),
    }
    assert!(matches!(
        cond.wait_timeout(&mut guard, Duration::from_millis(1)),
        Err(MonitorError::IllegalMonitorState { .. })
    ));
    guard.leave().unwrap();
}

#[test]
fn test_false_assertion_blocks_signal() {
    let monitor = Arc::new(Monitor::with_invariant(
        MonitorConfig::named("counter"),
        0u32,
        Assertion::always(),
    ));
    let positive = Arc::new(
        monitor.make_condition_with("positive", Assertion::new("count > 0", |c: &u32| *c > 0)),
    );

    let (m, c) = (monitor.clone(), positive.clone());
    let waiter = thread::spawn(move || {
        let mut guard = m.enter().unwrap();
        c.wait_until(&mut guard).unwrap();
        let value = *guard;
        guard.leave_with(value).unwrap()
    });
    await_waiters(&monitor, &positive, 1);

    let mut guard = monitor.enter().unwrap();
    let err = positive.signal(&mut guard).unwrap_err();
    assert!(err.is_violation());
    *guard = 5;
    assert!(positive.signal(&mut guard).unwrap().is_woken());
    guard.leave().unwrap();

    assert_eq!(waiter.join().unwrap(), 5);
}

#[test]
fn test_unchecked_monitor_skips_assertion() {
    let monitor = Monitor::with_invariant(
        MonitorConfig::unchecked("unchecked"),
        0u32,
        Assertion::new("never", |_: &u32| false),
    );
    let cond = monitor.make_condition_with("never", Assertion::new("never", |_: &u32| false));

    let mut guard = monitor.enter().unwrap();
    assert_eq!(cond.signal(&mut guard).unwrap(), WakeResult::NoWaiters);
    guard.leave().unwrap();
}
