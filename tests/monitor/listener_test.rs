/*!
 * Listener and Tracing Tests
 */

use monitor_object::blocking::BoundedQueue;
use monitor_object::core::sync::{Monitor, MonitorConfig};
use monitor_object::monitoring::{try_init_tracing, EventLog, MonitorEvent};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn position(kinds: &[&str], kind: &str) -> usize {
    kinds
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_else(|| panic!("missing event {kind} in {kinds:?}"))
}

#[test]
fn test_wait_signal_sequence() {
    let monitor = Arc::new(Monitor::new(false));
    let ready = Arc::new(monitor.make_condition("ready"));
    let log = Arc::new(EventLog::new());
    monitor.add_listener(log.clone());

    let (m, c) = (monitor.clone(), ready.clone());
    let waiter = thread::spawn(move || {
        let mut guard = m.enter().unwrap();
        while !*guard {
            c.wait(&mut guard).unwrap();
        }
        guard.leave().unwrap();
    });

    loop {
        let guard = monitor.enter().unwrap();
        let parked = ready.len(&guard).unwrap() == 1;
        guard.leave().unwrap();
        if parked {
            break;
        }
        thread::yield_now();
    }

    let mut guard = monitor.enter().unwrap();
    *guard = true;
    ready.signal(&mut guard).unwrap();
    guard.leave().unwrap();
    waiter.join().unwrap();

    let kinds = log.kinds();
    let call_wait = position(&kinds, "call_wait");
    let signal = position(&kinds, "signaller_awakes_waiter");
    let returned = position(&kinds, "return_from_wait");
    assert!(call_wait < signal);
    assert!(signal < returned);
    assert_eq!(kinds.last().copied(), Some("leave"));

    let events = log.events();
    assert!(events.iter().all(|e| e.monitor() == monitor.name()));
    assert!(events.contains(&MonitorEvent::ReturnFromWait {
        monitor: Arc::from(monitor.name()),
        condition: Arc::from("ready"),
        timed_out: false,
    }));
}

#[test]
fn test_signal_and_leave_event() {
    let monitor = Monitor::new(());
    let done = monitor.make_condition("done");
    let log = Arc::new(EventLog::new());
    monitor.add_listener(log.clone());

    let guard = monitor.enter().unwrap();
    done.signal_and_leave(guard).unwrap();

    assert_eq!(
        log.kinds(),
        vec!["call_enter", "return_from_enter", "signaller_leaves", "leave"]
    );
}

#[test]
fn test_violation_event_and_json() {
    let monitor = Monitor::with_invariant(
        MonitorConfig::named("json"),
        0i32,
        monitor_object::Assertion::new("value >= 0", |v: &i32| *v >= 0),
    );
    let log = Arc::new(EventLog::new());
    monitor.add_listener(log.clone());

    let mut guard = monitor.enter().unwrap();
    *guard = -1;
    assert!(guard.leave().is_err());

    assert_eq!(
        log.kinds(),
        vec!["call_enter", "return_from_enter", "violation", "leave"]
    );
    let json = log.to_json().unwrap();
    assert!(json.contains(r#""event":"violation""#));
    assert!(json.contains(r#""phase":"leave""#));
    assert!(json.contains(r#""monitor":"json""#));
}

#[test]
fn test_bounded_event_log() {
    let monitor = Monitor::new(0u8);
    let log = Arc::new(EventLog::with_capacity(3));
    monitor.add_listener(log.clone());

    for _ in 0..5 {
        monitor.do_within(|_| Ok(())).unwrap();
    }
    assert_eq!(log.len(), 3);
    assert_eq!(log.kinds(), vec!["call_enter", "return_from_enter", "leave"]);
}

#[test]
#[serial]
fn test_traced_queue_emits_through_tracing() {
    try_init_tracing("monitor_object=trace");

    let queue = Arc::new(
        BoundedQueue::with_config(1, MonitorConfig::named("traced_queue").traced()).unwrap(),
    );
    let consumer = {
        let queue = queue.clone();
        thread::spawn(move || queue.fetch_timeout(Duration::from_secs(5)).unwrap())
    };

    queue.deposit(7u8).unwrap();
    assert_eq!(consumer.join().unwrap(), Some(7));
    assert!(queue.monitor().stats().entries >= 2);
}
