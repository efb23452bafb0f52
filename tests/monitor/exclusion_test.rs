/*!
 * Mutual Exclusion and Invariant Tests
 */

use monitor_object::core::errors::{MonitorError, Phase};
use monitor_object::core::sync::{Invariant, Monitor, MonitorConfig};
use monitor_object::core::Guard;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Default)]
struct Account {
    checking: i64,
    savings: i64,
    total: i64,
}

impl Invariant for Account {
    fn invariant_name(&self) -> &'static str {
        "checking + savings == total"
    }

    fn holds(&self) -> bool {
        self.checking + self.savings == self.total
    }

    fn summary(&self) -> String {
        format!(
            "checking={} savings={} total={}",
            self.checking, self.savings, self.total
        )
    }
}

#[test]
fn test_mutual_exclusion_under_contention() {
    let monitor = Arc::new(Monitor::new(0u64));
    let inside = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let monitor = monitor.clone();
            let inside = inside.clone();
            let overlaps = overlaps.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    monitor
                        .do_within(|guard| {
                            if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                                overlaps.fetch_add(1, Ordering::SeqCst);
                            }
                            **guard += 1;
                            thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(monitor.stats().entries, 8 * 250);
    assert_eq!(Arc::try_unwrap(monitor).unwrap().into_inner(), 8 * 250);
}

#[test]
fn test_transfers_keep_invariant() {
    let monitor = Arc::new(Monitor::guarded(
        MonitorConfig::named("account"),
        Account {
            checking: 100,
            savings: 0,
            total: 100,
        },
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let monitor = monitor.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let mut guard = monitor.enter().unwrap();
                    let amount = if i % 2 == 0 { 1 } else { -1 };
                    guard.checking -= amount;
                    guard.savings += amount;
                    guard.leave().unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(monitor.stats().violations, 0);
}

#[test]
fn test_broken_invariant_reported_on_leave_and_enter() {
    let monitor = Monitor::guarded(MonitorConfig::named("account"), Account::default());

    let result = monitor.do_within(|guard| {
        guard.checking = 10;
        Ok(())
    });
    match result {
        Err(MonitorError::InvariantViolation {
            monitor,
            invariant,
            phase,
            state,
        }) => {
            assert_eq!(monitor, "account");
            assert_eq!(invariant, "checking + savings == total");
            assert_eq!(phase, Phase::Leave);
            assert_eq!(state, "checking=10 savings=0 total=0");
        }
        other => panic!("expected violation, got {:?}", other),
    }

    assert!(!monitor.is_occupied());
    let err = monitor.enter().map(|_| ()).unwrap_err();
    assert!(err.is_violation());
    assert_eq!(monitor.stats().violations, 2);
}

#[test]
fn test_guard_reports_activity() {
    let monitor = Monitor::new(String::from("state"));
    let guard = monitor.enter().unwrap();
    assert!(guard.is_active());
    assert_eq!(guard.resource_type(), "monitor");
    assert_eq!(guard.metadata().owner.as_deref(), Some(monitor.name()));
    guard.leave().unwrap();
}

#[test]
fn test_dropped_guard_leaves() {
    let monitor = Monitor::new(1);
    {
        let mut guard = monitor.enter().unwrap();
        *guard = 2;
    }
    assert!(!monitor.is_occupied());
    assert_eq!(monitor.do_within(|guard| Ok(**guard)).unwrap(), 2);
}

#[test]
fn test_config_from_json() {
    let config: MonitorConfig =
        serde_json::from_str(r#"{"name":"from_json","invariant_checks":"never"}"#).unwrap();
    let monitor = Monitor::guarded(config, Account::default());

    let mut guard = monitor.enter().unwrap();
    guard.total = 1;
    assert!(guard.leave().is_ok());
    assert_eq!(monitor.name(), "from_json");
}
