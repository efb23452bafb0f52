/*!
 * Vote Monitor Tests
 * Round consensus, tie handling and reuse across rounds
 */

use monitor_object::blocking::VoteMonitor;
use monitor_object::core::errors::MonitorError;
use monitor_object::monitoring::EventLog;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn vote_all(monitor: &Arc<VoteMonitor>, votes: Vec<bool>) -> Vec<bool> {
    let handles: Vec<_> = votes
        .into_iter()
        .map(|vote| {
            let monitor = monitor.clone();
            thread::spawn(move || monitor.cast_vote_and_wait_for_result(vote).unwrap())
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_three_voters_two_for() {
    let monitor = Arc::new(VoteMonitor::new(3).unwrap());
    assert_eq!(vote_all(&monitor, vec![true, true, false]), vec![true, true, true]);
}

#[test]
fn test_majority_against() {
    let monitor = Arc::new(VoteMonitor::new(5).unwrap());
    let results = vote_all(&monitor, vec![true, false, false, true, false]);
    assert_eq!(results, vec![false; 5]);
}

#[test]
fn test_tie_returns_false() {
    let monitor = Arc::new(VoteMonitor::new(4).unwrap());
    let results = vote_all(&monitor, vec![true, true, false, false]);
    assert_eq!(results, vec![false; 4]);
}

#[test]
fn test_no_voter_returns_early() {
    let monitor = Arc::new(VoteMonitor::new(3).unwrap());
    let returned = Arc::new(AtomicUsize::new(0));

    let early: Vec<_> = (0..2)
        .map(|_| {
            let monitor = monitor.clone();
            let returned = returned.clone();
            thread::spawn(move || {
                let result = monitor.cast_vote_and_wait_for_result(true).unwrap();
                returned.fetch_add(1, Ordering::SeqCst);
                result
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(returned.load(Ordering::SeqCst), 0);
    assert_eq!(monitor.rounds_completed().unwrap(), 0);

    assert!(monitor.cast_vote_and_wait_for_result(false).unwrap());
    for handle in early {
        assert!(handle.join().unwrap());
    }
    assert_eq!(returned.load(Ordering::SeqCst), 2);
}

#[test]
fn test_rounds_with_random_votes() {
    const VOTERS: usize = 5;
    const ROUNDS: usize = 10;

    let monitor = Arc::new(VoteMonitor::new(VOTERS).unwrap());
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..ROUNDS {
        let votes: Vec<bool> = (0..VOTERS).map(|_| rng.gen()).collect();
        let expected = votes.iter().filter(|v| **v).count() * 2 > VOTERS;
        assert_eq!(vote_all(&monitor, votes), vec![expected; VOTERS]);
    }

    assert_eq!(monitor.rounds_completed().unwrap(), ROUNDS as u64);
    assert_eq!(monitor.monitor().stats().violations, 0);
}

#[test]
fn test_overlapping_rounds_stay_separate() {
    const VOTERS: usize = 3;
    const ROUNDS: usize = 20;

    // Voters loop independently, so next-round votes arrive while the
    // previous round is still being read
    let monitor = Arc::new(VoteMonitor::new(VOTERS).unwrap());
    let handles: Vec<_> = (0..VOTERS)
        .map(|voter| {
            let monitor = monitor.clone();
            thread::spawn(move || {
                (0..ROUNDS)
                    .map(|round| {
                        let vote = (round + voter) % 3 != 0;
                        monitor.cast_vote_and_wait_for_result(vote).unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<bool>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    // Every round has exactly one `false` vote, so every round passes
    for per_voter in &results {
        assert_eq!(per_voter, &vec![true; ROUNDS]);
    }
    assert_eq!(monitor.rounds_completed().unwrap(), ROUNDS as u64);
}

#[test]
fn test_round_emits_signal_and_leave() {
    let monitor = Arc::new(VoteMonitor::new(2).unwrap());
    let log = Arc::new(EventLog::new());
    monitor.monitor().add_listener(log.clone());

    vote_all(&monitor, vec![true, true]);
    assert!(log.kinds().contains(&"signaller_leaves"));
}

#[test]
fn test_invalid_voter_count() {
    assert_eq!(
        VoteMonitor::new(0).unwrap_err(),
        MonitorError::InvalidVoterCount(0)
    );
}
