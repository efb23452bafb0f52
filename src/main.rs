/*!
 * Monitor Object - Demo Entry Point
 *
 * Runs the two blocking structures under real contention:
 * - Producers and consumers sharing a small bounded queue
 * - Several election rounds on a vote monitor
 */

use std::error::Error;
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

use monitor_object::core::limits::{DEMO_FETCH_TIMEOUT, DEMO_QUEUE_CAPACITY, DEMO_VOTERS};
use monitor_object::monitoring::span_operation;
use monitor_object::{init_tracing, BoundedQueue, MonitorConfig, MonitorResult, VoteMonitor};

const PRODUCERS: usize = 3;
const ITEMS_PER_PRODUCER: usize = 20;
const ELECTION_ROUNDS: usize = 3;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize structured tracing
    init_tracing();

    info!("Monitor demo starting...");
    info!("================================================");

    run_queue_demo()?;
    run_vote_demo()?;

    info!("================================================");
    info!("Monitor demo finished");
    Ok(())
}

fn run_queue_demo() -> MonitorResult<()> {
    let operation = span_operation("bounded_queue_demo");
    let _entered = operation.enter();

    let queue = Arc::new(BoundedQueue::with_config(
        DEMO_QUEUE_CAPACITY,
        MonitorConfig::named("demo_queue").traced(),
    )?);
    info!(
        capacity = queue.capacity(),
        producers = PRODUCERS,
        items = PRODUCERS * ITEMS_PER_PRODUCER,
        "Starting producers"
    );

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let queue = queue.clone();
            let span = operation.span().clone();
            thread::spawn(move || -> MonitorResult<()> {
                let _entered = span.enter();
                for item in 0..ITEMS_PER_PRODUCER {
                    queue.deposit(producer * ITEMS_PER_PRODUCER + item)?;
                }
                Ok(())
            })
        })
        .collect();

    let mut received = Vec::with_capacity(PRODUCERS * ITEMS_PER_PRODUCER);
    while received.len() < PRODUCERS * ITEMS_PER_PRODUCER {
        match queue.fetch_timeout(DEMO_FETCH_TIMEOUT)? {
            Some(item) => received.push(item),
            None => {
                warn!(received = received.len(), "Consumer stalled, giving up");
                break;
            }
        }
    }

    for producer in producers {
        match producer.join() {
            Ok(result) => result?,
            Err(_) => warn!("Producer thread panicked"),
        }
    }

    operation.record_items_processed(received.len());
    let stats = queue.monitor().stats();
    info!(
        received = received.len(),
        entries = stats.entries,
        waits = stats.waits,
        signals = stats.signals,
        mean_hold_us = stats.mean_hold_micros(),
        "Queue demo complete"
    );
    Ok(())
}

fn run_vote_demo() -> MonitorResult<()> {
    let operation = span_operation("vote_demo");
    let _entered = operation.enter();

    let votes = Arc::new(VoteMonitor::new(DEMO_VOTERS)?);
    info!(voters = DEMO_VOTERS, rounds = ELECTION_ROUNDS, "Starting elections");

    for round in 0..ELECTION_ROUNDS {
        let voters: Vec<_> = (0..DEMO_VOTERS)
            .map(|voter| {
                let votes = votes.clone();
                // Round 0: all for, round 1: all against, later rounds mixed
                let ballot = match round {
                    0 => true,
                    1 => false,
                    _ => voter % 2 == 0,
                };
                thread::spawn(move || votes.cast_vote_and_wait_for_result(ballot))
            })
            .collect();

        let mut results = Vec::with_capacity(DEMO_VOTERS);
        for voter in voters {
            match voter.join() {
                Ok(result) => results.push(result?),
                Err(_) => warn!(round, "Voter thread panicked"),
            }
        }

        let unanimous = results.windows(2).all(|pair| pair[0] == pair[1]);
        info!(
            round,
            result = results.first().copied().unwrap_or(false),
            unanimous,
            "Election round closed"
        );
    }

    operation.record_items_processed(ELECTION_ROUNDS * DEMO_VOTERS);
    info!(
        rounds = votes.rounds_completed()?,
        violations = votes.monitor().stats().violations,
        "Vote demo complete"
    );
    Ok(())
}
