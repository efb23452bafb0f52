/*!
 * Vote Monitor
 *
 * Reusable N-of-N rendezvous. Each round collects exactly `total_votes`
 * boolean votes; every voter of the round blocks until the last vote is in
 * and then returns the same majority result.
 *
 * # Rounds
 *
 * The voter completing a round closes it by setting `observers` to the
 * number of participants. Each participant decrements `observers` once it
 * has read the result; the last one resets the tally and reopens the ballot.
 * Voters of the next round arriving while `observers > 0` wait on
 * `ballot_open`, so a draining round never sees their votes.
 */

use crate::core::errors::{MonitorError, MonitorResult};
use crate::core::sync::{Assertion, Condition, Invariant, Monitor, MonitorConfig};
use std::fmt;
use tracing::debug;

/// Tally of the current round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    total_votes: usize,
    votes_for: usize,
    votes_against: usize,
    rounds: u64,
    observers: usize,
}

impl Ballot {
    fn new(total_votes: usize) -> Self {
        Self {
            total_votes,
            votes_for: 0,
            votes_against: 0,
            rounds: 0,
            observers: 0,
        }
    }

    #[inline]
    pub fn cast(&self) -> usize {
        self.votes_for + self.votes_against
    }

    /// Whether the current round has closed and results are being read
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.observers > 0
    }

    /// Majority of the closed round; ties lose
    #[inline]
    pub fn outcome(&self) -> bool {
        self.votes_for > self.votes_against
    }

    #[inline]
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    fn record(&mut self, vote: bool) {
        if vote {
            self.votes_for += 1;
        } else {
            self.votes_against += 1;
        }
    }

    fn close(&mut self) {
        self.observers = self.total_votes;
        self.rounds += 1;
    }

    fn reopen(&mut self) {
        self.votes_for = 0;
        self.votes_against = 0;
    }
}

impl Invariant for Ballot {
    fn invariant_name(&self) -> &'static str {
        "cast < total while open, cast == total while closed"
    }

    fn holds(&self) -> bool {
        if self.observers == 0 {
            self.cast() < self.total_votes
        } else {
            self.cast() == self.total_votes && self.observers <= self.total_votes
        }
    }

    fn summary(&self) -> String {
        format!(
            "for={} against={} total={} observers={} rounds={}",
            self.votes_for, self.votes_against, self.total_votes, self.observers, self.rounds
        )
    }
}

/// Barrier that computes a shared majority result per round
///
/// # Example
///
/// ```
/// use monitor_object::blocking::VoteMonitor;
///
/// let single = VoteMonitor::new(1).unwrap();
/// assert!(single.cast_vote_and_wait_for_result(true).unwrap());
/// assert!(!single.cast_vote_and_wait_for_result(false).unwrap());
/// assert_eq!(single.rounds_completed().unwrap(), 2);
/// ```
pub struct VoteMonitor {
    monitor: Monitor<Ballot>,
    election_done: Condition<Ballot>,
    ballot_open: Condition<Ballot>,
    total_votes: usize,
}

impl VoteMonitor {
    /// Monitor for rounds of `total_votes` voters
    pub fn new(total_votes: usize) -> MonitorResult<Self> {
        Self::with_config(total_votes, MonitorConfig::named("vote_monitor"))
    }

    pub fn with_config(total_votes: usize, config: MonitorConfig) -> MonitorResult<Self> {
        if total_votes == 0 {
            return Err(MonitorError::InvalidVoterCount(total_votes));
        }

        let monitor = Monitor::guarded(config, Ballot::new(total_votes));
        let election_done = monitor.make_condition_with(
            "election_done",
            Assertion::new("round closed", |b: &Ballot| b.is_closed()),
        );
        let ballot_open = monitor.make_condition_with(
            "ballot_open",
            Assertion::new("no observers left", |b: &Ballot| !b.is_closed()),
        );

        Ok(Self {
            monitor,
            election_done,
            ballot_open,
            total_votes,
        })
    }

    /// Cast `vote` and block until all voters of this round have voted
    ///
    /// Returns `true` iff strictly more than half of the round voted `true`.
    pub fn cast_vote_and_wait_for_result(&self, vote: bool) -> MonitorResult<bool> {
        let mut guard = self.monitor.enter()?;
        while guard.is_closed() {
            self.ballot_open.wait(&mut guard)?;
        }

        guard.record(vote);
        let round = guard.rounds();
        if guard.cast() == self.total_votes {
            guard.close();
            debug!(
                monitor = self.monitor.name(),
                round = guard.rounds(),
                result = guard.outcome(),
                "round closed"
            );
        } else {
            while guard.rounds() == round {
                self.election_done.wait(&mut guard)?;
            }
        }

        let result = guard.outcome();
        guard.observers -= 1;

        if guard.is_closed() {
            if !self.election_done.is_empty(&guard)? {
                self.election_done.signal_and_leave(guard)?;
                return Ok(result);
            }
        } else {
            guard.reopen();
            self.ballot_open.signal_all(&mut guard)?;
        }
        guard.leave_with(result)
    }

    /// Number of rounds that have closed
    pub fn rounds_completed(&self) -> MonitorResult<u64> {
        self.monitor.do_within(|guard| Ok(guard.rounds()))
    }

    #[inline]
    pub fn total_votes(&self) -> usize {
        self.total_votes
    }

    /// The underlying monitor, for listeners and statistics
    pub fn monitor(&self) -> &Monitor<Ballot> {
        &self.monitor
    }
}

impl fmt::Debug for VoteMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoteMonitor")
            .field("monitor", &self.monitor.name())
            .field("total_votes", &self.total_votes)
            .finish()
    }
}
