//! Search engines over the [`State`](crate::state::State) contract.
//!
//! [`MatchingEngine`] is the single-threaded depth-first enumerator; the
//! [`parallel`] and [`wls`] modules hold the worker-pool engines built on
//! the shared [`stack`] plumbing.

pub mod parallel;
pub(crate) mod stack;
pub mod wls;

use std::time::{Duration, Instant};

use tracing::info;

use crate::sink::SolutionSink;
use crate::solution::MatchingSolution;
use crate::state::{MatchVisitor, State};

/// Outcome of one engine run.
#[derive(Clone, Copy, Debug)]
pub struct RunReport {
    /// Solutions recorded during the run.
    pub solution_count: usize,
    /// Time from the start of the run to the first recorded solution.
    pub first_solution: Option<Duration>,
}

/// Single-threaded depth-first enumerator.
///
/// Exploration uses the native call stack; each extended child state lives
/// exactly for the scope of its recursive call, so every exit path
/// (including an unwinding panic from a state operation) releases the
/// states acquired on the way down.
pub struct MatchingEngine<S: State> {
    sink: SolutionSink<S>,
}

impl<S: State> MatchingEngine<S> {
    /// An engine with no visitor.
    pub fn new(store_solutions: bool) -> Self {
        MatchingEngine {
            sink: SolutionSink::new(store_solutions),
        }
    }

    /// An engine invoking `visitor` at every goal state.
    pub fn with_visitor(visitor: MatchVisitor<S>, store_solutions: bool) -> Self {
        MatchingEngine {
            sink: SolutionSink::with_visitor(visitor, store_solutions),
        }
    }

    /// Search depth-first for one match reachable from `seed`.
    ///
    /// Returns true as soon as a goal is recorded; siblings are explored
    /// in [`next_pair`](State::next_pair) order.
    pub fn find_first(&self, seed: &S) -> bool {
        if seed.is_goal() {
            self.sink.record(seed);
            return true;
        }
        if seed.is_dead() {
            return false;
        }

        let mut prev = None;
        while let Some((n1, n2)) = seed.next_pair(prev) {
            prev = Some((n1, n2));
            if seed.is_feasible(n1, n2) {
                let child = seed.extend(n1, n2);
                if self.find_first(&child) {
                    return true;
                }
            }
        }
        false
    }

    /// Enumerate every match reachable from `seed`.
    ///
    /// Returns true iff a visitor requested early termination; without a
    /// visitor the enumeration always runs to exhaustion and returns
    /// false.
    pub fn find_all(&self, seed: &S) -> bool {
        if seed.is_goal() {
            return self.sink.record(seed);
        }
        if seed.is_dead() {
            return false;
        }

        let mut prev = None;
        while let Some((n1, n2)) = seed.next_pair(prev) {
            prev = Some((n1, n2));
            if seed.is_feasible(n1, n2) {
                let child = seed.extend(n1, n2);
                if self.find_all(&child) {
                    return true;
                }
            }
        }
        false
    }

    /// Enumerate all matches from `seed` and report count and
    /// time-to-first-solution.
    pub fn run(&self, seed: &S) -> RunReport {
        let start = Instant::now();
        self.find_all(seed);
        let report = RunReport {
            solution_count: self.sink.count(),
            first_solution: self.sink.first_time().map(|t| t.duration_since(start)),
        };
        info!(
            "sequential search done: {} solutions",
            report.solution_count
        );
        report
    }

    /// Solutions recorded so far.
    #[must_use]
    pub fn solution_count(&self) -> usize {
        self.sink.count()
    }

    /// The stored solutions; empty unless `store_solutions` was set.
    #[must_use]
    pub fn solutions(&self) -> Vec<MatchingSolution> {
        self.sink.solutions()
    }

    /// Timestamp of the first recorded solution.
    #[must_use]
    pub fn first_solution_time(&self) -> Option<Instant> {
        self.sink.first_time()
    }

    /// Clear the counter, the first-solution flag and any stored
    /// solutions.
    pub fn reset(&self) {
        self.sink.reset();
    }
}
