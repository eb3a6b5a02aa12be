//! Thread-safe accumulator for found solutions.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::solution::MatchingSolution;
use crate::state::{MatchVisitor, State};

/// Collects the solution count, the first-solution timestamp, optionally
/// the solutions themselves, and delegates each goal to an optional
/// visitor.
///
/// [`record`](SolutionSink::record) is safe under concurrent invocation;
/// the order of the stored solution list is unspecified across threads.
pub struct SolutionSink<S> {
    count: AtomicUsize,
    first_seen: AtomicBool,
    first_time: Mutex<Option<Instant>>,
    solutions: Option<Mutex<Vec<MatchingSolution>>>,
    visitor: Option<MatchVisitor<S>>,
}

impl<S: State> SolutionSink<S> {
    /// A sink with no visitor.
    pub fn new(store_solutions: bool) -> Self {
        Self::build(None, store_solutions)
    }

    /// A sink delegating every goal to `visitor`.
    pub fn with_visitor(visitor: MatchVisitor<S>, store_solutions: bool) -> Self {
        Self::build(Some(visitor), store_solutions)
    }

    fn build(visitor: Option<MatchVisitor<S>>, store_solutions: bool) -> Self {
        SolutionSink {
            count: AtomicUsize::new(0),
            first_seen: AtomicBool::new(false),
            first_time: Mutex::new(None),
            solutions: store_solutions.then(|| Mutex::new(Vec::new())),
            visitor,
        }
    }

    /// Record a goal state.
    ///
    /// Increments the counter, captures the first-solution timestamp
    /// exactly once, appends the extracted mapping when storage is
    /// enabled, and returns the visitor's verdict (`false`, continue, when
    /// no visitor is attached).
    pub fn record(&self, state: &S) -> bool {
        self.count.fetch_add(1, Ordering::Relaxed);

        // One-shot flag resolves the cross-worker race on the timestamp.
        if !self.first_seen.swap(true, Ordering::AcqRel) {
            *self.first_time.lock().unwrap() = Some(Instant::now());
        }

        if let Some(solutions) = &self.solutions {
            solutions.lock().unwrap().push(state.solution());
        }

        match &self.visitor {
            Some(visit) => visit(state),
            None => false,
        }
    }

    /// Number of solutions recorded since the last reset.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Timestamp of the first recorded solution, if any.
    #[must_use]
    pub fn first_time(&self) -> Option<Instant> {
        *self.first_time.lock().unwrap()
    }

    /// Whether solution storage is enabled.
    #[must_use]
    pub fn stores_solutions(&self) -> bool {
        self.solutions.is_some()
    }

    /// The stored solutions. Empty when storage is disabled.
    #[must_use]
    pub fn solutions(&self) -> Vec<MatchingSolution> {
        match &self.solutions {
            Some(solutions) => solutions.lock().unwrap().clone(),
            None => Vec::new(),
        }
    }

    /// Remove and return the stored solutions.
    pub fn drain_solutions(&self) -> Vec<MatchingSolution> {
        match &self.solutions {
            Some(solutions) => std::mem::take(&mut *solutions.lock().unwrap()),
            None => Vec::new(),
        }
    }

    /// Zero the counter and clear the one-shot first-solution flag.
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
        *self.first_time.lock().unwrap() = None;
        self.first_seen.store(false, Ordering::Release);
        if let Some(solutions) = &self.solutions {
            solutions.lock().unwrap().clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substate::tests::single_node_state;
    use crate::substate::Vf3SubState;

    #[test]
    fn counts_and_timestamps() {
        let sink: SolutionSink<Vf3SubState<i32>> = SolutionSink::new(false);
        let goal = single_node_state().extend(0, 0);

        assert_eq!(sink.count(), 0);
        assert!(sink.first_time().is_none());

        assert!(!sink.record(&goal));
        assert!(!sink.record(&goal));
        assert_eq!(sink.count(), 2);

        let first = sink.first_time().expect("first_time set after record");
        assert!(!sink.record(&goal));
        assert_eq!(sink.first_time(), Some(first), "timestamp is one-shot");
    }

    #[test]
    fn stores_solutions_when_enabled() {
        let sink: SolutionSink<Vf3SubState<i32>> = SolutionSink::new(true);
        let goal = single_node_state().extend(0, 0);
        sink.record(&goal);
        let solutions = sink.drain_solutions();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].pairs(), &[(0, 0)]);
        assert!(sink.drain_solutions().is_empty());
    }

    #[test]
    fn visitor_verdict_is_returned() {
        let sink: SolutionSink<Vf3SubState<i32>> =
            SolutionSink::with_visitor(Box::new(|_| true), false);
        let goal = single_node_state().extend(0, 0);
        assert!(sink.record(&goal));
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn reset_clears_counter_and_flag() {
        let sink: SolutionSink<Vf3SubState<i32>> = SolutionSink::new(true);
        let goal = single_node_state().extend(0, 0);
        sink.record(&goal);
        sink.reset();
        assert_eq!(sink.count(), 0);
        assert!(sink.first_time().is_none());
        assert!(sink.solutions().is_empty());
        sink.record(&goal);
        assert_eq!(sink.count(), 1);
        assert!(sink.first_time().is_some());
    }
}
