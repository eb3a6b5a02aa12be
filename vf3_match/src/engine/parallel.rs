//! Worker pool over a single shared state stack.
//!
//! Every expansion flat-pushes its children onto the shared stack instead
//! of recursing, so any worker can pick them up. That maximizes sharing at
//! the cost of mutex traffic; see [`wls`](crate::engine::wls) for the
//! variant that keeps deep states worker-local.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::engine::stack::SharedStack;
use crate::engine::RunReport;
use crate::error::EngineError;
use crate::sink::SolutionSink;
use crate::solution::MatchingSolution;
use crate::state::{MatchVisitor, State};

/// Construction parameters for [`ParallelMatchingEngine`].
#[derive(Clone, Debug)]
pub struct ParallelConfig {
    /// Worker pool size; must be at least 1.
    pub num_threads: usize,
    /// Keep the found mappings in memory.
    pub store_solutions: bool,
    /// Pin worker `i` to CPU `base_cpu + i` when set.
    pub base_cpu: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        ParallelConfig {
            num_threads: 1,
            store_solutions: false,
            base_cpu: None,
        }
    }
}

impl ParallelConfig {
    /// A configuration with `num_threads` workers and defaults otherwise.
    pub fn with_threads(num_threads: usize) -> Self {
        ParallelConfig {
            num_threads,
            ..Default::default()
        }
    }
}

/// Parallel enumerator: `num_threads` OS threads popping from one shared
/// stack.
///
/// A visitor returning `true` raises a stop flag; other workers observe it
/// at their next loop iteration, so they may still record solutions for
/// states already in flight. This soft early-stop is the documented
/// behavior, not a synchronous cancellation.
pub struct ParallelMatchingEngine<S: State> {
    sink: SolutionSink<S>,
    config: ParallelConfig,
    shared: SharedStack<S>,
    stop: AtomicBool,
}

impl<S: State> ParallelMatchingEngine<S> {
    /// Build an engine with no visitor.
    pub fn new(config: ParallelConfig) -> Result<Self, EngineError> {
        Self::build(config, None)
    }

    /// Build an engine invoking `visitor` at every goal state.
    pub fn with_visitor(
        config: ParallelConfig,
        visitor: MatchVisitor<S>,
    ) -> Result<Self, EngineError> {
        Self::build(config, Some(visitor))
    }

    fn build(config: ParallelConfig, visitor: Option<MatchVisitor<S>>) -> Result<Self, EngineError> {
        if config.num_threads == 0 {
            return Err(EngineError::InvalidThreadCount(0));
        }
        let sink = match visitor {
            Some(visitor) => SolutionSink::with_visitor(visitor, config.store_solutions),
            None => SolutionSink::new(config.store_solutions),
        };
        Ok(ParallelMatchingEngine {
            sink,
            config,
            shared: SharedStack::new(),
            stop: AtomicBool::new(false),
        })
    }

    /// Enumerate every match reachable from `seed`.
    ///
    /// The seed is expanded inline on the calling thread so the shared
    /// stack is populated before the pool starts; the call then blocks
    /// until every worker has finished. A worker that panics propagates
    /// the panic to this caller once the pool unwinds; no worker dies
    /// silently.
    pub fn find_all(&self, seed: &S) -> bool {
        self.stop.store(false, Ordering::Release);

        // Bootstrap expansion: children go to the shared stack so every
        // worker can find work.
        if self.process_state(seed) {
            self.stop.store(true, Ordering::Release);
        }

        info!(
            "starting pool: {} workers, {} bootstrap states",
            self.config.num_threads,
            self.shared.len()
        );

        thread::scope(|scope| {
            for worker in 0..self.config.num_threads {
                scope.spawn(move || self.worker_loop(worker));
            }
        });

        // A raised stop flag can leave queued states behind.
        self.shared.clear();
        debug_assert_eq!(self.shared.active_workers(), 0);
        true
    }

    /// Enumerate all matches from `seed` and report count and
    /// time-to-first-solution.
    pub fn run(&self, seed: &S) -> RunReport {
        let start = Instant::now();
        self.find_all(seed);
        RunReport {
            solution_count: self.sink.count(),
            first_solution: self.sink.first_time().map(|t| t.duration_since(start)),
        }
    }

    fn worker_loop(&self, worker: usize) {
        pin_worker(self.config.base_cpu, worker);
        debug!("worker {worker} started");

        let mut was_idle = true;
        let mut processed = 0usize;
        while !self.stop.load(Ordering::Acquire) {
            let Some(state) = self.shared.take(&mut was_idle) else {
                debug!("worker {worker} done: {processed} states processed");
                return;
            };
            processed += 1;
            if self.process_state(&state) {
                self.stop.store(true, Ordering::Release);
            }
        }

        // Early stop: drop the activity claim so parked workers see the
        // pool drain.
        self.shared.retire(&mut was_idle);
        debug!("worker {worker} stopped early: {processed} states processed");
    }

    /// Expand one state: record it if it is a goal, drop it if dead,
    /// otherwise push every feasible child to the shared stack.
    ///
    /// Returns true iff a visitor requested early termination.
    fn process_state(&self, state: &S) -> bool {
        if state.is_goal() {
            return self.sink.record(state);
        }
        if state.is_dead() {
            return false;
        }

        let mut prev = None;
        while let Some((n1, n2)) = state.next_pair(prev) {
            prev = Some((n1, n2));
            if state.is_feasible(n1, n2) {
                self.shared.push(state.extend(n1, n2));
            }
        }
        false
    }

    /// Worker pool size.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.config.num_threads
    }

    /// States currently queued on the shared stack.
    #[must_use]
    pub fn pending_states(&self) -> usize {
        self.shared.len()
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
        self.stop.store(false, Ordering::Release);
    }
}

/// Pin the calling worker to `base + worker` when a base CPU is set.
pub(crate) fn pin_worker(base_cpu: Option<usize>, worker: usize) {
    if let Some(base) = base_cpu {
        let core = core_affinity::CoreId { id: base + worker };
        if !core_affinity::set_for_current(core) {
            warn!("failed to pin worker {worker} to cpu {}", base + worker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substate::tests::{context, k3_into_k4, single_node_state};
    use crate::substate::Vf3SubState;
    use vf3_graph::Graph;

    #[test]
    fn rejects_zero_workers() {
        let result: Result<ParallelMatchingEngine<Vf3SubState<i32>>, _> =
            ParallelMatchingEngine::new(ParallelConfig::with_threads(0));
        assert!(matches!(result, Err(EngineError::InvalidThreadCount(0))));
    }

    #[test]
    fn single_worker_matches_sequential_count() {
        let engine = ParallelMatchingEngine::new(ParallelConfig::with_threads(1)).unwrap();
        engine.find_all(&k3_into_k4());
        assert_eq!(engine.solution_count(), 24);
        assert_eq!(engine.pending_states(), 0);
        assert_eq!(engine.shared.active_workers(), 0);
    }

    #[test]
    fn goal_seed_is_recorded_during_bootstrap() {
        let engine = ParallelMatchingEngine::new(ParallelConfig::with_threads(4)).unwrap();
        engine.find_all(&single_node_state().extend(0, 0));
        assert_eq!(engine.solution_count(), 1);
    }

    #[test]
    fn dead_seed_terminates_immediately() {
        let mut pattern = Graph::new();
        pattern.add_node(1);
        let mut target = Graph::new();
        target.add_node(2);
        let seed = Vf3SubState::new(context(pattern, target));

        let engine = ParallelMatchingEngine::new(ParallelConfig::with_threads(4)).unwrap();
        engine.find_all(&seed);
        assert_eq!(engine.solution_count(), 0);
        assert_eq!(engine.shared.active_workers(), 0);
    }

    #[test]
    fn visitor_stop_leaves_stacks_clean() {
        let engine: ParallelMatchingEngine<Vf3SubState<i32>> =
            ParallelMatchingEngine::with_visitor(
                ParallelConfig::with_threads(4),
                Box::new(|_| true),
            )
            .unwrap();
        engine.find_all(&k3_into_k4());
        assert!(engine.solution_count() >= 1);
        assert!(engine.solution_count() <= 24);
        assert_eq!(engine.pending_states(), 0);
        assert_eq!(engine.shared.active_workers(), 0);
    }
}
