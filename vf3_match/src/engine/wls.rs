//! Worker pool with per-worker local stacks.
//!
//! Deep states represent small subtrees: processing them on the worker
//! that produced them preserves DFS locality and keeps them off the shared
//! mutex. Shallow states represent large subtrees and are published to the
//! shared stack for load balance, as is everything that overflows a
//! worker's local cap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::engine::parallel::pin_worker;
use crate::engine::stack::{LocalStack, SharedStack};
use crate::engine::RunReport;
use crate::error::EngineError;
use crate::sink::SolutionSink;
use crate::solution::MatchingSolution;
use crate::state::{MatchVisitor, State};

/// Construction parameters for [`ParallelMatchingEngineWls`].
#[derive(Clone, Debug)]
pub struct WlsConfig {
    /// Worker pool size; must be at least 1.
    pub num_threads: usize,
    /// Keep the found mappings in memory.
    pub store_solutions: bool,
    /// Pin worker `i` to CPU `base_cpu + i` when set.
    pub base_cpu: Option<usize>,
    /// States mapped below this depth go to the shared stack.
    pub shallow_threshold: usize,
    /// Local-stack size at which children spill to the shared stack.
    pub local_cap: usize,
}

impl Default for WlsConfig {
    fn default() -> Self {
        WlsConfig {
            num_threads: 1,
            store_solutions: false,
            base_cpu: None,
            shallow_threshold: 3,
            local_cap: 50,
        }
    }
}

impl WlsConfig {
    /// A configuration with `num_threads` workers and defaults otherwise.
    pub fn with_threads(num_threads: usize) -> Self {
        WlsConfig {
            num_threads,
            ..Default::default()
        }
    }
}

/// Parallel enumerator with work-local stacks.
///
/// The put policy for a child produced by a worker: below
/// `shallow_threshold` mapped pairs, or once the worker's local stack has
/// reached `local_cap` states, the child is published to the shared stack;
/// otherwise it stays on the worker's local stack. Bootstrap children
/// always go to the shared stack. Workers drain their local stack before
/// contending for shared work, and a worker with local work never touches
/// the termination detector: local states can only be consumed by their
/// owner, so they cannot feed other workers.
pub struct ParallelMatchingEngineWls<S: State> {
    sink: SolutionSink<S>,
    config: WlsConfig,
    shared: SharedStack<S>,
    stop: AtomicBool,
}

impl<S: State> ParallelMatchingEngineWls<S> {
    /// Build an engine with no visitor.
    pub fn new(config: WlsConfig) -> Result<Self, EngineError> {
        Self::build(config, None)
    }

    /// Build an engine invoking `visitor` at every goal state.
    pub fn with_visitor(
        config: WlsConfig,
        visitor: MatchVisitor<S>,
    ) -> Result<Self, EngineError> {
        Self::build(config, Some(visitor))
    }

    fn build(config: WlsConfig, visitor: Option<MatchVisitor<S>>) -> Result<Self, EngineError> {
        if config.num_threads == 0 {
            return Err(EngineError::InvalidThreadCount(0));
        }
        let sink = match visitor {
            Some(visitor) => SolutionSink::with_visitor(visitor, config.store_solutions),
            None => SolutionSink::new(config.store_solutions),
        };
        Ok(ParallelMatchingEngineWls {
            sink,
            config,
            shared: SharedStack::new(),
            stop: AtomicBool::new(false),
        })
    }

    /// Enumerate every match reachable from `seed`.
    ///
    /// The seed is expanded inline on the calling thread (children to the
    /// shared stack), then the call blocks until every worker has
    /// finished. A worker that panics propagates the panic to this caller
    /// once the pool unwinds; no worker dies silently.
    pub fn find_all(&self, seed: &S) -> bool {
        self.stop.store(false, Ordering::Release);

        if self.process_state(seed, None) {
            self.stop.store(true, Ordering::Release);
        }

        info!(
            "starting WLS pool: {} workers, shallow<{}, cap {}, {} bootstrap states",
            self.config.num_threads,
            self.config.shallow_threshold,
            self.config.local_cap,
            self.shared.len()
        );

        thread::scope(|scope| {
            for worker in 0..self.config.num_threads {
                scope.spawn(move || self.worker_loop(worker));
            }
        });

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

        let mut local = LocalStack::new();
        let mut was_idle = true;
        let mut processed = 0usize;
        while !self.stop.load(Ordering::Acquire) {
            // Local work first: no locking, and no detector interaction.
            let state = match local.pop() {
                Some(state) => state,
                None => match self.shared.take(&mut was_idle) {
                    Some(state) => state,
                    None => {
                        debug!("worker {worker} done: {processed} states processed");
                        return;
                    }
                },
            };
            processed += 1;
            if self.process_state(&state, Some(&mut local)) {
                self.stop.store(true, Ordering::Release);
            }
        }

        // Early stop: local states are abandoned and the activity claim
        // released.
        local.clear();
        self.shared.retire(&mut was_idle);
        debug!("worker {worker} stopped early: {processed} states processed");
    }

    /// Expand one state, routing each feasible child by the put policy.
    ///
    /// `local` is `None` during bootstrap, which forces every child to the
    /// shared stack. Returns true iff a visitor requested early
    /// termination.
    fn process_state(&self, state: &S, mut local: Option<&mut LocalStack<S>>) -> bool {
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
                let child = state.extend(n1, n2);
                self.put_state(child, local.as_deref_mut());
            }
        }
        false
    }

    fn put_state(&self, child: S, local: Option<&mut LocalStack<S>>) {
        match local {
            Some(local)
                if child.core_len() >= self.config.shallow_threshold
                    && local.len() < self.config.local_cap =>
            {
                local.push(child);
            }
            _ => {
                trace!("publishing state at depth {}", child.core_len());
                self.shared.push(child);
            }
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substate::tests::k3_into_k4;
    use crate::substate::Vf3SubState;

    #[test]
    fn rejects_zero_workers() {
        let result: Result<ParallelMatchingEngineWls<Vf3SubState<i32>>, _> =
            ParallelMatchingEngineWls::new(WlsConfig::with_threads(0));
        assert!(matches!(result, Err(EngineError::InvalidThreadCount(0))));
    }

    #[test]
    fn zero_local_cap_forces_all_children_shared() {
        let config = WlsConfig {
            num_threads: 2,
            local_cap: 0,
            ..Default::default()
        };
        let engine = ParallelMatchingEngineWls::new(config).unwrap();
        engine.find_all(&k3_into_k4());
        assert_eq!(engine.solution_count(), 24);
        assert_eq!(engine.pending_states(), 0);
    }

    #[test]
    fn zero_shallow_threshold_disables_shallow_rule() {
        let config = WlsConfig {
            num_threads: 2,
            shallow_threshold: 0,
            ..Default::default()
        };
        let engine = ParallelMatchingEngineWls::new(config).unwrap();
        engine.find_all(&k3_into_k4());
        assert_eq!(engine.solution_count(), 24);
        assert_eq!(engine.shared.active_workers(), 0);
    }

    #[test]
    fn put_policy_routes_by_depth_and_cap() {
        let config = WlsConfig {
            num_threads: 1,
            shallow_threshold: 2,
            local_cap: 1,
            ..Default::default()
        };
        let engine: ParallelMatchingEngineWls<Vf3SubState<i32>> =
            ParallelMatchingEngineWls::new(config).unwrap();

        let seed = k3_into_k4();
        let shallow = seed.extend(seed.next_pair(None).unwrap().0, 0);
        assert_eq!(shallow.core_len(), 1);

        let mut local = LocalStack::new();
        // Depth 1 < threshold 2: shared even with local room.
        engine.put_state(shallow.clone(), Some(&mut local));
        assert_eq!(local.len(), 0);
        assert_eq!(engine.pending_states(), 1);

        let deep = shallow.extend(shallow.next_pair(None).unwrap().0, 1);
        assert_eq!(deep.core_len(), 2);

        // Deep enough and local has room.
        engine.put_state(deep.clone(), Some(&mut local));
        assert_eq!(local.len(), 1);

        // Local at cap: spill.
        engine.put_state(deep.clone(), Some(&mut local));
        assert_eq!(local.len(), 1);
        assert_eq!(engine.pending_states(), 2);

        // Bootstrap always publishes.
        engine.put_state(deep, None);
        assert_eq!(engine.pending_states(), 3);
    }
}
