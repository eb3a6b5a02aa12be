//! The search-node contract the engines explore.

use vf3_graph::NodeId;

use crate::solution::MatchingSolution;

/// A partial mapping between a pattern and a target graph, together with
/// whatever bookkeeping its feasibility checks need.
///
/// The engines are polymorphic over this contract and never look inside a
/// state. Implementations must uphold three invariants:
///
/// - [`next_pair`](State::next_pair) is pure and deterministic given the
///   state;
/// - [`extend`](State::extend) produces a child whose mutation is
///   independent of its parent (sibling isolation);
/// - extending a feasible pair never reduces the pruning power of
///   descendants.
pub trait State: Send {
    /// True iff the partial mapping is a complete, valid match.
    fn is_goal(&self) -> bool;

    /// True iff no extension can lead to a goal.
    fn is_dead(&self) -> bool;

    /// Current mapping size; doubles as the search depth.
    fn core_len(&self) -> usize;

    /// Enumerate candidate pair extensions.
    ///
    /// Given the previously returned pair (or `None` to start), returns
    /// the next candidate lexicographically, or `None` when exhausted.
    fn next_pair(&self, prev: Option<(NodeId, NodeId)>) -> Option<(NodeId, NodeId)>;

    /// Cheap-then-expensive pruning check for one candidate pair.
    fn is_feasible(&self, n1: NodeId, n2: NodeId) -> bool;

    /// Produce an independently owned child state with `(n1, n2)` added.
    fn extend(&self, n1: NodeId, n2: NodeId) -> Self;

    /// Extract the current mapping. Meaningful at goal states.
    fn solution(&self) -> MatchingSolution;
}

/// Callable invoked at each goal state.
///
/// Returning `true` requests early termination of the search; `false`
/// continues the enumeration. In the parallel engines the verdict raises a
/// stop flag that other workers observe at their next loop iteration; see
/// the engine docs for the exact semantics.
pub type MatchVisitor<S> = Box<dyn Fn(&S) -> bool + Send + Sync>;
