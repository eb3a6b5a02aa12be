//! The bundled [`State`] implementation: VF-family induced subgraph
//! isomorphism over [`vf3_graph`] graphs.
//!
//! A state is a partial injective mapping plus per-class counters used for
//! pruning. The immutable inputs (both graphs, class vectors, branching
//! order) are shared between all states of one search through an [`Arc`],
//! so extending a state clones only the mapping arrays and the counters.

use std::sync::Arc;

use vf3_graph::{Graph, NodeId};

use crate::solution::MatchingSolution;
use crate::state::State;

/// Immutable inputs shared by every state of one search.
pub struct MatchContext<L> {
    pattern: Graph<L>,
    target: Graph<L>,
    pattern_classes: Vec<u32>,
    target_classes: Vec<u32>,
    class_count: usize,
    order: Vec<NodeId>,
}

impl<L> MatchContext<L> {
    /// Bundle the collaborator outputs into a search context.
    ///
    /// `order` must be a permutation of the pattern's node ids; the class
    /// vectors must match the graphs they describe.
    pub fn new(
        pattern: Graph<L>,
        target: Graph<L>,
        pattern_classes: Vec<u32>,
        target_classes: Vec<u32>,
        class_count: usize,
        order: Vec<NodeId>,
    ) -> Self {
        assert_eq!(pattern_classes.len(), pattern.node_count());
        assert_eq!(target_classes.len(), target.node_count());
        assert_eq!(order.len(), pattern.node_count());
        assert!(pattern_classes
            .iter()
            .chain(&target_classes)
            .all(|&c| (c as usize) < class_count));

        MatchContext {
            pattern,
            target,
            pattern_classes,
            target_classes,
            class_count,
            order,
        }
    }

    /// The pattern graph.
    #[must_use]
    pub fn pattern(&self) -> &Graph<L> {
        &self.pattern
    }

    /// The target graph.
    #[must_use]
    pub fn target(&self) -> &Graph<L> {
        &self.target
    }
}

/// A partial mapping between the pattern and the target.
pub struct Vf3SubState<L> {
    ctx: Arc<MatchContext<L>>,
    /// Image of each pattern node, `None` while unmapped.
    core_pattern: Vec<Option<NodeId>>,
    /// Preimage of each target node, `None` while unused.
    core_target: Vec<Option<NodeId>>,
    core_len: usize,
    pattern_unmapped: Vec<usize>,
    target_unmapped: Vec<usize>,
}

impl<L> Clone for Vf3SubState<L> {
    fn clone(&self) -> Self {
        Vf3SubState {
            ctx: self.ctx.clone(),
            core_pattern: self.core_pattern.clone(),
            core_target: self.core_target.clone(),
            core_len: self.core_len,
            pattern_unmapped: self.pattern_unmapped.clone(),
            target_unmapped: self.target_unmapped.clone(),
        }
    }
}

impl<L> Vf3SubState<L> {
    /// The empty mapping over `ctx`: the seed state of a search.
    pub fn new(ctx: Arc<MatchContext<L>>) -> Self {
        let mut pattern_unmapped = vec![0usize; ctx.class_count];
        for &c in &ctx.pattern_classes {
            pattern_unmapped[c as usize] += 1;
        }
        let mut target_unmapped = vec![0usize; ctx.class_count];
        for &c in &ctx.target_classes {
            target_unmapped[c as usize] += 1;
        }

        Vf3SubState {
            core_pattern: vec![None; ctx.pattern.node_count()],
            core_target: vec![None; ctx.target.node_count()],
            core_len: 0,
            pattern_unmapped,
            target_unmapped,
            ctx,
        }
    }

    fn add_pair(&mut self, n1: NodeId, n2: NodeId) {
        debug_assert!(self.core_pattern[n1 as usize].is_none());
        debug_assert!(self.core_target[n2 as usize].is_none());
        self.core_pattern[n1 as usize] = Some(n2);
        self.core_target[n2 as usize] = Some(n1);
        self.core_len += 1;
        self.pattern_unmapped[self.ctx.pattern_classes[n1 as usize] as usize] -= 1;
        self.target_unmapped[self.ctx.target_classes[n2 as usize] as usize] -= 1;
    }

    /// Arcs between `(n1, n2)` and the mapped core must agree in both
    /// graphs; the matching is induced, so a target arc between used nodes
    /// with no pattern counterpart is a mismatch too.
    fn edges_consistent(&self, n1: NodeId, n2: NodeId) -> bool {
        let ctx = &*self.ctx;

        if ctx.pattern.has_edge(n1, n1) != ctx.target.has_edge(n2, n2) {
            return false;
        }

        for &m in ctx.pattern.out_neighbors(n1) {
            if m == n1 {
                continue;
            }
            if let Some(t) = self.core_pattern[m as usize] {
                if !ctx.target.has_edge(n2, t) {
                    return false;
                }
            }
        }
        for &m in ctx.pattern.in_neighbors(n1) {
            if m == n1 {
                continue;
            }
            if let Some(t) = self.core_pattern[m as usize] {
                if !ctx.target.has_edge(t, n2) {
                    return false;
                }
            }
        }

        for &u in ctx.target.out_neighbors(n2) {
            if let Some(p) = self.core_target[u as usize] {
                if !ctx.pattern.has_edge(n1, p) {
                    return false;
                }
            }
        }
        for &u in ctx.target.in_neighbors(n2) {
            if let Some(p) = self.core_target[u as usize] {
                if !ctx.pattern.has_edge(p, n1) {
                    return false;
                }
            }
        }

        true
    }

    /// Class-wise lookahead: every unmapped neighbor of `n1` must find an
    /// unused neighbor of `n2` in its own class, so the per-class counts
    /// on the pattern side may not exceed the target side.
    fn lookahead_holds(&self, n1: NodeId, n2: NodeId) -> bool {
        let ctx = &*self.ctx;

        let count_unmapped = |neighbors: &[NodeId], skip: NodeId, core: &[Option<NodeId>], classes: &[u32]| {
            let mut counts = vec![0usize; ctx.class_count];
            for &m in neighbors {
                if m != skip && core[m as usize].is_none() {
                    counts[classes[m as usize] as usize] += 1;
                }
            }
            counts
        };

        let pattern_out = count_unmapped(
            ctx.pattern.out_neighbors(n1),
            n1,
            &self.core_pattern,
            &ctx.pattern_classes,
        );
        let target_out = count_unmapped(
            ctx.target.out_neighbors(n2),
            n2,
            &self.core_target,
            &ctx.target_classes,
        );
        if pattern_out
            .iter()
            .zip(&target_out)
            .any(|(p, t)| p > t)
        {
            return false;
        }

        let pattern_in = count_unmapped(
            ctx.pattern.in_neighbors(n1),
            n1,
            &self.core_pattern,
            &ctx.pattern_classes,
        );
        let target_in = count_unmapped(
            ctx.target.in_neighbors(n2),
            n2,
            &self.core_target,
            &ctx.target_classes,
        );
        pattern_in.iter().zip(&target_in).all(|(p, t)| p <= t)
    }
}

impl<L: Send + Sync> State for Vf3SubState<L> {
    fn is_goal(&self) -> bool {
        self.core_len == self.ctx.pattern.node_count()
    }

    fn is_dead(&self) -> bool {
        self.pattern_unmapped
            .iter()
            .zip(&self.target_unmapped)
            .any(|(p, t)| p > t)
    }

    fn core_len(&self) -> usize {
        self.core_len
    }

    fn next_pair(&self, prev: Option<(NodeId, NodeId)>) -> Option<(NodeId, NodeId)> {
        if self.core_len >= self.ctx.pattern.node_count() {
            return None;
        }
        let n1 = self.ctx.order[self.core_len];
        let start = match prev {
            Some((_, prev_target)) => prev_target + 1,
            None => 0,
        };
        (start..self.ctx.target.node_count() as NodeId)
            .find(|&t| self.core_target[t as usize].is_none())
            .map(|t| (n1, t))
    }

    fn is_feasible(&self, n1: NodeId, n2: NodeId) -> bool {
        let ctx = &*self.ctx;
        if self.core_target[n2 as usize].is_some() {
            return false;
        }
        if ctx.pattern_classes[n1 as usize] != ctx.target_classes[n2 as usize] {
            return false;
        }
        if ctx.pattern.out_degree(n1) > ctx.target.out_degree(n2)
            || ctx.pattern.in_degree(n1) > ctx.target.in_degree(n2)
        {
            return false;
        }
        self.edges_consistent(n1, n2) && self.lookahead_holds(n1, n2)
    }

    fn extend(&self, n1: NodeId, n2: NodeId) -> Self {
        let mut child = self.clone();
        child.add_pair(n1, n2);
        child
    }

    fn solution(&self) -> MatchingSolution {
        MatchingSolution::new(
            self.core_pattern
                .iter()
                .enumerate()
                .filter_map(|(p, t)| t.map(|t| (p as NodeId, t)))
                .collect(),
        )
    }
}
