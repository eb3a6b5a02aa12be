//! Pattern node ordering heuristic.
//!
//! The order in which pattern nodes are matched fixes the DFS branching
//! order and dominates search cost. The greedy rule here follows the
//! VF3-family sorters: start from the node whose class is rarest in the
//! target (fewest candidates), and grow the order by preferring nodes with
//! the most already-ordered neighbors, so each extension is constrained by
//! the partial mapping as early as possible.

use tracing::debug;

use crate::classify::NodeClassifier;
use crate::graph::{Graph, NodeId};

/// Compute the order in which pattern nodes are matched.
///
/// `pattern_classes` must be the class vector produced by
/// [`NodeClassifier::classify_pattern`] for this pattern. The result is a
/// permutation of the pattern's node ids and is fully deterministic.
pub fn sort_pattern_nodes<L: Clone + Eq + std::hash::Hash>(
    pattern: &Graph<L>,
    pattern_classes: &[u32],
    classifier: &NodeClassifier<L>,
) -> Vec<NodeId> {
    let n = pattern.node_count();
    let mut order: Vec<NodeId> = Vec::with_capacity(n);
    let mut placed = vec![false; n];

    // candidates(n) in the target for a pattern node is bounded by its
    // class cardinality; fewer candidates means a cheaper root.
    let rarity =
        |node: NodeId| classifier.class_cardinality(pattern_classes[node as usize]);

    while order.len() < n {
        let best = pattern
            .node_ids()
            .filter(|&v| !placed[v as usize])
            .min_by_key(|&v| {
                let ordered_neighbors = pattern
                    .out_neighbors(v)
                    .iter()
                    .chain(pattern.in_neighbors(v))
                    .filter(|&&u| placed[u as usize])
                    .count();
                // Most constrained first: many ordered neighbors, rare
                // class, high degree, then id for determinism.
                (
                    usize::MAX - ordered_neighbors,
                    rarity(v),
                    usize::MAX - pattern.degree(v),
                    v,
                )
            });
        match best {
            Some(v) => {
                placed[v as usize] = true;
                order.push(v);
            }
            None => break,
        }
    }

    debug!("pattern order: {:?}", order);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_a_permutation() {
        let mut pattern = Graph::new();
        for _ in 0..4 {
            pattern.add_node(1);
        }
        pattern.add_edge_undirected(0, 1);
        pattern.add_edge_undirected(1, 2);
        pattern.add_edge_undirected(2, 3);

        let mut target = pattern.clone();
        target.add_node(1);

        let mut classifier = NodeClassifier::new(&target);
        let classes = classifier.classify_pattern(&pattern);
        let order = sort_pattern_nodes(&pattern, &classes, &classifier);

        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn rare_class_is_matched_first() {
        // Pattern: one node labeled 9 (unique in target), two labeled 1.
        let mut pattern = Graph::new();
        pattern.add_node(1);
        pattern.add_node(9);
        pattern.add_node(1);
        pattern.add_edge_undirected(0, 1);
        pattern.add_edge_undirected(1, 2);

        let mut target = Graph::new();
        for _ in 0..5 {
            target.add_node(1);
        }
        target.add_node(9);

        let mut classifier = NodeClassifier::new(&target);
        let classes = classifier.classify_pattern(&pattern);
        let order = sort_pattern_nodes(&pattern, &classes, &classifier);
        assert_eq!(order[0], 1);
    }

    #[test]
    fn connected_nodes_follow_their_neighbors() {
        // A path 0-1-2-3: once an endpoint is chosen, the order must walk
        // the path rather than jump to the far end.
        let mut pattern = Graph::new();
        for _ in 0..4 {
            pattern.add_node(1);
        }
        pattern.add_edge_undirected(0, 1);
        pattern.add_edge_undirected(1, 2);
        pattern.add_edge_undirected(2, 3);

        let target = pattern.clone();
        let mut classifier = NodeClassifier::new(&target);
        let classes = classifier.classify_pattern(&pattern);
        let order = sort_pattern_nodes(&pattern, &classes, &classifier);

        let position = |node: NodeId| order.iter().position(|&o| o == node).unwrap();
        for &node in &order[1..] {
            let has_earlier_neighbor = pattern
                .out_neighbors(node)
                .iter()
                .chain(pattern.in_neighbors(node))
                .any(|&u| position(u) < position(node));
            assert!(
                has_earlier_neighbor,
                "node {node} placed with no ordered neighbor"
            );
        }
    }
}
