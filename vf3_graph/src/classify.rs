//! Label-based node classification.
//!
//! The matcher never compares labels directly; it compares the equivalence
//! classes produced here. Classes are seeded from the target graph so that
//! per-class target cardinalities are known up front, and pattern labels
//! the target lacks are assigned fresh classes with zero target
//! cardinality (states reaching such nodes go dead immediately).

use std::hash::Hash;

use ahash::AHashMap;
use tracing::debug;

use crate::graph::Graph;

/// Partitions nodes into label equivalence classes.
pub struct NodeClassifier<L> {
    class_by_label: AHashMap<L, u32>,
    target_classes: Vec<u32>,
    target_class_counts: Vec<usize>,
}

impl<L: Clone + Eq + Hash> NodeClassifier<L> {
    /// Build the classifier over the target graph.
    pub fn new(target: &Graph<L>) -> Self {
        let mut class_by_label = AHashMap::new();
        let mut target_classes = Vec::with_capacity(target.node_count());
        let mut target_class_counts: Vec<usize> = Vec::new();

        for label in target.labels() {
            let next = class_by_label.len() as u32;
            let class = *class_by_label.entry(label.clone()).or_insert(next);
            if class as usize == target_class_counts.len() {
                target_class_counts.push(0);
            }
            target_class_counts[class as usize] += 1;
            target_classes.push(class);
        }

        debug!(
            "classified target: {} nodes into {} classes",
            target.node_count(),
            target_class_counts.len()
        );

        NodeClassifier {
            class_by_label,
            target_classes,
            target_class_counts,
        }
    }

    /// Classify the pattern graph against the target's classes.
    ///
    /// Labels unseen in the target receive fresh classes; their target
    /// cardinality is zero.
    pub fn classify_pattern(&mut self, pattern: &Graph<L>) -> Vec<u32> {
        let mut classes = Vec::with_capacity(pattern.node_count());
        for label in pattern.labels() {
            let next = self.class_by_label.len() as u32;
            let class = *self.class_by_label.entry(label.clone()).or_insert(next);
            if class as usize == self.target_class_counts.len() {
                self.target_class_counts.push(0);
            }
            classes.push(class);
        }
        classes
    }

    /// Total number of classes assigned so far.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.target_class_counts.len()
    }

    /// Class of each target node, in node-id order.
    #[must_use]
    pub fn target_classes(&self) -> &[u32] {
        &self.target_classes
    }

    /// Number of target nodes in `class`.
    #[must_use]
    pub fn class_cardinality(&self, class: u32) -> usize {
        self.target_class_counts
            .get(class as usize)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(labels: &[i32]) -> Graph<i32> {
        let mut g = Graph::new();
        for &l in labels {
            g.add_node(l);
        }
        g
    }

    #[test]
    fn target_labels_share_classes() {
        let target = labeled(&[5, 3, 5, 5]);
        let classifier = NodeClassifier::new(&target);
        assert_eq!(classifier.class_count(), 2);
        assert_eq!(classifier.target_classes(), &[0, 1, 0, 0]);
        assert_eq!(classifier.class_cardinality(0), 3);
        assert_eq!(classifier.class_cardinality(1), 1);
    }

    #[test]
    fn pattern_reuses_target_classes() {
        let target = labeled(&[5, 3]);
        let pattern = labeled(&[3, 5]);
        let mut classifier = NodeClassifier::new(&target);
        let classes = classifier.classify_pattern(&pattern);
        assert_eq!(classes, vec![1, 0]);
        assert_eq!(classifier.class_count(), 2);
    }

    #[test]
    fn unseen_pattern_label_gets_empty_class() {
        let target = labeled(&[1]);
        let pattern = labeled(&[2]);
        let mut classifier = NodeClassifier::new(&target);
        let classes = classifier.classify_pattern(&pattern);
        assert_eq!(classes, vec![1]);
        assert_eq!(classifier.class_count(), 2);
        assert_eq!(classifier.class_cardinality(1), 0);
    }
}
