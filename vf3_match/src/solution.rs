//! Complete mappings produced at goal states.

use itertools::Itertools;
use vf3_graph::NodeId;

/// A complete match: one `(pattern_node, target_node)` pair per pattern
/// node.
///
/// The pair sequence is ordered as produced by the state, but equality is
/// by the multiset of pairs, so two solutions that list the same pairs in
/// different orders compare equal.
#[derive(Clone, Debug, Default)]
pub struct MatchingSolution {
    pairs: Vec<(NodeId, NodeId)>,
}

impl MatchingSolution {
    /// Build a solution from its pairs.
    pub fn new(pairs: Vec<(NodeId, NodeId)>) -> Self {
        MatchingSolution { pairs }
    }

    /// The pairs in production order.
    #[must_use]
    pub fn pairs(&self) -> &[(NodeId, NodeId)] {
        &self.pairs
    }

    /// Number of mapped pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The pairs sorted into a canonical order, for comparison and
    /// deduplication.
    #[must_use]
    pub fn canonical(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs = self.pairs.clone();
        pairs.sort_unstable();
        pairs
    }
}

impl PartialEq for MatchingSolution {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for MatchingSolution {}

impl std::fmt::Display for MatchingSolution {
    /// Renders one `target,pattern:` segment per mapped pair.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.pairs
                .iter()
                .map(|(p, t)| format!("{t},{p}:"))
                .join("")
        )
    }
}
