//! Graph model and preprocessing collaborators for the VF3-family matcher.
//!
//! This crate supplies everything the search core consumes but does not
//! define itself: the directed labeled [`Graph`], the text [`loader`], the
//! label-based [`NodeClassifier`], and the pattern [`sort`] heuristic that
//! fixes the DFS branching order.

pub mod classify;
pub mod error;
pub mod graph;
pub mod loader;
pub mod sort;

pub use classify::NodeClassifier;
pub use error::GraphError;
pub use graph::{Graph, NodeId};
pub use loader::{load_graph, load_graph_path};
pub use sort::sort_pattern_nodes;
