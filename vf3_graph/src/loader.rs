//! Text loader for the benchmark graph format.
//!
//! The format is line-oriented: a node-count line, one `id label` line per
//! node (ids must be `0..n` in order), then for each node an edge-count
//! line followed by that many `from to` lines. Blank lines and `#` comments
//! are skipped. Labels are signed 32-bit integers.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::GraphError;
use crate::graph::{Graph, NodeId};

/// Load a graph from a file path.
pub fn load_graph_path(path: impl AsRef<Path>) -> Result<Graph<i32>, GraphError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let graph = load_graph(reader)?;
    debug!(
        "loaded {:?}: {} nodes, {} edges",
        path,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Load a graph from any buffered reader.
pub fn load_graph<R: BufRead>(reader: R) -> Result<Graph<i32>, GraphError> {
    let mut tokens = Tokens::new(reader)?;

    let node_count: usize = tokens.next_parsed("node count")?;
    let mut graph = Graph::with_capacity(node_count);

    for expected in 0..node_count {
        let id: usize = tokens.next_parsed("node id")?;
        if id != expected {
            return Err(GraphError::parse(
                tokens.line,
                format!("expected node id {expected}, found {id}"),
            ));
        }
        let label: i32 = tokens.next_parsed("node label")?;
        graph.add_node(label);
    }

    for node in 0..node_count {
        let edge_count: usize = tokens.next_parsed("edge count")?;
        for _ in 0..edge_count {
            let from: NodeId = tokens.next_parsed("edge source")?;
            let to: NodeId = tokens.next_parsed("edge destination")?;
            if from as usize != node {
                return Err(GraphError::parse(
                    tokens.line,
                    format!("edge source {from} does not belong to node {node}'s edge list"),
                ));
            }
            if to as usize >= node_count {
                return Err(GraphError::parse(
                    tokens.line,
                    format!("edge destination {to} out of range"),
                ));
            }
            graph.add_edge(from, to);
        }
    }

    Ok(graph)
}

/// Whitespace token stream over a reader, tracking 1-based line numbers and
/// skipping `#` comments.
struct Tokens {
    tokens: Vec<(usize, String)>,
    next: usize,
    line: usize,
}

impl Tokens {
    fn new<R: BufRead>(reader: R) -> Result<Self, GraphError> {
        let mut tokens = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let content = line.split('#').next().unwrap_or("");
            for tok in content.split_whitespace() {
                tokens.push((idx + 1, tok.to_string()));
            }
        }
        Ok(Tokens {
            tokens,
            next: 0,
            line: 1,
        })
    }

    fn next_parsed<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, GraphError> {
        let Some((line, tok)) = self.tokens.get(self.next).cloned() else {
            return Err(GraphError::parse(
                self.line,
                format!("unexpected end of input while reading {what}"),
            ));
        };
        self.line = line;
        self.next += 1;
        tok.parse()
            .map_err(|_| GraphError::parse(line, format!("invalid {what}: {tok:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
# a directed triangle
3
0 7
1 7
2 9
1
0 1
1
1 2
1
2 0
";

    #[test]
    fn parses_nodes_labels_and_edges() {
        let g = load_graph(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(*g.label(0), 7);
        assert_eq!(*g.label(2), 9);
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(2, 0));
        assert!(!g.has_edge(1, 0));
    }

    #[test]
    fn rejects_out_of_order_node_ids() {
        let input = "2\n1 0\n0 0\n0\n0\n";
        let err = load_graph(input.as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Parse { line: 2, .. }));
    }

    #[test]
    fn rejects_edge_destination_out_of_range() {
        let input = "2\n0 1\n1 1\n1\n0 5\n0\n";
        let err = load_graph(input.as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Parse { .. }));
    }

    #[test]
    fn rejects_truncated_input() {
        let input = "3\n0 1\n";
        let err = load_graph(input.as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Parse { .. }));
    }

    #[test]
    fn rejects_non_numeric_label() {
        let input = "1\n0 abc\n0\n";
        let err = load_graph(input.as_bytes()).unwrap_err();
        assert!(matches!(err, GraphError::Parse { line: 2, .. }));
    }
}
