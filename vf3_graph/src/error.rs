//! Error types for graph loading.

use thiserror::Error;

/// Errors that can occur while reading a graph from a file or stream.
///
/// All of these surface during the preparation phase; the search core never
/// sees them.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The underlying reader failed.
    #[error("failed to read graph: {0}")]
    Io(#[from] std::io::Error),

    /// The stream is not a well-formed graph description.
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
}

impl GraphError {
    /// Create a parse error for the given 1-based line.
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            msg: msg.into(),
        }
    }
}
