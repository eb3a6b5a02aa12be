//! Engine construction errors.
//!
//! The search path itself is infallible; configuration is validated when
//! an engine is built, before any thread is spawned.

use thiserror::Error;

/// Errors raised while constructing an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The parallel engines need at least one worker.
    #[error("invalid worker count {0}: the pool needs at least one thread")]
    InvalidThreadCount(usize),
}
