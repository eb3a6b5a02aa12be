//! Subgraph isomorphism search engines of the VF3 family.
//!
//! The crate is built around a small [`State`] contract: a search node that
//! knows whether it is a goal, whether it is dead, how to enumerate
//! candidate pair extensions, and how to produce an independently owned
//! child state. Three engines explore that contract:
//!
//! - [`MatchingEngine`]: single-threaded depth-first search,
//! - [`ParallelMatchingEngine`]: a worker pool over one shared state
//!   stack,
//! - [`ParallelMatchingEngineWls`]: the same pool with per-worker local
//!   stacks, spilling shallow or overflowing states to the shared stack.
//!
//! All engines record found mappings through a thread-safe
//! [`SolutionSink`]. [`Vf3SubState`] is the bundled [`State`]
//! implementation over [`vf3_graph`] graphs.

pub mod engine;
pub mod error;
pub mod sink;
pub mod solution;
pub mod state;
pub mod substate;

pub use engine::parallel::{ParallelConfig, ParallelMatchingEngine};
pub use engine::wls::{ParallelMatchingEngineWls, WlsConfig};
pub use engine::{MatchingEngine, RunReport};
pub use error::EngineError;
pub use sink::SolutionSink;
pub use solution::MatchingSolution;
pub use state::{MatchVisitor, State};
pub use substate::{MatchContext, Vf3SubState};
