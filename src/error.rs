//! Error types for the ZX-calculus rewrite engine
//!
//! Precondition failures (e.g. a rule whose match is no longer valid) are
//! reported as plain `bool`/`Option` returns, matching the `apply(g) -> bool`
//! contract used throughout `graph` and `rules`. `ZxError` is reserved for
//! structural violations and the one documented optimizer-startup error.

use thiserror::Error;

use crate::graph::VertexId;

/// Errors surfaced by the core graph store and the simplification drivers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZxError {
    #[error("vertex {0} does not exist in this graph")]
    NoSuchVertex(VertexId),

    #[error("no edge of type {edge_type:?} between {u} and {v}")]
    NoSuchEdge {
        u: VertexId,
        v: VertexId,
        edge_type: crate::graph::EdgeType,
    },

    #[error("boundary vertex {0} already has a neighbor; cannot add a second edge")]
    DuplicateBoundaryEdge(VertexId),

    #[error("qubit {0} is already assigned to an input")]
    DuplicateInputQubit(i32),

    #[error("qubit {0} is already assigned to an output")]
    DuplicateOutputQubit(i32),

    #[error("cannot compose graphs: {0}")]
    IncompatibleComposition(String),

    #[error("causal_flow_opt requires the input graph to already admit causal flow")]
    NoCausalFlow,
}

pub type ZxResult<T> = Result<T, ZxError>;
