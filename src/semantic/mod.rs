//! Semantic resolution across models.
//!
//! - [`join_graph`] - infers explore joins from entity relationships
//! - [`error`] - structural model errors

pub mod error;
pub mod join_graph;

pub use error::{ModelError, ModelResult};
pub use join_graph::{
    infer_joins, ExposeLevel, InferredJoin, JoinGraph, JoinOverride, JoinResolver, Relationship,
    MAX_JOIN_DEPTH,
};
