//! # Mantis LookML
//!
//! Compiles a declarative semantic layer into LookML-shaped views,
//! refinements and explores.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          ModelDocument (loader-facing input)             │
//! │  (entities, dimensions, measures, metrics, PoP config)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [lowering]
//! ┌─────────────────────────────────────────────────────────┐
//! │                SemanticModel (Rust types)                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation, variant expansion]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Qualifier  │  JoinResolver  │  PopStrategy  │  Labels  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [render]
//! ┌─────────────────────────────────────────────────────────┐
//! │       views, +view refinements, explores, label map      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod compile;
pub mod config;
pub mod document;
pub mod labels;
pub mod lowering;
pub mod model;
pub mod pop;
pub mod render;
pub mod semantic;
pub mod sql;
pub mod validation;

pub use sql::dialect;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile, CompileError, CompileOutput, CompileResult, ViewOutput};
    pub use crate::config::Settings;
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::document::ModelDocument;
    pub use crate::labels::{LabelConfig, Labeled, PopStyle};
    pub use crate::model::{
        Dimension, Entity, Measure, Metric, MetricVariant, PopComparison, PopConfig, PopOutput,
        SemanticModel, TableRef,
    };
    pub use crate::pop::{PopRenderer, PopStrategy};
    pub use crate::semantic::{infer_joins, InferredJoin, JoinResolver, ModelError, Relationship};
    pub use crate::sql::{qualify, KnownFields, Qualifier};
}

pub use compile::{compile, CompileError, CompileOutput};
pub use dialect::Dialect;
