//! Structural errors in a semantic model.
//!
//! Any of these aborts compilation of the offending model only; the rest of
//! the project still compiles.

/// Result type for model construction.
pub type ModelResult<T> = Result<T, ModelError>;

/// A model violates a structural rule that no fallback can repair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("model '{model}': dimension '{dimension}' needs either an expr or a non-empty variants map")]
    MissingDimensionSql { model: String, dimension: String },

    #[error("model '{model}': dimension '{dimension}' names primary_variant '{variant}', which is not one of its variants")]
    UnknownPrimaryVariant {
        model: String,
        dimension: String,
        variant: String,
    },

    #[error("model '{model}': measure '{measure}' aggregates with {agg} and needs an expr")]
    MissingMeasureExpr {
        model: String,
        measure: String,
        agg: &'static str,
    },

    #[error("model '{model}': {kind} metric '{metric}' is missing its {input}")]
    MissingMetricInput {
        model: String,
        metric: String,
        kind: &'static str,
        input: &'static str,
    },

    #[error("model '{model}' has no table")]
    MissingTable { model: String },

    #[error("a model is missing its name")]
    MissingName,
}

impl ModelError {
    /// The model the error belongs to, if known.
    pub fn model(&self) -> Option<&str> {
        match self {
            ModelError::MissingDimensionSql { model, .. }
            | ModelError::UnknownPrimaryVariant { model, .. }
            | ModelError::MissingMeasureExpr { model, .. }
            | ModelError::MissingMetricInput { model, .. }
            | ModelError::MissingTable { model } => Some(model),
            ModelError::MissingName => None,
        }
    }
}
