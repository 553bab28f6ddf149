//! Input documents, as produced by a model loader.
//!
//! These mirror the shape of semantic-model files one to one and are
//! deserializable from any serde format. Every enum-like value is free text;
//! [`crate::lowering`] maps it onto the model vocabulary with fallbacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One semantic model file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelDocument {
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    /// `table`, `schema.table` or `catalog.schema.table`.
    pub table: Option<String>,
    pub schema: Option<String>,
    pub catalog: Option<String>,
    pub connection: Option<String>,
    pub entities: Vec<EntityDocument>,
    pub dimensions: Vec<DimensionDocument>,
    pub measures: Vec<MeasureDocument>,
    pub metrics: Vec<MetricDocument>,
    pub default_time_dimension: Option<String>,
    pub date_selector: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EntityDocument {
    pub name: String,
    /// primary, foreign or unique.
    #[serde(rename = "type")]
    pub kind: String,
    pub expr: Option<String>,
    pub complete: bool,
    pub label: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DimensionDocument {
    pub name: String,
    /// categorical or time.
    #[serde(rename = "type")]
    pub kind: String,
    pub expr: Option<String>,
    pub variants: BTreeMap<String, String>,
    pub primary_variant: Option<String>,
    pub granularity: Option<String>,
    pub group: Option<String>,
    pub label: Option<String>,
    pub short_label: Option<String>,
    pub description: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MeasureDocument {
    pub name: String,
    pub agg: String,
    pub expr: Option<String>,
    pub percentile: Option<f64>,
    pub agg_time_dimension: Option<String>,
    pub group: Option<String>,
    pub label: Option<String>,
    pub short_label: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricDocument {
    pub name: String,
    /// simple, derived or ratio; inferred from the inputs when absent.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub measure: Option<String>,
    pub expr: Option<String>,
    pub metrics: Vec<String>,
    pub numerator: Option<String>,
    pub denominator: Option<String>,
    pub filter: Option<String>,
    pub pop: Option<PopDocument>,
    pub benchmarks: Vec<BenchmarkDocument>,
    pub time_dimension: Option<String>,
    pub group: Option<String>,
    pub label: Option<String>,
    pub short_label: Option<String>,
    pub description: Option<String>,
    pub value_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PopDocument {
    pub comparisons: Vec<String>,
    /// Defaults to every output when empty.
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchmarkDocument {
    pub name: String,
    pub filter: String,
}
