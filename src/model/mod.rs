//! Semantic model types.
//!
//! A [`SemanticModel`] is one business object backed by one table: its join
//! keys ([`Entity`]), the attributes it can be sliced by ([`Dimension`]), the
//! aggregations over its rows ([`Measure`]) and the business calculations on
//! top ([`Metric`]). Models are built by [`crate::lowering`] and mutated only
//! by prefixing and schema overrides before rendering.

pub mod dimension;
pub mod entity;
pub mod measure;
pub mod metric;
pub mod table;
pub mod types;

pub use dimension::{Dimension, DimensionForm};
pub use entity::Entity;
pub use measure::{AggregateSql, Measure, DEFAULT_PERCENTILE};
pub use metric::{
    BenchmarkSlice, Metric, MetricKind, MetricVariant, PopComparison, PopConfig, PopOutput,
    VariantKind, COMPARISON_SUFFIXES, OUTPUT_SUFFIXES,
};
pub use table::TableRef;
pub use types::{Aggregation, DimensionKind, EntityKind, Granularity};

/// One semantic model: a table plus its entities, dimensions, measures and
/// metrics, all in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticModel {
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub table: TableRef,
    pub entities: Vec<Entity>,
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<Measure>,
    pub metrics: Vec<Metric>,
    pub default_time_dimension: Option<String>,
    /// Time dimensions eligible for explore-level date pivoting.
    pub date_selector: Vec<String>,
}

impl SemanticModel {
    pub fn new(name: impl Into<String>, table: TableRef) -> Self {
        Self {
            name: name.into(),
            label: None,
            description: None,
            table,
            entities: Vec::new(),
            dimensions: Vec::new(),
            measures: Vec::new(),
            metrics: Vec::new(),
            default_time_dimension: None,
            date_selector: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn with_default_time_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.default_time_dimension = Some(dimension.into());
        self
    }

    /// The model's primary entity, if it declares one.
    pub fn primary_entity(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_primary())
    }

    pub fn foreign_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_foreign())
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Whether the model can anchor an explore.
    pub fn has_aggregations(&self) -> bool {
        !self.measures.is_empty() || !self.metrics.is_empty()
    }

    /// Whether any metric renders beyond its base variant.
    pub fn has_variants(&self) -> bool {
        self.metrics
            .iter()
            .any(|m| m.variants.iter().any(|v| *v != MetricVariant::Base))
    }

    /// The time dimension PoP comparisons of `metric` are based on: the
    /// metric's own, else its measure's `agg_time_dimension`, else the
    /// model default.
    pub fn pop_time_dimension(&self, metric: &Metric) -> Option<&Dimension> {
        let measure_time = match &metric.kind {
            MetricKind::Simple { measure } => self
                .measure(measure)
                .and_then(|m| m.agg_time_dimension.as_deref()),
            _ => None,
        };
        metric
            .time_dimension
            .as_deref()
            .or(measure_time)
            .or(self.default_time_dimension.as_deref())
            .and_then(|name| self.dimension(name))
            .filter(|d| d.is_time())
    }

    /// Prefix the model name. An empty prefix is a no-op.
    pub fn apply_prefix(&mut self, prefix: &str) {
        if !prefix.is_empty() {
            self.name = format!("{prefix}{}", self.name);
        }
    }

    /// Point the model's table at `schema`.
    pub fn override_schema(&mut self, schema: &str) {
        self.table.schema = Some(schema.to_string());
    }

    /// Expand the variants of every metric.
    pub fn expand_variants(&mut self) {
        for metric in &mut self.metrics {
            metric.expand_variants();
        }
    }
}
