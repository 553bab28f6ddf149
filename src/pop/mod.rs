//! Period-over-period rendering strategies.
//!
//! A metric's [`MetricVariant`]s become LookML measures in one of two ways:
//!
//! ```text
//!                   ┌─────────────────────────┐
//!  Pop{py, change}  │ Materialized            │  revenue_py_change
//!  ───────────────▶ │ period_over_period      │  (one measure per pair)
//!                   └─────────────────────────┘
//!                   ┌─────────────────────────┐
//!  Pop{*, *}        │ Dynamic                 │  revenue_prior
//!  ───────────────▶ │ filtered on comparison  │  revenue_change
//!                   │ period field            │  revenue_pct_change
//!                   └─────────────────────────┘
//! ```
//!
//! The dynamic strategy applies to simple metrics only; derived and ratio
//! metrics fall back to materialized measures. Benchmark variants render the
//! same way under either strategy.

use std::collections::HashSet;

use serde::Serialize;

use crate::labels::LabelConfig;
use crate::model::{
    AggregateSql, Metric, MetricKind, MetricVariant, PopComparison, PopOutput, SemanticModel,
};
use crate::sql::{KnownFields, Qualifier};

/// LookML value format applied to relative-change measures.
pub const PERCENT_FORMAT: &str = "percent_1";

/// Suffixes of the three dynamic comparison measures.
pub const DYNAMIC_SUFFIXES: [(PopOutput, &str); 3] = [
    (PopOutput::Previous, "_prior"),
    (PopOutput::Change, "_change"),
    (PopOutput::PctChange, "_pct_change"),
];

/// How period-over-period variants are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopStrategy {
    /// One native `period_over_period` measure per (comparison, output).
    #[default]
    Materialized,
    /// Three measures per metric driven by a comparison-period filter.
    Dynamic,
}

impl PopStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "materialized" | "native" => Some(PopStrategy::Materialized),
            "dynamic" | "filtered" => Some(PopStrategy::Dynamic),
            _ => None,
        }
    }

    /// Unknown strategies fall back to `Materialized`.
    pub fn from_name(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

/// One LookML measure produced from a metric variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMeasure {
    pub name: String,
    #[serde(rename = "type")]
    pub measure_type: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FieldFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_format_name: Option<String>,
}

impl RenderedMeasure {
    pub fn new(name: String, measure_type: impl Into<String>, label: String) -> Self {
        Self {
            name,
            measure_type: measure_type.into(),
            label,
            view_label: None,
            group_label: None,
            description: None,
            hidden: false,
            sql: None,
            filters: Vec::new(),
            percentile: None,
            based_on: None,
            based_on_time: None,
            period: None,
            kind: None,
            value_format_name: None,
        }
    }

    pub fn from_aggregate(name: String, aggregate: AggregateSql, label: String) -> Self {
        let mut measure = Self::new(name, aggregate.measure_type, label);
        measure.sql = aggregate.sql;
        measure.percentile = aggregate.percentile;
        measure
    }

    pub fn with_group_label(mut self, group_label: Option<&str>) -> Self {
        self.group_label = group_label.map(str::to_string);
        self
    }
}

/// A LookML `filters: [field: "value"]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

/// Why a variant rendered nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkippedVariant {
    #[error("metric '{metric}' in model '{model}': period-over-period needs a time dimension; set time_dimension or a model default_time_dimension")]
    MissingTimeDimension { model: String, metric: String },

    #[error("metric '{metric}' in model '{model}': benchmark slice '{slice}' requires a simple metric")]
    BenchmarkOnNonSimple {
        model: String,
        metric: String,
        slice: String,
    },

    #[error("metric '{metric}' in model '{model}': unknown {what} '{name}'")]
    UnknownInput {
        model: String,
        metric: String,
        what: &'static str,
        name: String,
    },

    #[error("metric '{metric}' in model '{model}': {what} cannot apply to measure '{measure}' of a joined model")]
    JoinedMeasure {
        model: String,
        metric: String,
        measure: String,
        what: &'static str,
    },
}

/// Everything a strategy reads while rendering one model's metrics.
#[derive(Debug)]
pub struct PopContext<'a> {
    pub model: &'a SemanticModel,
    pub labels: &'a LabelConfig,
    pub qualifier: &'a Qualifier,
    /// Fields SQL in this model may reference.
    pub known: &'a KnownFields,
    /// Measures of joined models, keyed by bare name, as `view.measure`.
    pub joined: &'a KnownFields,
    /// Yes/no field marking rows of the comparison period.
    pub comparison_field: &'a str,
}

impl<'a> PopContext<'a> {
    /// The metric's measure as a qualified aggregate, with the metric's own
    /// filter applied. `None` for non-simple metrics.
    ///
    /// A measure owned by a joined model renders as a `number` referencing
    /// that view's field; it cannot carry a filter.
    pub fn simple_aggregate(&self, metric: &Metric) -> Result<Option<AggregateSql>, SkippedVariant> {
        let MetricKind::Simple { measure: name } = &metric.kind else {
            return Ok(None);
        };
        let Some(measure) = self.model.measure(name) else {
            let field = self
                .joined
                .get(name)
                .ok_or_else(|| SkippedVariant::UnknownInput {
                    model: self.model.name.clone(),
                    metric: metric.name.clone(),
                    what: "measure",
                    name: name.clone(),
                })?;
            if metric.filter.is_some() {
                return Err(self.joined_measure(metric, "a metric filter"));
            }
            return Ok(Some(AggregateSql {
                measure_type: "number",
                sql: Some(format!("${{{field}}}")),
                percentile: None,
            }));
        };

        let primary_key = self.model.primary_entity().map(|e| e.expr.as_str());
        let aggregate = measure
            .aggregate(primary_key)
            .map_sql(|sql| self.qualifier.qualify(sql, self.known));
        Ok(Some(match &metric.filter {
            Some(filter) => aggregate.restrict(&self.qualifier.qualify(filter, self.known)),
            None => aggregate,
        }))
    }

    /// Whether a simple metric reads a measure of a joined model.
    pub fn reads_joined_measure(&self, metric: &Metric) -> bool {
        match &metric.kind {
            MetricKind::Simple { measure } => {
                self.model.measure(measure).is_none() && self.joined.contains(measure)
            }
            _ => false,
        }
    }

    fn joined_measure(&self, metric: &Metric, what: &'static str) -> SkippedVariant {
        let measure = match &metric.kind {
            MetricKind::Simple { measure } => measure.clone(),
            _ => String::new(),
        };
        SkippedVariant::JoinedMeasure {
            model: self.model.name.clone(),
            metric: metric.name.clone(),
            measure,
            what,
        }
    }
}

impl PopStrategy {
    /// Render one variant of `metric`.
    ///
    /// `Base` renders nothing here; it belongs to the metric's own view
    /// document. Dynamic renders its full triple for every PoP variant, so
    /// callers deduplicate by name (see [`PopRenderer`]).
    pub fn render(
        &self,
        metric: &Metric,
        variant: &MetricVariant,
        ctx: &PopContext<'_>,
    ) -> Result<Vec<RenderedMeasure>, SkippedVariant> {
        match variant {
            MetricVariant::Base => Ok(Vec::new()),
            MetricVariant::Benchmark { slice } => render_benchmark(metric, slice, ctx),
            MetricVariant::Pop { comparison, output } => match self {
                PopStrategy::Dynamic if metric.is_simple() && !ctx.reads_joined_measure(metric) => {
                    render_dynamic(metric, ctx)
                }
                PopStrategy::Dynamic => {
                    tracing::debug!(
                        model = %ctx.model.name,
                        metric = %metric.name,
                        "dynamic period-over-period needs a simple metric over a local measure; materializing"
                    );
                    render_materialized(metric, *comparison, *output, ctx)
                }
                PopStrategy::Materialized => render_materialized(metric, *comparison, *output, ctx),
            },
        }
    }
}

fn render_materialized(
    metric: &Metric,
    comparison: PopComparison,
    output: PopOutput,
    ctx: &PopContext<'_>,
) -> Result<Vec<RenderedMeasure>, SkippedVariant> {
    let based_on_time = ctx
        .model
        .pop_time_dimension(metric)
        .and_then(|d| d.finest_timeframe_field())
        .ok_or_else(|| SkippedVariant::MissingTimeDimension {
            model: ctx.model.name.clone(),
            metric: metric.name.clone(),
        })?;

    let variant = MetricVariant::Pop { comparison, output };
    let mut measure = RenderedMeasure::new(
        variant.resolve_name(metric),
        "period_over_period",
        ctx.labels.pop_label(metric, comparison, output),
    )
    .with_group_label(metric.category());
    measure.based_on = Some(metric.name.clone());
    measure.based_on_time = Some(based_on_time);
    measure.period = Some(comparison.period());
    measure.kind = Some(output.lookml_kind());
    if output == PopOutput::PctChange {
        measure.value_format_name = Some(PERCENT_FORMAT.to_string());
    }
    Ok(vec![measure])
}

/// Name of the dynamic measure for `output`.
pub fn dynamic_name(metric: &Metric, output: PopOutput) -> String {
    let suffix = DYNAMIC_SUFFIXES
        .iter()
        .find(|(o, _)| *o == output)
        .map(|(_, s)| *s)
        .unwrap_or_default();
    format!("{}{}", metric.name, suffix)
}

fn render_dynamic(
    metric: &Metric,
    ctx: &PopContext<'_>,
) -> Result<Vec<RenderedMeasure>, SkippedVariant> {
    let Some(aggregate) = ctx.simple_aggregate(metric)? else {
        return Ok(Vec::new());
    };
    let category = metric.category();
    let current = format!("${{{}}}", metric.name);
    let prior_name = dynamic_name(metric, PopOutput::Previous);
    let prior = format!("${{{prior_name}}}");

    let prior_measure = if aggregate.supports_filters() {
        let mut measure = RenderedMeasure::from_aggregate(
            prior_name,
            aggregate,
            ctx.labels.dynamic_pop_label(metric, PopOutput::Previous),
        );
        measure.filters.push(FieldFilter {
            field: ctx.comparison_field.to_string(),
            value: "yes".to_string(),
        });
        measure
    } else {
        RenderedMeasure::from_aggregate(
            prior_name,
            aggregate.restrict(&format!("${{{}}}", ctx.comparison_field)),
            ctx.labels.dynamic_pop_label(metric, PopOutput::Previous),
        )
    }
    .with_group_label(category);

    let mut change = RenderedMeasure::new(
        dynamic_name(metric, PopOutput::Change),
        "number",
        ctx.labels.dynamic_pop_label(metric, PopOutput::Change),
    )
    .with_group_label(category);
    change.sql = Some(format!("{current} - {prior}"));

    let mut pct_change = RenderedMeasure::new(
        dynamic_name(metric, PopOutput::PctChange),
        "number",
        ctx.labels.dynamic_pop_label(metric, PopOutput::PctChange),
    )
    .with_group_label(category);
    pct_change.sql = Some(format!("({current} - {prior}) / NULLIF({prior}, 0)"));
    pct_change.value_format_name = Some(PERCENT_FORMAT.to_string());

    Ok(vec![prior_measure, change, pct_change])
}

fn render_benchmark(
    metric: &Metric,
    slice: &str,
    ctx: &PopContext<'_>,
) -> Result<Vec<RenderedMeasure>, SkippedVariant> {
    let non_simple = || SkippedVariant::BenchmarkOnNonSimple {
        model: ctx.model.name.clone(),
        metric: metric.name.clone(),
        slice: slice.to_string(),
    };
    let benchmark = metric.benchmark(slice).ok_or_else(non_simple)?;
    if ctx.reads_joined_measure(metric) {
        return Err(ctx.joined_measure(metric, "a benchmark"));
    }
    let aggregate = ctx.simple_aggregate(metric)?.ok_or_else(non_simple)?;

    let condition = ctx.qualifier.qualify(&benchmark.filter, ctx.known);
    let variant = MetricVariant::Benchmark {
        slice: slice.to_string(),
    };
    Ok(vec![RenderedMeasure::from_aggregate(
        variant.resolve_name(metric),
        aggregate.restrict(&condition),
        ctx.labels.benchmark_label(metric, slice),
    )
    .with_group_label(metric.category())])
}

/// Renders every variant of a model's metrics, dropping repeated names.
#[derive(Debug)]
pub struct PopRenderer<'a> {
    strategy: PopStrategy,
    ctx: PopContext<'a>,
    rendered: HashSet<String>,
    warnings: Vec<String>,
}

impl<'a> PopRenderer<'a> {
    pub fn new(strategy: PopStrategy, ctx: PopContext<'a>) -> Self {
        Self {
            strategy,
            ctx,
            rendered: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Mark names already taken by the model's own fields.
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rendered.extend(names.into_iter().map(Into::into));
    }

    /// Render one variant; names rendered before are skipped.
    pub fn render(&mut self, metric: &Metric, variant: &MetricVariant) -> Vec<RenderedMeasure> {
        let measures = match self.strategy.render(metric, variant, &self.ctx) {
            Ok(measures) => measures,
            Err(skipped) => {
                tracing::warn!(model = %self.ctx.model.name, "{skipped}");
                let message = skipped.to_string();
                if !self.warnings.contains(&message) {
                    self.warnings.push(message);
                }
                return Vec::new();
            }
        };

        measures
            .into_iter()
            .filter(|m| {
                let fresh = self.rendered.insert(m.name.clone());
                if !fresh {
                    tracing::debug!(
                        model = %self.ctx.model.name,
                        measure = %m.name,
                        "skipping already rendered variant measure"
                    );
                }
                fresh
            })
            .collect()
    }

    /// Render every non-base variant of `metric`.
    pub fn render_metric(&mut self, metric: &Metric) -> Vec<RenderedMeasure> {
        metric
            .variants
            .iter()
            .filter(|v| **v != MetricVariant::Base)
            .flat_map(|variant| self.render(metric, variant))
            .collect()
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}
